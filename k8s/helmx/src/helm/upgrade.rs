use crate::{
    common::error::{HelmUpgradeOptionsAbsent, PathNotUtf8, Result},
    helm::client::{HelmClient, HelmVersion},
};
use snafu::{ensure, OptionExt};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for talking to the cluster and to Tiller.
#[derive(Clone, Debug, Default)]
pub struct ClientOpts {
    pub kube_context: Option<String>,
    pub tls: bool,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub debug: bool,
}

/// Options for `helm upgrade`. Unset, empty and false options add no flags.
#[derive(Clone, Debug, Default)]
pub struct UpgradeOpts {
    /// Values as 'key=value', one `--set` each.
    pub set_values: Vec<String>,
    pub values_files: Vec<PathBuf>,
    /// Timeout in seconds.
    pub timeout: Option<u64>,
    pub install: bool,
    pub reset_values: bool,
    pub dry_run: bool,
    pub namespace: Option<String>,
    pub client: ClientOpts,
}

/// A flag followed by each of its values. Single letter flags take a single dash. An empty
/// value adds the bare flag.
fn flag_chain<V>(flag: &str, values: &[V]) -> Vec<String>
where
    V: ToString,
{
    let dashes = if flag.len() == 1 { "-" } else { "--" };
    let mut chain = Vec::with_capacity(values.len() * 2);
    for value in values {
        chain.push(format!("{dashes}{flag}"));
        let value = value.to_string();
        if !value.is_empty() {
            chain.push(value);
        }
    }
    chain
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Helm takes paths as arguments, which must not be altered on their way there.
fn path_str(path: &Path) -> Result<&str> {
    path.to_str().with_context(|| PathNotUtf8 {
        path: path.to_path_buf(),
    })
}

fn non_empty_path(value: &Option<PathBuf>) -> Result<Option<&str>> {
    match value {
        Some(path) => Ok(Some(path_str(path)?).filter(|path| !path.is_empty())),
        None => Ok(None),
    }
}

/// Translates the options into `helm upgrade` flags, in a fixed order. Fails for paths which
/// are not valid UTF-8.
pub fn upgrade_flags(opts: &UpgradeOpts, version: HelmVersion) -> Result<Vec<String>> {
    let mut flags: Vec<String> = Vec::new();

    let set_values: Vec<&String> = opts.set_values.iter().filter(|v| !v.is_empty()).collect();
    flags.extend(flag_chain("set", &set_values));

    let mut values_files: Vec<&str> = Vec::with_capacity(opts.values_files.len());
    for path in &opts.values_files {
        let path = path_str(path)?;
        if !path.is_empty() {
            values_files.push(path);
        }
    }
    flags.extend(flag_chain("f", &values_files));

    if let Some(timeout) = opts.timeout {
        let timeout = match version.is_helm3() {
            true => format!("{timeout}s"),
            false => timeout.to_string(),
        };
        flags.extend(flag_chain("timeout", &[timeout]));
    }
    if opts.install {
        flags.extend(flag_chain("install", &[""]));
    }
    if opts.reset_values {
        flags.extend(flag_chain("reset-values", &[""]));
    }
    if let Some(namespace) = non_empty(&opts.namespace) {
        flags.extend(flag_chain("namespace", &[namespace]));
    }
    if let Some(kube_context) = non_empty(&opts.client.kube_context) {
        flags.extend(flag_chain("kube-context", &[kube_context]));
    }
    if opts.dry_run {
        flags.extend(flag_chain("dry-run", &[""]));
    }
    if opts.client.debug {
        flags.extend(flag_chain("debug", &[""]));
    }
    if opts.client.tls {
        flags.extend(flag_chain("tls", &[""]));
    }
    if let Some(tls_cert) = non_empty_path(&opts.client.tls_cert)? {
        flags.extend(flag_chain("tls-cert", &[tls_cert]));
    }
    if let Some(tls_key) = non_empty_path(&opts.client.tls_key)? {
        flags.extend(flag_chain("tls-key", &[tls_key]));
    }

    Ok(flags)
}

/// This is a builder for the Helm chart upgrade.
#[derive(Default)]
pub struct HelmUpgradeBuilder {
    release_name: Option<String>,
    chart: Option<String>,
    opts: UpgradeOpts,
}

impl HelmUpgradeBuilder {
    /// This is a builder option to add the release name of the helm chart to be upgraded.
    #[must_use]
    pub fn with_release_name<J>(mut self, release_name: J) -> Self
    where
        J: ToString,
    {
        self.release_name = Some(release_name.to_string());
        self
    }

    /// This is a builder option to add the chart reference to upgrade to, i.e. a chart
    /// directory, a packaged chart or a 'repo/name' reference.
    #[must_use]
    pub fn with_chart<J>(mut self, chart: J) -> Self
    where
        J: ToString,
    {
        self.chart = Some(chart.to_string());
        self
    }

    /// This is a builder option to set the upgrade options.
    #[must_use]
    pub fn with_opts(mut self, opts: UpgradeOpts) -> Self {
        self.opts = opts;
        self
    }

    /// This builds the HelmUpgrade object, the flags are decided by the client's helm version.
    pub fn build(self, client: HelmClient) -> Result<HelmUpgrade> {
        let (release_name, chart) = match (self.release_name, self.chart) {
            (Some(release_name), Some(chart)) => (release_name, chart),
            _ => return HelmUpgradeOptionsAbsent.fail(),
        };
        ensure!(
            !release_name.is_empty() && !chart.is_empty(),
            HelmUpgradeOptionsAbsent
        );

        let flags = upgrade_flags(&self.opts, client.version())?;

        Ok(HelmUpgrade {
            release_name,
            chart,
            client,
            flags,
        })
    }
}

/// This type can generate and execute the `helm upgrade` command.
#[derive(Debug)]
pub struct HelmUpgrade {
    release_name: String,
    chart: String,
    client: HelmClient,
    flags: Vec<String>,
}

impl HelmUpgrade {
    /// This creates a default instance of the HelmUpgradeBuilder.
    pub fn builder() -> HelmUpgradeBuilder {
        HelmUpgradeBuilder::default()
    }

    /// The flags which follow the release name and chart.
    pub fn flags(&self) -> &[String] {
        self.flags.as_slice()
    }

    /// The command line of the upgrade, for display.
    pub fn command_line(&self) -> String {
        let flags: String = self.flags.iter().map(|flag| format!(" {flag}")).collect();
        format!(
            "{} upgrade {} {}{}",
            self.client.command(),
            self.release_name,
            self.chart,
            flags
        )
    }

    /// Use the HelmClient's upgrade method to upgrade the installed helm release. Returns the
    /// standard output of helm.
    pub fn run(self) -> Result<String> {
        info!(command = %self.command_line(), "Upgrading helm release");
        self.client
            .upgrade(self.release_name, self.chart, self.flags)
    }
}
