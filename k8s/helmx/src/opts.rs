use clap::{builder::FalseyValueParser, Args, Parser, Subcommand, ValueEnum};
use helmx::{
    common::constants::{
        DEFAULT_HELM_BIN, DEFAULT_TILLER_NAMESPACE, HELM3_ENV, HELM_BIN_ENV, PRODUCT_NAME,
        TILLER_NAMESPACE_ENV,
    },
    helm::upgrade::{ClientOpts, UpgradeOpts},
    release::storage::StorageDriver,
};
use std::path::PathBuf;

/// These are the supported cli configuration options.
#[derive(Parser)]
#[command(name = PRODUCT_NAME, version, long_about = None)]
#[command(about = "Adopts existing Kubernetes resources into helm releases and upgrades them")]
pub(crate) struct CliArgs {
    /// The operation to be performed.
    #[command(subcommand)]
    operation: Operation,

    /// The helm binary to run.
    #[arg(long, global = true, env = HELM_BIN_ENV, default_value = DEFAULT_HELM_BIN)]
    helm_bin: String,

    /// Assume helm v3 instead of asking the helm binary for its version. Any value of the
    /// environment variable other than a falsey one ('false', 'no', 'off', '0', '') enables it.
    #[arg(long, global = true, env = HELM3_ENV, value_parser = FalseyValueParser::new())]
    helm3: bool,
}

impl CliArgs {
    /// This returns the operation to be performed.
    pub(crate) fn operation(&self) -> &Operation {
        &self.operation
    }

    /// This returns the helm binary.
    pub(crate) fn helm_bin(&self) -> String {
        self.helm_bin.clone()
    }

    /// This is a predicate to skip helm version detection.
    pub(crate) fn helm3(&self) -> bool {
        self.helm3
    }
}

#[derive(Subcommand)]
pub(crate) enum Operation {
    /// Prints a manifest followed by the helm release storage objects which make helm treat its
    /// resources as an installed release.
    Adopt(AdoptArgs),
    /// Runs `helm upgrade` for a release.
    Upgrade(UpgradeArgs),
}

/// The kinds of helm release storage objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Storage {
    #[value(name = "configmap")]
    ConfigMap,
    Secret,
}

impl From<Storage> for StorageDriver {
    fn from(storage: Storage) -> Self {
        match storage {
            Storage::ConfigMap => StorageDriver::ConfigMap,
            Storage::Secret => StorageDriver::Secret,
        }
    }
}

#[derive(Args)]
pub(crate) struct AdoptArgs {
    /// This is the name of the release to record.
    release_name: String,

    /// This is the path to the manifest to adopt, '-' reads from standard input.
    #[arg(default_value = "-", value_name = "MANIFEST")]
    manifest: PathBuf,

    /// This is the chart name to record.
    #[arg(long)]
    chart: String,

    /// This is the chart version to record.
    #[arg(long = "version", value_name = "VERSION", default_value = "")]
    chart_version: String,

    /// This is the Kubernetes Namespace of the adopted resources.
    #[arg(short, long, default_value = "")]
    namespace: String,

    /// This is the Kubernetes Namespace where helm keeps its release storage objects.
    #[arg(long, env = TILLER_NAMESPACE_ENV, default_value = DEFAULT_TILLER_NAMESPACE)]
    tiller_namespace: String,

    /// This is the kind of release storage object to print, may be repeated.
    #[arg(long, value_enum, default_values_t = [Storage::ConfigMap])]
    storage: Vec<Storage>,
}

impl AdoptArgs {
    /// This returns the release name.
    pub(crate) fn release_name(&self) -> String {
        self.release_name.clone()
    }

    /// This returns the path to the manifest.
    pub(crate) fn manifest(&self) -> PathBuf {
        self.manifest.clone()
    }

    /// This returns the chart name.
    pub(crate) fn chart(&self) -> String {
        self.chart.clone()
    }

    /// This returns the chart version.
    pub(crate) fn chart_version(&self) -> String {
        self.chart_version.clone()
    }

    /// This returns the Namespace of the adopted resources.
    pub(crate) fn namespace(&self) -> String {
        self.namespace.clone()
    }

    /// This returns the Tiller Namespace.
    pub(crate) fn tiller_namespace(&self) -> String {
        self.tiller_namespace.clone()
    }

    /// This returns the storage drivers to print objects for.
    pub(crate) fn storage_drivers(&self) -> Vec<StorageDriver> {
        self.storage.iter().copied().map(StorageDriver::from).collect()
    }
}

#[derive(Args)]
pub(crate) struct UpgradeArgs {
    /// This is the release name of the installed Helm chart.
    release_name: String,

    /// This is the chart to upgrade to.
    chart: String,

    /// Set values on the command line, may be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set_values: Vec<String>,

    /// Specify values in a YAML file, may be repeated.
    #[arg(short = 'f', long = "values", value_name = "FILE")]
    values_files: Vec<PathBuf>,

    /// Time in seconds to wait for any individual Kubernetes operation.
    #[arg(long)]
    timeout: Option<u64>,

    /// Run an install if a release by this name doesn't already exist.
    #[arg(long)]
    install: bool,

    /// Reset the values to the ones built into the chart.
    #[arg(long)]
    reset_values: bool,

    /// This is the Kubernetes Namespace of the release.
    #[arg(short, long)]
    namespace: Option<String>,

    /// This is the kubeconfig context to use.
    #[arg(long)]
    kube_context: Option<String>,

    /// Simulate an upgrade.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose helm output.
    #[arg(long)]
    debug: bool,

    /// Enable TLS for requests to Tiller.
    #[arg(long)]
    tls: bool,

    /// Path to the TLS certificate file.
    #[arg(long)]
    tls_cert: Option<PathBuf>,

    /// Path to the TLS key file.
    #[arg(long)]
    tls_key: Option<PathBuf>,
}

impl UpgradeArgs {
    /// This returns the release name.
    pub(crate) fn release_name(&self) -> String {
        self.release_name.clone()
    }

    /// This returns the chart reference.
    pub(crate) fn chart(&self) -> String {
        self.chart.clone()
    }

    /// This returns the options for `helm upgrade`.
    pub(crate) fn upgrade_opts(&self) -> UpgradeOpts {
        UpgradeOpts {
            set_values: self.set_values.clone(),
            values_files: self.values_files.clone(),
            timeout: self.timeout,
            install: self.install,
            reset_values: self.reset_values,
            dry_run: self.dry_run,
            namespace: self.namespace.clone(),
            client: ClientOpts {
                kube_context: self.kube_context.clone(),
                tls: self.tls,
                tls_cert: self.tls_cert.clone(),
                tls_key: self.tls_key.clone(),
                debug: self.debug,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, Operation};
    use clap::{error::ErrorKind, CommandFactory, Parser};
    use helmx::release::storage::StorageDriver;
    use std::path::PathBuf;

    #[test]
    fn cli_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn adopt_defaults() {
        let args = CliArgs::parse_from(["helm-x", "adopt", "--chart", "store", "shop"]);

        match args.operation() {
            Operation::Adopt(adopt) => {
                assert_eq!(adopt.release_name(), "shop");
                assert_eq!(adopt.chart(), "store");
                assert_eq!(adopt.manifest(), PathBuf::from("-"));
                assert_eq!(adopt.chart_version(), "");
                assert_eq!(adopt.namespace(), "");
                assert_eq!(adopt.storage_drivers(), vec![StorageDriver::ConfigMap]);
            }
            Operation::Upgrade(_) => panic!("expected adopt"),
        }
    }

    #[test]
    fn adopt_with_secret_and_config_map_storage() {
        let args = CliArgs::parse_from([
            "helm-x",
            "adopt",
            "shop",
            "shop.yaml",
            "--chart",
            "store",
            "--storage",
            "secret",
            "--storage",
            "configmap",
            "--tiller-namespace",
            "tiller",
        ]);

        match args.operation() {
            Operation::Adopt(adopt) => {
                assert_eq!(adopt.chart(), "store");
                assert_eq!(adopt.manifest(), PathBuf::from("shop.yaml"));
                assert_eq!(adopt.tiller_namespace(), "tiller");
                assert_eq!(
                    adopt.storage_drivers(),
                    vec![StorageDriver::Secret, StorageDriver::ConfigMap]
                );
            }
            Operation::Upgrade(_) => panic!("expected adopt"),
        }
    }

    #[test]
    fn adopt_takes_the_chart_version() {
        let args = CliArgs::parse_from([
            "helm-x",
            "adopt",
            "--chart",
            "store",
            "--version",
            "1.0.0",
            "shop",
            "shop.yaml",
        ]);

        match args.operation() {
            Operation::Adopt(adopt) => {
                assert_eq!(adopt.chart(), "store");
                assert_eq!(adopt.chart_version(), "1.0.0");
                assert_eq!(adopt.manifest(), PathBuf::from("shop.yaml"));
            }
            Operation::Upgrade(_) => panic!("expected adopt"),
        }
    }

    #[test]
    fn adopt_requires_a_chart() {
        let error = CliArgs::try_parse_from(["helm-x", "adopt", "shop"])
            .err()
            .unwrap();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    // The only test which touches the environment, tests run in parallel.
    #[test]
    fn helm_options_are_read_from_the_environment() {
        let parse = || CliArgs::try_parse_from(["helm-x", "upgrade", "shop", "./chart"]);

        std::env::set_var("HELM_BIN", "/opt/helm3/helm");
        for truthy in ["1", "yes", "true", "on"] {
            std::env::set_var("HELM_X_HELM3", truthy);
            let args = parse().unwrap();
            assert!(args.helm3(), "{truthy}");
            assert_eq!(args.helm_bin(), "/opt/helm3/helm");
        }
        for falsey in ["0", "no", "false", "off", ""] {
            std::env::set_var("HELM_X_HELM3", falsey);
            assert!(!parse().unwrap().helm3(), "{falsey:?}");
        }

        std::env::remove_var("HELM_X_HELM3");
        std::env::remove_var("HELM_BIN");
        let args = parse().unwrap();
        assert!(!args.helm3());
        assert_eq!(args.helm_bin(), "helm");
    }

    #[test]
    fn upgrade_flags_map_to_options() {
        let args = CliArgs::parse_from([
            "helm-x",
            "upgrade",
            "shop",
            "stable/shop",
            "--set",
            "a=1",
            "--set",
            "b=2",
            "-f",
            "prod.yaml",
            "--timeout",
            "60",
            "--install",
            "--kube-context",
            "prod",
            "--tls",
            "--helm3",
        ]);
        assert!(args.helm3());

        match args.operation() {
            Operation::Upgrade(upgrade) => {
                let opts = upgrade.upgrade_opts();
                assert_eq!(upgrade.release_name(), "shop");
                assert_eq!(upgrade.chart(), "stable/shop");
                assert_eq!(opts.set_values, vec!["a=1", "b=2"]);
                assert_eq!(opts.values_files, vec![PathBuf::from("prod.yaml")]);
                assert_eq!(opts.timeout, Some(60));
                assert!(opts.install);
                assert!(!opts.reset_values);
                assert!(!opts.dry_run);
                assert_eq!(opts.namespace, None);
                assert_eq!(opts.client.kube_context.as_deref(), Some("prod"));
                assert!(opts.client.tls);
                assert!(!opts.client.debug);
            }
            Operation::Adopt(_) => panic!("expected upgrade"),
        }
    }
}
