use crate::{
    common::{
        constants::DEFAULT_HELM_BIN,
        error::{HelmCommand, HelmUpgradeCommand, HelmVersionCommand, Result, U8VectorToString},
    },
    vec_to_strings,
};
use semver::Version;
use snafu::{ensure, ResultExt};
use std::{
    process::{Command, Output},
    str,
};
use tracing::debug;

/// The version of the helm client. Helm v3 and later take timeouts as durations,
/// helm v2 takes them as a number of seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HelmVersion {
    major: u64,
}

impl HelmVersion {
    /// Helm v2, the Tiller era.
    pub fn v2() -> Self {
        Self { major: 2 }
    }

    /// Helm v3.
    pub fn v3() -> Self {
        Self { major: 3 }
    }

    /// Reads the version off the output of `helm version --client --short`, which is
    /// 'v3.12.3+g3a31588' for helm v3 and 'Client: v2.16.1+gbbdfe5e' for helm v2.
    pub fn from_version_output(output: &str) -> Option<Self> {
        let token = output.split_whitespace().last()?;
        let version = Version::parse(token.trim_start_matches('v')).ok()?;
        Some(Self {
            major: version.major,
        })
    }

    /// This is a getter for the major version.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Predicate for helm v3 (or later) flag semantics.
    pub fn is_helm3(&self) -> bool {
        self.major >= 3
    }
}

/// This is a builder for HelmClient.
#[derive(Default)]
pub struct HelmClientBuilder {
    command: Option<String>,
    helm3: bool,
}

impl HelmClientBuilder {
    /// This is a builder option to set the helm binary. Defaults to 'helm' from $PATH.
    #[must_use]
    pub fn with_command<J>(mut self, command: J) -> Self
    where
        J: ToString,
    {
        self.command = Some(command.to_string());
        self
    }

    /// This is a builder option to assume helm v3 instead of asking the helm binary.
    #[must_use]
    pub fn with_helm3(mut self, helm3: bool) -> Self {
        self.helm3 = helm3;
        self
    }

    /// Build the HelmClient. Runs `helm version` unless helm v3 is assumed.
    pub fn build(self) -> Result<HelmClient> {
        let command = self
            .command
            .unwrap_or_else(|| DEFAULT_HELM_BIN.to_string());

        let version = match self.helm3 {
            true => HelmVersion::v3(),
            false => detect_version(command.as_str())?,
        };
        debug!(%command, ?version, "Built helm client");

        Ok(HelmClient { command, version })
    }
}

/// This type executes helm commands.
#[derive(Clone, Debug)]
pub struct HelmClient {
    command: String,
    version: HelmVersion,
}

impl HelmClient {
    /// This creates an empty builder.
    pub fn builder() -> HelmClientBuilder {
        HelmClientBuilder::default()
    }

    /// This is a getter for the helm binary.
    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// This is a getter for the helm client version.
    pub fn version(&self) -> HelmVersion {
        self.version
    }

    /// Runs command `helm upgrade <release_name> <chart> <extra_args>` and returns its standard
    /// output. Anything written to standard error fails the upgrade, whatever the exit status.
    pub fn upgrade<A, C, B>(&self, release_name: A, chart: C, extra_args: Vec<B>) -> Result<String>
    where
        A: ToString,
        C: ToString,
        B: ToString,
    {
        let command: &str = self.command.as_str();
        let mut args: Vec<String> = vec_to_strings!["upgrade", release_name, chart];
        args.extend(extra_args.iter().map(ToString::to_string));

        debug!(%command, ?args, "Helm upgrade command");

        let output = Command::new(command)
            .args(args.clone())
            .output()
            .context(HelmCommand {
                command: command.to_string(),
                args: args.clone(),
            })?;

        upgrade_output(command, args, output)
    }
}

/// Runs `helm version --client --short` and reads the client version off of it. Output
/// which is not a version is taken to come from helm v2.
fn detect_version(command: &str) -> Result<HelmVersion> {
    let args: Vec<String> = vec_to_strings!["version", "--client", "--short"];

    debug!(%command, ?args, "Helm version command");

    let output = Command::new(command)
        .args(args.clone())
        .output()
        .context(HelmCommand {
            command: command.to_string(),
            args: args.clone(),
        })?;

    let stdout_str = str::from_utf8(output.stdout.as_slice()).context(U8VectorToString)?;
    debug!(stdout=%stdout_str, "Helm version command standard output");
    ensure!(
        output.status.success(),
        HelmVersionCommand {
            command: command.to_string(),
            args,
            std_err: str::from_utf8(output.stderr.as_slice())
                .context(U8VectorToString)?
                .to_string()
        }
    );

    Ok(HelmVersion::from_version_output(stdout_str).unwrap_or_else(|| {
        debug!(stdout=%stdout_str, "Unrecognised helm version, assuming helm v2");
        HelmVersion::v2()
    }))
}

fn upgrade_output(command: &str, args: Vec<String>, output: Output) -> Result<String> {
    let stdout_str = str::from_utf8(output.stdout.as_slice()).context(U8VectorToString)?;
    debug!(stdout=%stdout_str, "Helm upgrade command standard output");

    let std_err = str::from_utf8(output.stderr.as_slice()).context(U8VectorToString)?;
    ensure!(
        output.status.success() && std_err.is_empty(),
        HelmUpgradeCommand {
            command: command.to_string(),
            args,
            std_err: std_err.to_string(),
        }
    );

    Ok(stdout_str.to_string())
}
