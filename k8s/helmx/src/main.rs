use crate::opts::{AdoptArgs, CliArgs, Operation, UpgradeArgs};
use clap::Parser;
use helmx::{
    common::{constants::PRODUCT_NAME, error::Result, file::read_manifest},
    helm::{client::HelmClient, upgrade::HelmUpgrade},
    release::{
        adopt::turn_helm_template_to_install,
        storage::{ReleaseManifest, StorageDriver},
    },
};
use std::fmt::Display;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod opts;

fn main() {
    init_logging();

    let opts = CliArgs::parse();
    let output = match run(&opts) {
        Ok(output) => output,
        Err(error) => exit_with_error(error),
    };
    // A closed stdout must not pass for a complete manifest.
    if let Err(error) = console_logger::output(output.as_str()) {
        exit_with_error(format!("Failed to write to standard output: {error}"));
    }
}

fn exit_with_error<E: Display>(error: E) -> ! {
    error!(%error, "Failed to run {PRODUCT_NAME}");
    console_logger::warn(&format!("{PRODUCT_NAME} failed:"), &error.to_string());
    std::process::exit(1);
}

/// Initialize logging components -- tracing. Logs go to stderr, stdout is reserved for
/// manifests and helm output.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the operation and returns what it prints on standard output.
fn run(opts: &CliArgs) -> Result<String> {
    match opts.operation() {
        Operation::Adopt(args) => adopt(args),
        Operation::Upgrade(args) => upgrade(opts, args),
    }
}

fn adopt(args: &AdoptArgs) -> Result<String> {
    let manifest = read_manifest(args.manifest())?;

    let drivers: Vec<StorageDriver> = args.storage_drivers();
    let release_manifests: Vec<&dyn ReleaseManifest> = drivers
        .iter()
        .map(|driver| driver as &dyn ReleaseManifest)
        .collect();

    let adopted = turn_helm_template_to_install(
        args.chart().as_str(),
        args.chart_version().as_str(),
        args.tiller_namespace().as_str(),
        args.release_name().as_str(),
        args.namespace().as_str(),
        manifest.as_str(),
        release_manifests.as_slice(),
    )?;

    info!(release = %args.release_name(), "Adopted manifest");
    Ok(adopted)
}

fn upgrade(opts: &CliArgs, args: &UpgradeArgs) -> Result<String> {
    let client = HelmClient::builder()
        .with_command(opts.helm_bin())
        .with_helm3(opts.helm3())
        .build()?;

    let stdout = HelmUpgrade::builder()
        .with_release_name(args.release_name())
        .with_chart(args.chart())
        .with_opts(args.upgrade_opts())
        .build(client)?
        .run()?;

    console_logger::info(&format!("Upgraded helm release {}", args.release_name()));
    Ok(stdout)
}
