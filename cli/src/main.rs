/*!

This is the command line interface for calling the Kiali API and changing the Istio configuration
of the bookinfo namespace while observing Kiali.

!*/

mod call;
mod cleanup;
mod manifest;
mod methods;
mod wait_badge;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use meshtest_model::constants::DEFAULT_ENV_FILE;
use meshtest_model::{EnvironmentConfig, Oc};
use std::path::{Path, PathBuf};

/// The command line interface for the Kiali end-to-end suite.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to the environment file describing the cluster under test.
    #[clap(long = "env-file", default_value = DEFAULT_ENV_FILE, parse(from_os_str))]
    env_file: PathBuf,
    /// Path or name of the `oc` binary.
    #[clap(long = "oc-path", default_value = "oc", parse(from_os_str))]
    oc_path: PathBuf,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// List the Kiali API operations and their paths.
    Methods(methods::Methods),
    /// Call a Kiali API operation and print its JSON body.
    Call(call::Call),
    /// Apply a manifest with `oc apply`.
    Apply(manifest::Apply),
    /// Delete a manifest with `oc delete`.
    Delete(manifest::Delete),
    /// Wait for the graph to show a badge on a number of nodes.
    WaitBadge(wait_badge::WaitBadge),
    /// Delete every manifest of a directory with `oc delete`.
    Cleanup(cleanup::Cleanup),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let oc = Oc::new(&args.oc_path);
    match args.command {
        Command::Methods(methods) => methods.run(),
        Command::Call(call) => call.run(load_config(&args.env_file)?).await,
        Command::Apply(apply) => apply.run(load_config(&args.env_file)?, oc),
        Command::Delete(delete) => delete.run(load_config(&args.env_file)?, oc),
        Command::WaitBadge(wait_badge) => wait_badge.run(load_config(&args.env_file)?).await,
        Command::Cleanup(cleanup) => cleanup.run(load_config(&args.env_file)?, oc),
    }
}

fn load_config(path: &Path) -> Result<EnvironmentConfig> {
    EnvironmentConfig::from_path(path)
        .with_context(|| format!("Unable to load environment from '{}'", path.display()))
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use the level for this crate and its library.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("meshtest_model"), level)
                .init();
        }
    }
}
