/*!

This is the command line interface for running the package operator parameter injection
conformance scenarios against a cluster.

!*/

mod expect;
mod list;
mod propagation;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use pkotest_model::clients::K8sObjectClient;
use std::path::PathBuf;

/// The command line interface for checking that secrets reach addon packages.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to the kubeconfig file. Also can be passed with the KUBECONFIG environment variable.
    #[clap(long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// List the parameter injection scenarios.
    List(list::List),
    /// Print the config a package should receive for a set of secrets.
    Expect(expect::Expect),
    /// Run the parameter injection scenarios.
    Run(run::Run),
    /// Check that a broken package image is reported on the addon and cleared once fixed.
    Propagation(propagation::Propagation),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::List(list) => list.run(),
        Command::Expect(expect) => expect.run(),
        Command::Run(run) => run.run(client(args.kubeconfig).await?).await,
        Command::Propagation(propagation) => {
            propagation.run(client(args.kubeconfig).await?).await
        }
    }
}

async fn client(kubeconfig: Option<PathBuf>) -> Result<K8sObjectClient> {
    match kubeconfig {
        Some(path) => K8sObjectClient::new_from_kubeconfig_path(&path)
            .await
            .context(format!("Unable to create client from path '{:?}'", path)),
        None => K8sObjectClient::new()
            .await
            .context("Unable to create default client"),
    }
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
            // RUST_LOG does not exist; use default log level for this crate and the model only.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("pkotest_model"), level)
                .init();
        }
    }
}
