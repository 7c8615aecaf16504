//! # dpp CLI entry point
//!
//! Argument parsing and dispatch for the `dpp` binary.
//! Connection settings resolve flags first, then the `DPP_API_URL` /
//! `DPP_API_TOKEN` environment variables.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dpp_cli::applications::{run_applications, ApplicationsArgs};
use dpp_cli::client::{PortalClient, PortalConfig};
use dpp_cli::track::{run_track, TrackArgs};

/// Desh Passport Portal CLI
///
/// Talks to a running dpp-api instance over HTTP. Anonymous tracking needs
/// no token; the applications subcommands send the configured bearer token.
#[derive(Parser, Debug)]
#[command(name = "dpp", version = "0.3.2", about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Base URL of the portal API (default http://localhost:8080).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token sent with authenticated requests.
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Track an application anonymously by number and date of birth.
    Track(TrackArgs),

    /// Inspect and administer applications.
    Applications(ApplicationsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Map the -v count onto a tracing filter.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("dpp CLI v0.3.2 starting");

    let config = PortalConfig::resolve(cli.api_url.clone(), cli.token.clone());
    tracing::debug!(api_url = %config.base_url, "resolved portal address");

    let result = dispatch(cli, &config).await;

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn dispatch(cli: Cli, config: &PortalConfig) -> anyhow::Result<u8> {
    let client = PortalClient::new(config)?;

    match cli.command {
        Commands::Track(args) => run_track(&args, &client).await,
        Commands::Applications(args) => run_applications(&args, &client).await,
    }
}
