//! # Applications subcommand
//!
//! Owner and officer operations against `/v1/applications`: list the
//! caller's applications, move one to a new status (officer tokens), and
//! export the visible set to a JSON file. All of these send the configured
//! bearer token; which records are visible is the server's decision.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use dpp_core::ApplicationNumber;

use crate::client::{ApplicationSummary, PortalClient};

/// Arguments for the `dpp applications` subcommand.
#[derive(Args, Debug)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub command: ApplicationsCommand,
}

/// Application subcommands.
#[derive(Subcommand, Debug)]
pub enum ApplicationsCommand {
    /// List applications visible to the caller, newest first.
    List {
        /// Maximum number of rows to fetch (server default 100, cap 1000).
        #[arg(long)]
        limit: Option<usize>,

        /// Number of rows to skip.
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Move an application to a new status (requires an officer token).
    Status {
        /// Application number.
        number: String,

        /// Target status name, e.g. under_review or approved.
        new_status: String,

        /// Free-text remarks recorded in the status history.
        #[arg(long)]
        remarks: Option<String>,
    },

    /// Export every visible application to a JSON file.
    Export {
        /// Destination path for the JSON dump.
        path: PathBuf,
    },
}

/// Execute the applications subcommand.
pub async fn run_applications(args: &ApplicationsArgs, client: &PortalClient) -> Result<u8> {
    match &args.command {
        ApplicationsCommand::List { limit, offset } => cmd_list(client, *limit, *offset).await,

        ApplicationsCommand::Status {
            number,
            new_status,
            remarks,
        } => cmd_status(client, number, new_status, remarks.as_deref()).await,

        ApplicationsCommand::Export { path } => cmd_export(client, path).await,
    }
}

async fn cmd_list(
    client: &PortalClient,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<u8> {
    let applications = client.list_applications(limit, offset).await?;
    print_table(&applications);
    Ok(0)
}

fn print_table(applications: &[ApplicationSummary]) {
    if applications.is_empty() {
        println!("No applications found.");
        return;
    }

    println!(
        "{:<17} {:<12} {:<20} SUBMITTED",
        "APPLICATION NO", "TYPE", "STATUS"
    );
    for app in applications {
        println!(
            "{:<17} {:<12} {:<20} {}",
            app.application_no,
            app.application_type,
            app.status,
            app.submitted_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("{} application(s)", applications.len());
}

async fn cmd_status(
    client: &PortalClient,
    number: &str,
    new_status: &str,
    remarks: Option<&str>,
) -> Result<u8> {
    // Reject malformed numbers before they reach the wire. Status names
    // are validated server side; the API's error lists the valid ones.
    let number = ApplicationNumber::new(number)?;
    let updated = client
        .update_status(number.as_str(), new_status, remarks)
        .await?;
    println!(
        "OK: {} is now {} (updated {})",
        updated.application_no,
        updated.status,
        updated.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(0)
}

async fn cmd_export(client: &PortalClient, path: &Path) -> Result<u8> {
    let records = client.export_applications().await?;
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write export file: {}", path.display()))?;
    println!(
        "OK: exported {} application(s) to {}",
        records.len(),
        path.display()
    );
    Ok(0)
}
