//! # Track subcommand
//!
//! Anonymous application tracking. Needs no token: the caller proves
//! knowledge of the application with the number plus date of birth pair,
//! exactly like the public portal's status page.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use dpp_core::ApplicationNumber;

use crate::client::{PortalClient, TrackResult};

/// Arguments for the `dpp track` subcommand.
#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Application number, e.g. DESH12345678901.
    pub number: String,

    /// Applicant's date of birth.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date_of_birth: NaiveDate,
}

/// Execute the track subcommand.
pub async fn run_track(args: &TrackArgs, client: &PortalClient) -> Result<u8> {
    // Reject malformed numbers before they reach the wire.
    let number = ApplicationNumber::new(args.number.clone())?;
    let result = client.track(number.as_str(), args.date_of_birth).await?;
    print_track(&result);
    Ok(0)
}

fn print_track(result: &TrackResult) {
    let app = &result.application;
    println!("Application: {}", app.application_no);
    println!("  Type:      {}", app.application_type);
    println!("  Status:    {}", app.status);
    println!(
        "  Submitted: {}",
        app.submitted_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();
    println!(
        "Timeline: {} (day {} of processing)",
        result.timeline.current_status, result.timeline.processing_days
    );
    for stage in &result.timeline.stages {
        let marker = stage_marker(stage.completed, stage.current);
        match &stage.date {
            Some(date) => println!(
                "  [{marker}] {:<24} {}",
                stage.label,
                date.format("%Y-%m-%d")
            ),
            None => println!("  [{marker}] {}", stage.label),
        }
    }
    println!(
        "  Estimated completion: {}",
        result.timeline.estimated_completion.format("%Y-%m-%d")
    );
}

/// Stage list marker: `>` for the current stage, `x` for completed ones.
fn stage_marker(completed: bool, current: bool) -> &'static str {
    if current {
        ">"
    } else if completed {
        "x"
    } else {
        " "
    }
}
