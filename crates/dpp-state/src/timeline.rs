//! # Processing Timeline Derivation
//!
//! Converts `(submitted_at, now)` into the seven-stage progress view shown
//! to tracking callers. Pure and deterministic: identical inputs always
//! yield identical output, nothing here reads a clock or touches state,
//! and the result is never persisted.
//!
//! The stage thresholds are calendar days elapsed since submission. A
//! stage is completed once its threshold is reached; the middle five
//! stages are additionally `current` while elapsed time sits inside their
//! window. The scalar [`CurrentStatus`] classifies the same thresholds
//! from the top down and always agrees with the highest completed stage.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Days after submission at which the estimated-completion date is set.
const ESTIMATED_COMPLETION_DAYS: i64 = 30;

/// Label, description, and day threshold for each of the seven stages, in
/// processing order.
const STAGE_SPECS: [(&str, &str, i64); 7] = [
    (
        "Application Submitted",
        "Your application has been successfully submitted and received.",
        0,
    ),
    (
        "Document Verification",
        "Your documents are being verified by our officials.",
        1,
    ),
    (
        "Police Verification",
        "Police verification process is in progress.",
        3,
    ),
    (
        "Application Approved",
        "Your passport application has been approved.",
        7,
    ),
    ("Passport Printing", "Your passport is being printed.", 10),
    (
        "Dispatch",
        "Your passport has been dispatched and is on its way.",
        14,
    ),
    ("Delivered", "Your passport has been successfully delivered.", 21),
];

/// Coarse classification of how far processing has progressed, derived
/// from the same thresholds as the stage list.
///
/// Serializes as the human-readable label (`"Under Review"`, not
/// `under_review`) because this value is display copy, not a persisted
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CurrentStatus {
    /// Elapsed < 1 day.
    #[serde(rename = "Submitted")]
    Submitted,
    /// 1 ≤ elapsed < 3 days.
    #[serde(rename = "Under Review")]
    UnderReview,
    /// 3 ≤ elapsed < 7 days.
    #[serde(rename = "Police Verification")]
    PoliceVerification,
    /// 7 ≤ elapsed < 10 days.
    #[serde(rename = "Approved")]
    Approved,
    /// 10 ≤ elapsed < 14 days.
    #[serde(rename = "Printing")]
    Printing,
    /// 14 ≤ elapsed < 21 days.
    #[serde(rename = "Dispatch")]
    Dispatch,
    /// Elapsed ≥ 21 days.
    #[serde(rename = "Completed")]
    Completed,
}

impl CurrentStatus {
    /// The display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::UnderReview => "Under Review",
            Self::PoliceVerification => "Police Verification",
            Self::Approved => "Approved",
            Self::Printing => "Printing",
            Self::Dispatch => "Dispatch",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for CurrentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stage in the derived timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelineStage {
    /// Display label, e.g. `"Police Verification"`.
    pub label: String,
    /// Display description.
    pub description: String,
    /// The stage's nominal date (`submitted_at` + threshold) once reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Whether the stage threshold has been reached.
    pub completed: bool,
    /// Whether elapsed time currently sits inside this stage's window.
    /// Never set on the first or last stage.
    pub current: bool,
}

/// The derived progress view for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Timeline {
    /// Scalar classification matching the highest completed stage.
    pub current_status: CurrentStatus,
    /// All seven stages in processing order.
    pub stages: Vec<TimelineStage>,
    /// Whole days elapsed since submission, clamped to zero.
    pub processing_days: i64,
    /// Nominal completion estimate shown to the applicant.
    pub estimated_completion: DateTime<Utc>,
}

/// Derive the processing timeline for an application submitted at
/// `submitted_at`, as seen at `now`.
///
/// When `now` precedes `submitted_at` the elapsed time is treated as zero
/// days, never negative.
pub fn derive_timeline(submitted_at: DateTime<Utc>, now: DateTime<Utc>) -> Timeline {
    let elapsed_days = (now - submitted_at).num_days().max(0);

    let last = STAGE_SPECS.len() - 1;
    let stages = STAGE_SPECS
        .iter()
        .enumerate()
        .map(|(i, (label, description, threshold))| {
            let completed = elapsed_days >= *threshold;
            // The first stage is complete from day zero and the last has no
            // window, so neither is ever current.
            let current = i != 0
                && i != last
                && completed
                && elapsed_days < STAGE_SPECS[i + 1].2;
            TimelineStage {
                label: (*label).to_string(),
                description: (*description).to_string(),
                date: completed.then(|| submitted_at + Duration::days(*threshold)),
                completed,
                current,
            }
        })
        .collect();

    let current_status = if elapsed_days >= 21 {
        CurrentStatus::Completed
    } else if elapsed_days >= 14 {
        CurrentStatus::Dispatch
    } else if elapsed_days >= 10 {
        CurrentStatus::Printing
    } else if elapsed_days >= 7 {
        CurrentStatus::Approved
    } else if elapsed_days >= 3 {
        CurrentStatus::PoliceVerification
    } else if elapsed_days >= 1 {
        CurrentStatus::UnderReview
    } else {
        CurrentStatus::Submitted
    };

    Timeline {
        current_status,
        stages,
        processing_days: elapsed_days,
        estimated_completion: submitted_at + Duration::days(ESTIMATED_COMPLETION_DAYS),
    }
}
