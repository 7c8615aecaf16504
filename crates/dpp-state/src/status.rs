//! # Application Status Machine
//!
//! Runtime status enum for persistence and API serialization, with an
//! explicit transition table. The table allows any forward move through the
//! processing order plus `rejected`/`cancelled` from any active state;
//! `completed`, `rejected`, and `cancelled` are terminal.
//!
//! History entries are append-only: nothing in this module rewrites or
//! truncates an existing entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors raised by the status machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The attempted transition is not in the transition table.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Status the record is currently in.
        from: ApplicationStatus,
        /// Rejected target status.
        to: ApplicationStatus,
    },
}

/// Processing status of a passport application.
///
/// Wire form is `snake_case`. The declaration order is the processing
/// order; `Rejected` and `Cancelled` sit outside it and are reachable from
/// any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Started but not yet submitted. Records created through the portal
    /// never persist in this state; it exists for imported data.
    Draft,
    /// Submitted and awaiting review.
    Submitted,
    /// Under review by passport officials.
    UnderReview,
    /// Supporting documents verified.
    DocumentsVerified,
    /// Police verification in progress.
    PoliceVerification,
    /// Application approved for printing.
    Approved,
    /// Rejected. Terminal.
    Rejected,
    /// Passport issued and delivered. Terminal.
    Completed,
    /// Withdrawn by the applicant. Terminal.
    Cancelled,
}

impl ApplicationStatus {
    /// Return all statuses as a slice, in declaration order.
    pub fn all() -> &'static [ApplicationStatus] {
        &[
            Self::Draft,
            Self::Submitted,
            Self::UnderReview,
            Self::DocumentsVerified,
            Self::PoliceVerification,
            Self::Approved,
            Self::Rejected,
            Self::Completed,
            Self::Cancelled,
        ]
    }

    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::DocumentsVerified => "documents_verified",
            Self::PoliceVerification => "police_verification",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Convert a canonical status name to an `ApplicationStatus`.
    ///
    /// Returns `None` for any other input.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "under_review" => Some(Self::UnderReview),
            "documents_verified" => Some(Self::DocumentsVerified),
            "police_verification" => Some(Self::PoliceVerification),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Return the set of valid target statuses from this status.
    ///
    /// Forward moves may skip intermediate steps (an officer can approve
    /// straight from review); backward moves are never valid.
    pub fn valid_transitions(&self) -> &'static [ApplicationStatus] {
        match self {
            Self::Draft => &[
                Self::Submitted,
                Self::UnderReview,
                Self::DocumentsVerified,
                Self::PoliceVerification,
                Self::Approved,
                Self::Completed,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::Submitted => &[
                Self::UnderReview,
                Self::DocumentsVerified,
                Self::PoliceVerification,
                Self::Approved,
                Self::Completed,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::UnderReview => &[
                Self::DocumentsVerified,
                Self::PoliceVerification,
                Self::Approved,
                Self::Completed,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::DocumentsVerified => &[
                Self::PoliceVerification,
                Self::Approved,
                Self::Completed,
                Self::Rejected,
                Self::Cancelled,
            ],
            Self::PoliceVerification => {
                &[Self::Approved, Self::Completed, Self::Rejected, Self::Cancelled]
            }
            Self::Approved => &[Self::Completed, Self::Rejected, Self::Cancelled],
            Self::Rejected => &[],
            Self::Completed => &[],
            Self::Cancelled => &[],
        }
    }

    /// Whether `to` is a valid transition target from this status.
    pub fn can_transition_to(&self, to: ApplicationStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in an application's append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryEntry {
    /// Status the application entered.
    pub status: ApplicationStatus,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
    /// Officer who performed the transition, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer: Option<String>,
    /// Free-text remarks recorded with the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}
