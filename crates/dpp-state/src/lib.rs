#![deny(missing_docs)]

//! # dpp-state — Application Lifecycle
//!
//! Everything that happens to a passport application between submission and
//! delivery lives here:
//!
//! - **Status machine** ([`status`]): the closed [`ApplicationStatus`]
//!   enumeration with an explicit transition table and the append-only
//!   [`StatusHistoryEntry`] log. Forward transitions plus reject/cancel
//!   from any active state; terminal states admit nothing.
//!
//! - **Records** ([`application`]): the [`ApplicationRecord`] aggregate with
//!   its nested personal/address/document structures, the submission
//!   constructor that seeds the history, and the public view that strips
//!   owner identity and document metadata for anonymous tracking.
//!
//! - **Timeline** ([`timeline`]): the pure `(submitted_at, now)` derivation
//!   of the seven-stage processing timeline shown to tracking callers.
//!   Never persisted, always recomputed.
//!
//! - **Numbers** ([`number`]): the application number generator with an
//!   injected clock and RNG, bounded retries, and an explicit exhaustion
//!   error.
//!
//! ## Mutation Discipline
//!
//! State never mutates outside a method that enforces an invariant. The
//! history grows only through [`ApplicationRecord::apply_transition`], which
//! refuses invalid transitions before touching anything.

pub mod application;
pub mod number;
pub mod status;
pub mod timeline;

// Flat re-exports.
pub use application::{
    Address, ApplicationForm, ApplicationRecord, DocumentSlot, DocumentsInfo, EmergencyContact,
    FamilyDetails, PersonalInfo, PublicApplicationView,
};
pub use number::{NumberGenerator, NumberGeneratorError};
pub use status::{ApplicationStatus, StatusError, StatusHistoryEntry};
pub use timeline::{derive_timeline, CurrentStatus, Timeline, TimelineStage};
