#![deny(missing_docs)]

//! # dpp-core — Foundational Types for the Desh Passport Portal
//!
//! Foundational types shared by every other crate in the workspace. Nothing
//! here depends on another workspace crate; the external surface is limited
//! to `serde`, `thiserror`, `chrono`, `uuid`, and `utoipa` (schema derives
//! for the API documentation).
//!
//! ## Conventions
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass an [`AadharNumber`] where an
//!    [`ApplicationNumber`] is expected, and an invalid value cannot be
//!    constructed in the first place.
//!
//! 2. **Validation at construction, not at use.** Constructors return
//!    `Result<Self, ValidationError>` with messages that state the expected
//!    format, so a bad value is rejected once, at the boundary.
//!
//! 3. **No ambient time.** All time reads flow through the [`Clock`] trait;
//!    production code injects [`SystemClock`], tests inject [`FixedClock`].
//!
//! 4. **Closed enumerations.** Application type, gender, marital status,
//!    citizenship, service and booklet options are exhaustive enums with a
//!    stable wire form, never free-text fields.

pub mod contact;
pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

// Flat re-exports; users write `dpp_core::ApplicationNumber`.
pub use contact::{Email, PhoneNumber, Pincode};
pub use domain::{
    ApplicationType, BookletType, Citizenship, Gender, MaritalStatus, ServiceType,
};
pub use error::{DppError, ValidationError};
pub use identity::{AadharNumber, ApplicationNumber, PanNumber, UserId};
pub use temporal::{validate_date_of_birth, Clock, FixedClock, SystemClock};
