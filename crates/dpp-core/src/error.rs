//! # Core Errors
//!
//! Structured error types for the portal stack, built with `thiserror`.
//! Every failure is a typed variant; nothing here boxes or panics.
//!
//! Validation variants carry the invalid input and state the expected format
//! so that a rejected submission can be corrected without guesswork.

use thiserror::Error;

/// Top-level error type for the portal stack.
#[derive(Error, Debug)]
pub enum DppError {
    /// A domain primitive rejected its input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors for domain primitives and submission fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Application number does not match the published pattern.
    #[error("invalid application number: \"{0}\" (expected an uppercase letter prefix followed by 11 digits, e.g. DESH12345678901)")]
    InvalidApplicationNumber(String),

    /// Aadhar number is not exactly 12 digits.
    #[error("invalid Aadhar number: \"{0}\" (expected 12 digits)")]
    InvalidAadhar(String),

    /// PAN does not match the 5-letter/4-digit/1-letter layout.
    #[error("invalid PAN: \"{0}\" (expected 5 letters, 4 digits, 1 letter, e.g. ABCDE1234F)")]
    InvalidPan(String),

    /// Email address fails basic structural validation.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Phone number is not exactly 10 digits.
    #[error("invalid phone number: \"{0}\" (expected 10 digits)")]
    InvalidPhone(String),

    /// Pincode is not exactly 6 digits.
    #[error("invalid pincode: \"{0}\" (expected 6 digits)")]
    InvalidPincode(String),

    /// A required submission field is absent or empty.
    #[error("{field} is required")]
    MissingField {
        /// Dotted path of the missing field, e.g. `personal_info.first_name`.
        field: String,
    },

    /// Date of birth is in the future or unreasonably far in the past.
    #[error("implausible date of birth: {0} (must not be in the future or more than 120 years ago)")]
    ImplausibleDateOfBirth(chrono::NaiveDate),

    /// A name for a closed enumeration did not match any variant.
    #[error("unknown {kind} value: \"{value}\" (expected one of: {expected})")]
    UnknownVariant {
        /// Which enumeration was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Comma-separated list of accepted names.
        expected: &'static str,
    },
}

impl ValidationError {
    /// Convenience constructor for [`ValidationError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}
