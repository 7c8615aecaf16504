//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the portal.
//! Each identifier is a distinct type — you cannot pass an [`AadharNumber`]
//! where a [`PanNumber`] is expected.
//!
//! ## Validation
//!
//! String-based identifiers ([`ApplicationNumber`], [`AadharNumber`],
//! [`PanNumber`]) validate format at construction time. [`UserId`] is
//! UUID-based and always valid by construction.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// UUID-backed identifiers, valid by construction
// ---------------------------------------------------------------------------

/// A unique identifier for a portal account (the owner of submitted
/// applications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random user identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The wrapped UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// String-backed identifiers, validated at construction
// ---------------------------------------------------------------------------

/// Application number assigned at submission.
///
/// Canonical form: an uppercase alphabetic prefix (1 to 8 letters, `DESH`
/// in production) followed by exactly 11 decimal digits. The constructor
/// trims surrounding whitespace and upcases the input, so tracking callers
/// may type `desh...` and still match.
///
/// # Validation
///
/// - Prefix: 1-8 ASCII letters
/// - Suffix: exactly 11 ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ApplicationNumber(String);

impl ApplicationNumber {
    /// Create an application number from a string, validating format.
    ///
    /// The value is trimmed and upcased before validation, so
    /// `" desh12345678901 "` and `"DESH12345678901"` construct the same
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidApplicationNumber`] if the string
    /// does not match the prefix + 11 digit pattern.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let upper = raw.trim().to_uppercase();

        let prefix_len = upper.chars().take_while(|c| c.is_ascii_uppercase()).count();
        if prefix_len == 0 || prefix_len > 8 {
            return Err(ValidationError::InvalidApplicationNumber(raw));
        }

        let digits = &upper[prefix_len..];
        if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidApplicationNumber(raw));
        }

        Ok(Self(upper))
    }

    /// Access the canonical (uppercase) string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the alphabetic prefix (e.g. `DESH`).
    pub fn prefix(&self) -> &str {
        let prefix_len = self.0.chars().take_while(|c| c.is_ascii_uppercase()).count();
        &self.0[..prefix_len]
    }
}

impl std::fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aadhar number (12-digit resident identifier).
///
/// # Validation
///
/// - Must be exactly 12 digits after stripping spaces
/// - If spaces are present, must follow the 4-4-4 display grouping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct AadharNumber(String);

impl AadharNumber {
    /// Create an Aadhar number from a string value, validating format.
    ///
    /// Accepts both `"123412341234"` and `"1234 1234 1234"` forms and
    /// stores the canonical 12-digit form (spaces stripped).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAadhar`] if the format is invalid.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let digits: String = raw.chars().filter(|c| *c != ' ').collect();

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidAadhar(raw));
        }

        if raw.contains(' ') {
            let parts: Vec<&str> = raw.split(' ').collect();
            if parts.len() != 3 || parts.iter().any(|p| p.len() != 4) {
                return Err(ValidationError::InvalidAadhar(raw));
            }
        }

        Ok(Self(digits))
    }

    /// Access the Aadhar number in canonical 12-digit form (no spaces).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the number in display grouping: XXXX XXXX XXXX.
    pub fn formatted(&self) -> String {
        format!("{} {} {}", &self.0[..4], &self.0[4..8], &self.0[8..])
    }
}

impl std::fmt::Display for AadharNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// Permanent Account Number (tax identifier).
///
/// Layout: 5 letters, 4 digits, 1 letter (e.g. `ABCDE1234F`). Stored
/// uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PanNumber(String);

impl PanNumber {
    /// Create a PAN from a string value, validating the layout.
    ///
    /// The value is upcased before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPan`] if the layout is wrong.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let upper = raw.trim().to_uppercase();

        let bytes = upper.as_bytes();
        let ok = bytes.len() == 10
            && bytes[..5].iter().all(|b| b.is_ascii_uppercase())
            && bytes[5..9].iter().all(|b| b.is_ascii_digit())
            && bytes[9].is_ascii_uppercase();
        if !ok {
            return Err(ValidationError::InvalidPan(raw));
        }

        Ok(Self(upper))
    }

    /// Access the PAN string (uppercase).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PanNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- UserId --

    #[test]
    fn user_id_unique() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn user_id_from_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    // -- ApplicationNumber --

    #[test]
    fn application_number_valid() {
        let no = ApplicationNumber::new("DESH12345678901").unwrap();
        assert_eq!(no.as_str(), "DESH12345678901");
        assert_eq!(no.prefix(), "DESH");
    }

    #[test]
    fn application_number_upcases_and_trims() {
        let no = ApplicationNumber::new("  desh12345678901 ").unwrap();
        assert_eq!(no.as_str(), "DESH12345678901");
    }

    #[test]
    fn application_number_other_prefixes() {
        assert!(ApplicationNumber::new("PP12345678901").is_ok());
        assert!(ApplicationNumber::new("X12345678901").is_ok());
    }

    #[test]
    fn application_number_rejects_invalid() {
        assert!(ApplicationNumber::new("").is_err());
        assert!(ApplicationNumber::new("12345678901").is_err()); // no prefix
        assert!(ApplicationNumber::new("DESH1234567890").is_err()); // 10 digits
        assert!(ApplicationNumber::new("DESH123456789012").is_err()); // 12 digits
        assert!(ApplicationNumber::new("DESH1234567890a").is_err()); // non-digit
        assert!(ApplicationNumber::new("TOOLONGPFX12345678901").is_err()); // 9-letter prefix
    }

    // -- AadharNumber --

    #[test]
    fn aadhar_valid_12_digits() {
        let a = AadharNumber::new("123412341234").unwrap();
        assert_eq!(a.as_str(), "123412341234");
    }

    #[test]
    fn aadhar_valid_grouped() {
        let a = AadharNumber::new("1234 1234 1234").unwrap();
        assert_eq!(a.as_str(), "123412341234"); // stored without spaces
        assert_eq!(a.formatted(), "1234 1234 1234");
    }

    #[test]
    fn aadhar_rejects_invalid() {
        assert!(AadharNumber::new("").is_err());
        assert!(AadharNumber::new("12341234123").is_err()); // 11 digits
        assert!(AadharNumber::new("1234123412345").is_err()); // 13 digits
        assert!(AadharNumber::new("12341 234 1234").is_err()); // wrong grouping
        assert!(AadharNumber::new("12341234123a").is_err()); // non-digit
    }

    // -- PanNumber --

    #[test]
    fn pan_valid() {
        let pan = PanNumber::new("ABCDE1234F").unwrap();
        assert_eq!(pan.as_str(), "ABCDE1234F");
    }

    #[test]
    fn pan_lowercased_to_upper() {
        let pan = PanNumber::new("abcde1234f").unwrap();
        assert_eq!(pan.as_str(), "ABCDE1234F");
    }

    #[test]
    fn pan_rejects_invalid() {
        assert!(PanNumber::new("").is_err());
        assert!(PanNumber::new("ABCD1234F").is_err()); // 4 leading letters
        assert!(PanNumber::new("ABCDE123F").is_err()); // 3 digits
        assert!(PanNumber::new("ABCDE12345").is_err()); // digit where letter expected
        assert!(PanNumber::new("ABCDE1234FF").is_err()); // too long
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let no = ApplicationNumber::new("DESH12345678901").unwrap();
        let json = serde_json::to_string(&no).unwrap();
        assert_eq!(json, "\"DESH12345678901\"");
        let back: ApplicationNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, no);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every prefix + 11-digit combination constructs, and the stored
        /// form is the upcased input.
        #[test]
        fn application_number_accepts_canonical_shape(
            prefix in "[A-Za-z]{1,8}",
            digits in "[0-9]{11}",
        ) {
            let no = ApplicationNumber::new(format!("{prefix}{digits}")).unwrap();
            prop_assert_eq!(no.as_str(), format!("{}{}", prefix.to_uppercase(), digits));
            prop_assert_eq!(no.prefix(), prefix.to_uppercase());
        }

        /// Any wrong digit count is rejected.
        #[test]
        fn application_number_rejects_wrong_length(
            prefix in "[A-Z]{1,8}",
            digits in "[0-9]{0,20}",
        ) {
            prop_assume!(digits.len() != 11);
            let candidate = format!("{prefix}{digits}");
            prop_assert!(ApplicationNumber::new(candidate).is_err());
        }

        /// Construction never panics on arbitrary input.
        #[test]
        fn application_number_total_on_arbitrary_input(s in ".{0,40}") {
            let _ = ApplicationNumber::new(s);
        }
    }
}
