//! # Contact Newtypes
//!
//! Validated wrappers for the contact fields collected on a submission:
//! [`Email`], [`PhoneNumber`], and [`Pincode`]. Same construction contract
//! as the identity newtypes: the constructor rejects bad input once, and a
//! held value is always well-formed.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Email address with basic structural validation.
///
/// This is deliberately not a full RFC 5321 parser: one `@`, a non-empty
/// local part, and a domain containing a dot with a 2+ character final
/// label. Stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Email(String);

impl Email {
    /// Create an email address, validating structure.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] if the structure is wrong.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let lower = raw.trim().to_lowercase();

        let Some((local, domain)) = lower.split_once('@') else {
            return Err(ValidationError::InvalidEmail(raw));
        };
        if local.is_empty() || domain.is_empty() || lower.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidEmail(raw));
        }
        // Domain needs at least one dot and a plausible final label.
        let Some((_, tld)) = domain.rsplit_once('.') else {
            return Err(ValidationError::InvalidEmail(raw));
        };
        if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidEmail(raw));
        }
        if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
            return Err(ValidationError::InvalidEmail(raw));
        }

        Ok(Self(lower))
    }

    /// Access the lowercase email string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ten-digit mobile number, stored as bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a phone number, validating the 10-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhone`] if the trimmed value is
    /// not exactly 10 digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let s = raw.trim().to_string();
        if s.len() != 10 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhone(raw));
        }
        Ok(Self(s))
    }

    /// Access the 10-digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Six-digit postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Pincode(String);

impl Pincode {
    /// Create a pincode, validating the 6-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPincode`] if the trimmed value is
    /// not exactly 6 digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let s = raw.trim().to_string();
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPincode(raw));
        }
        Ok(Self(s))
    }

    /// Access the 6-digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Pincode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Email --

    #[test]
    fn email_valid_examples() {
        assert!(Email::new("asha@example.com").is_ok());
        assert!(Email::new("a.b-c@mail.gov.in").is_ok());
    }

    #[test]
    fn email_stored_lowercase() {
        let e = Email::new("Asha@Example.COM").unwrap();
        assert_eq!(e.as_str(), "asha@example.com");
    }

    #[test]
    fn email_rejects_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("no-at-sign").is_err());
        assert!(Email::new("@example.com").is_err()); // empty local
        assert!(Email::new("asha@").is_err()); // empty domain
        assert!(Email::new("asha@example").is_err()); // no dot
        assert!(Email::new("asha@example.c").is_err()); // 1-char tld
        assert!(Email::new("asha@example..com").is_err()); // empty label
        assert!(Email::new("as ha@example.com").is_err()); // whitespace
    }

    // -- PhoneNumber --

    #[test]
    fn phone_valid() {
        let p = PhoneNumber::new("9876543210").unwrap();
        assert_eq!(p.as_str(), "9876543210");
    }

    #[test]
    fn phone_rejects_invalid() {
        assert!(PhoneNumber::new("").is_err());
        assert!(PhoneNumber::new("987654321").is_err()); // 9 digits
        assert!(PhoneNumber::new("98765432100").is_err()); // 11 digits
        assert!(PhoneNumber::new("98765a3210").is_err()); // non-digit
        assert!(PhoneNumber::new("+919876543210").is_err()); // country prefix
    }

    // -- Pincode --

    #[test]
    fn pincode_valid() {
        let p = Pincode::new("110001").unwrap();
        assert_eq!(p.as_str(), "110001");
    }

    #[test]
    fn pincode_rejects_invalid() {
        assert!(Pincode::new("").is_err());
        assert!(Pincode::new("11000").is_err()); // 5 digits
        assert!(Pincode::new("1100011").is_err()); // 7 digits
        assert!(Pincode::new("11000a").is_err()); // non-digit
    }
}
