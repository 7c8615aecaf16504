//! # Closed Domain Enumerations
//!
//! Single definitions for every closed value set collected on a passport
//! application. Handlers `match` exhaustively on these — adding a variant
//! forces every consumer to address it, and free-text values cannot enter
//! the system.
//!
//! Wire form is `snake_case` throughout; [`std::fmt::Display`] renders the
//! same names so logs and API payloads agree.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

/// The kind of passport application being filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    /// First-time passport issuance.
    Fresh,
    /// Renewal or replacement of an existing passport.
    Reissue,
    /// Diplomatic passport for accredited personnel.
    Diplomatic,
    /// Official passport for government servants on duty travel.
    Official,
}

impl ApplicationType {
    /// Return all application types as a slice.
    pub fn all() -> &'static [ApplicationType] {
        &[Self::Fresh, Self::Reissue, Self::Diplomatic, Self::Official]
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Reissue => "reissue",
            Self::Diplomatic => "diplomatic",
            Self::Official => "official",
        }
    }

    /// Parse a wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownVariant`] for anything that is not
    /// one of the canonical names.
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        match name {
            "fresh" => Ok(Self::Fresh),
            "reissue" => Ok(Self::Reissue),
            "diplomatic" => Ok(Self::Diplomatic),
            "official" => Ok(Self::Official),
            other => Err(ValidationError::UnknownVariant {
                kind: "application type",
                value: other.to_string(),
                expected: "fresh, reissue, diplomatic, official",
            }),
        }
    }
}

impl std::fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gender as recorded on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Any other self-described gender.
    Other,
}

impl Gender {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marital status as recorded on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    /// Never married.
    Single,
    /// Currently married.
    Married,
    /// Marriage dissolved.
    Divorced,
    /// Spouse deceased.
    Widowed,
}

impl MaritalStatus {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::Divorced => "divorced",
            Self::Widowed => "widowed",
        }
    }
}

impl std::fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Citizenship declared by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Citizenship {
    /// Indian citizen.
    Indian,
    /// Dual citizenship.
    Dual,
    /// Any other citizenship status.
    Other,
}

impl Citizenship {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indian => "indian",
            Self::Dual => "dual",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Citizenship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing track selected at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Standard processing.
    Normal,
    /// Expedited (tatkal) processing.
    Tatkal,
}

impl ServiceType {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Tatkal => "tatkal",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Passport booklet size selected at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookletType {
    /// Standard 36-page booklet.
    ThirtySixPages,
    /// Jumbo 60-page booklet for frequent travellers.
    SixtyPages,
}

impl BookletType {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThirtySixPages => "thirty_six_pages",
            Self::SixtyPages => "sixty_pages",
        }
    }

    /// Number of pages in the booklet.
    pub fn pages(&self) -> u8 {
        match self {
            Self::ThirtySixPages => 36,
            Self::SixtyPages => 60,
        }
    }
}

impl std::fmt::Display for BookletType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_type_wire_form_is_snake_case() {
        let json = serde_json::to_string(&ApplicationType::Diplomatic).unwrap();
        assert_eq!(json, "\"diplomatic\"");
        let back: ApplicationType = serde_json::from_str("\"reissue\"").unwrap();
        assert_eq!(back, ApplicationType::Reissue);
    }

    #[test]
    fn application_type_from_name_round_trips_all() {
        for ty in ApplicationType::all() {
            assert_eq!(ApplicationType::from_name(ty.as_str()).unwrap(), *ty);
        }
    }

    #[test]
    fn application_type_from_name_rejects_unknown() {
        let err = ApplicationType::from_name("urgent").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("urgent"));
        assert!(msg.contains("fresh"));
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(Gender::Other.to_string(), "other");
        assert_eq!(MaritalStatus::Widowed.to_string(), "widowed");
        assert_eq!(Citizenship::Dual.to_string(), "dual");
        assert_eq!(ServiceType::Tatkal.to_string(), "tatkal");
        assert_eq!(BookletType::SixtyPages.to_string(), "sixty_pages");
    }

    #[test]
    fn serde_rejects_unknown_variant() {
        assert!(serde_json::from_str::<Gender>("\"unspecified\"").is_err());
    }

    #[test]
    fn booklet_pages() {
        assert_eq!(BookletType::ThirtySixPages.pages(), 36);
        assert_eq!(BookletType::SixtyPages.pages(), 60);
    }
}
