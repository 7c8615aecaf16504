//! # Application Records
//!
//! The [`ApplicationRecord`] aggregate and its nested structures, exactly as
//! persisted and served. Two views exist:
//!
//! - the full record, returned to the owner and to officers;
//! - [`PublicApplicationView`], returned to anonymous tracking callers,
//!   with the owner identity and document metadata stripped.
//!
//! Records are created through [`ApplicationRecord::submit`] (which seeds
//! the status history) and mutated only through
//! [`ApplicationRecord::apply_transition`] (which enforces the transition
//! table and appends to the history). There is no other mutation path.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use dpp_core::{
    AadharNumber, ApplicationNumber, ApplicationType, BookletType, Citizenship, Email, Gender,
    MaritalStatus, PanNumber, PhoneNumber, Pincode, ServiceType, UserId,
};

use crate::status::{ApplicationStatus, StatusError, StatusHistoryEntry};

/// Personal details collected on the application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersonalInfo {
    /// Given name.
    pub first_name: String,
    /// Middle name, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Date of birth. Also the shared secret for anonymous tracking.
    pub date_of_birth: NaiveDate,
    /// City or village of birth.
    pub place_of_birth: String,
    /// Gender.
    pub gender: Gender,
    /// Marital status.
    pub marital_status: MaritalStatus,
    /// Citizenship declaration.
    pub citizenship: Citizenship,
    /// Contact email.
    pub email: Email,
    /// Contact mobile number.
    pub phone: PhoneNumber,
    /// Aadhar number.
    pub aadhar_number: AadharNumber,
    /// PAN, when the applicant has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<PanNumber>,
}

/// A postal address as collected on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    /// House or flat number.
    pub house_no: String,
    /// Street name.
    pub street: String,
    /// Area or locality.
    pub area: String,
    /// City or town.
    pub city: String,
    /// State or union territory.
    pub state: String,
    /// Six-digit postal code.
    pub pincode: Pincode,
}

/// Emergency contact inside [`FamilyDetails`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContact {
    /// Contact person's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relationship to the applicant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    /// Contact phone number, free-form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact address, free-form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Optional family information collected on the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FamilyDetails {
    /// Father's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    /// Mother's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    /// Spouse's name, for married applicants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_name: Option<String>,
    /// Emergency contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
}

/// Upload metadata for one document slot.
///
/// There are no upload endpoints; the slot records what an external intake
/// process attached so views can strip it and persistence can round-trip it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentSlot {
    /// Stored filename, when a file was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Whether the slot has been filled.
    #[serde(default)]
    pub uploaded: bool,
}

/// Per-slot document metadata for an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentsInfo {
    /// Passport photograph.
    pub photograph: DocumentSlot,
    /// Specimen signature.
    pub signature: DocumentSlot,
    /// Birth certificate.
    pub birth_certificate: DocumentSlot,
    /// Proof of present address.
    pub address_proof: DocumentSlot,
    /// Identity proof.
    pub identity_proof: DocumentSlot,
}

/// The validated submission payload: everything an applicant provides.
///
/// Construction of this type is the validation boundary — the HTTP layer
/// builds it from a request DTO, so a held form is always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationForm {
    /// Kind of application being filed.
    pub application_type: ApplicationType,
    /// Processing track.
    pub service_type: ServiceType,
    /// Booklet size.
    pub booklet_type: BookletType,
    /// Personal details.
    pub personal_info: PersonalInfo,
    /// Present address.
    pub present_address: Address,
    /// Permanent address.
    pub permanent_address: Address,
    /// Optional family information.
    #[serde(default)]
    pub family_details: FamilyDetails,
}

/// A submitted passport application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationRecord {
    /// Unique application number. Immutable once assigned.
    pub application_no: ApplicationNumber,
    /// Account that submitted the application. Never exposed to anonymous
    /// callers.
    pub owner_id: UserId,
    /// Kind of application.
    pub application_type: ApplicationType,
    /// Processing track.
    pub service_type: ServiceType,
    /// Booklet size.
    pub booklet_type: BookletType,
    /// Personal details.
    pub personal_info: PersonalInfo,
    /// Present address.
    pub present_address: Address,
    /// Permanent address.
    pub permanent_address: Address,
    /// Optional family information.
    #[serde(default)]
    pub family_details: FamilyDetails,
    /// Document slot metadata. Never exposed to anonymous callers.
    #[serde(default)]
    pub documents: DocumentsInfo,
    /// Current processing status.
    pub status: ApplicationStatus,
    /// Append-only transition log. The last entry always matches `status`.
    pub status_history: Vec<StatusHistoryEntry>,
    /// When the application was submitted. Set once, never overwritten.
    pub submitted_at: DateTime<Utc>,
    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Create a record for a freshly submitted application.
    ///
    /// Status starts at [`ApplicationStatus::Submitted`] with the history
    /// seeded by a single matching entry. Document slots start empty.
    pub fn submit(
        application_no: ApplicationNumber,
        owner_id: UserId,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            application_no,
            owner_id,
            application_type: form.application_type,
            service_type: form.service_type,
            booklet_type: form.booklet_type,
            personal_info: form.personal_info,
            present_address: form.present_address,
            permanent_address: form.permanent_address,
            family_details: form.family_details,
            documents: DocumentsInfo::default(),
            status: ApplicationStatus::Submitted,
            status_history: vec![StatusHistoryEntry {
                status: ApplicationStatus::Submitted,
                timestamp: submitted_at,
                officer: None,
                remarks: Some("Application submitted successfully".to_string()),
            }],
            submitted_at,
            updated_at: submitted_at,
        }
    }

    /// Transition the application to a new status, appending to the history.
    ///
    /// When `remarks` is absent a default `Status updated to <status>` note
    /// is recorded, so every history entry explains itself.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::InvalidTransition`] if the transition table
    /// does not allow `to` from the current status; the record is left
    /// untouched.
    pub fn apply_transition(
        &mut self,
        to: ApplicationStatus,
        at: DateTime<Utc>,
        officer: Option<String>,
        remarks: Option<String>,
    ) -> Result<(), StatusError> {
        if !self.status.can_transition_to(to) {
            return Err(StatusError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        self.status_history.push(StatusHistoryEntry {
            status: to,
            timestamp: at,
            officer,
            remarks: remarks.or_else(|| Some(format!("Status updated to {to}"))),
        });
        self.updated_at = at;
        Ok(())
    }

    /// The view served to anonymous tracking callers: the full record minus
    /// the owner identity and document metadata.
    pub fn public_view(&self) -> PublicApplicationView {
        PublicApplicationView {
            application_no: self.application_no.clone(),
            application_type: self.application_type,
            service_type: self.service_type,
            booklet_type: self.booklet_type,
            personal_info: self.personal_info.clone(),
            present_address: self.present_address.clone(),
            permanent_address: self.permanent_address.clone(),
            family_details: self.family_details.clone(),
            status: self.status,
            status_history: self.status_history.clone(),
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
        }
    }
}

/// An [`ApplicationRecord`] with the owner identity and document metadata
/// stripped. Served to anonymous tracking callers and in owner list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicApplicationView {
    /// Unique application number.
    pub application_no: ApplicationNumber,
    /// Kind of application.
    pub application_type: ApplicationType,
    /// Processing track.
    pub service_type: ServiceType,
    /// Booklet size.
    pub booklet_type: BookletType,
    /// Personal details.
    pub personal_info: PersonalInfo,
    /// Present address.
    pub present_address: Address,
    /// Permanent address.
    pub permanent_address: Address,
    /// Optional family information.
    #[serde(default)]
    pub family_details: FamilyDetails,
    /// Current processing status.
    pub status: ApplicationStatus,
    /// Append-only transition log.
    pub status_history: Vec<StatusHistoryEntry>,
    /// When the application was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}
