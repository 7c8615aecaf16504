//! Application submission, owner queries, and status administration.
//!
//! All routes in this module sit behind the bearer-token middleware. Visibility
//! is scoped by the caller's role: applicants see only the applications bound
//! to their own user id, while officers and admins see every application.
//! Status changes additionally require the `officer` role or above.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use dpp_core::{
    validate_date_of_birth, AadharNumber, ApplicationNumber, ApplicationType, BookletType,
    Citizenship, Email, Gender, MaritalStatus, PanNumber, PhoneNumber, Pincode, ServiceType,
    UserId, ValidationError,
};
use dpp_state::{
    Address, ApplicationForm, ApplicationRecord, ApplicationStatus, FamilyDetails, PersonalInfo,
    PublicApplicationView,
};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

/// `limit`/`offset` query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct PaginationParams {
    /// Maximum number of items to return (default 100, capped at 1000).
    pub limit: Option<usize>,
    /// Number of items to skip from the start of the result set.
    pub offset: Option<usize>,
}

impl PaginationParams {
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIMIT: usize = 1000;

    fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Request to submit a passport application.
///
/// Closed-choice fields (`application_type`, `gender`, ...) deserialize
/// straight into the domain enums, so an unknown name fails at the JSON
/// layer. Free-text fields arrive as plain strings and are validated
/// field by field in [`CreateApplicationRequest::into_form`].
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApplicationRequest {
    pub application_type: ApplicationType,
    pub service_type: ServiceType,
    pub booklet_type: BookletType,
    pub personal_info: PersonalInfoInput,
    pub present_address: AddressInput,
    pub permanent_address: AddressInput,
    #[serde(default)]
    pub family_details: FamilyDetails,
}

/// Personal details as submitted, before validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PersonalInfoInput {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub citizenship: Citizenship,
    pub email: String,
    pub phone: String,
    pub aadhar_number: String,
    #[serde(default)]
    pub pan_number: Option<String>,
}

/// A postal address as submitted, before validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressInput {
    pub house_no: String,
    pub street: String,
    pub area: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Require a non-empty value after trimming surrounding whitespace.
fn require(value: String, field: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(trimmed.to_string())
}

impl CreateApplicationRequest {
    /// Validate the submission and build the typed form.
    ///
    /// Fails on the first violation in form order, naming the offending
    /// field with its dotted path.
    fn into_form(self, today: NaiveDate) -> Result<ApplicationForm, ValidationError> {
        Ok(ApplicationForm {
            application_type: self.application_type,
            service_type: self.service_type,
            booklet_type: self.booklet_type,
            personal_info: self.personal_info.into_validated(today)?,
            present_address: self.present_address.into_validated("present_address")?,
            permanent_address: self.permanent_address.into_validated("permanent_address")?,
            family_details: self.family_details,
        })
    }
}

impl PersonalInfoInput {
    fn into_validated(self, today: NaiveDate) -> Result<PersonalInfo, ValidationError> {
        let first_name = require(self.first_name, "personal_info.first_name")?;
        let last_name = require(self.last_name, "personal_info.last_name")?;
        validate_date_of_birth(self.date_of_birth, today)?;
        let place_of_birth = require(self.place_of_birth, "personal_info.place_of_birth")?;
        let email = Email::new(require(self.email, "personal_info.email")?)?;
        let phone = PhoneNumber::new(require(self.phone, "personal_info.phone")?)?;
        let aadhar_number =
            AadharNumber::new(require(self.aadhar_number, "personal_info.aadhar_number")?)?;
        let pan_number = match self.pan_number {
            Some(pan) if !pan.trim().is_empty() => Some(PanNumber::new(pan)?),
            _ => None,
        };

        Ok(PersonalInfo {
            first_name,
            middle_name: self
                .middle_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            last_name,
            date_of_birth: self.date_of_birth,
            place_of_birth,
            gender: self.gender,
            marital_status: self.marital_status,
            citizenship: self.citizenship,
            email,
            phone,
            aadhar_number,
            pan_number,
        })
    }
}

impl AddressInput {
    fn into_validated(self, prefix: &str) -> Result<Address, ValidationError> {
        Ok(Address {
            house_no: require(self.house_no, &format!("{prefix}.house_no"))?,
            street: require(self.street, &format!("{prefix}.street"))?,
            area: require(self.area, &format!("{prefix}.area"))?,
            city: require(self.city, &format!("{prefix}.city"))?,
            state: require(self.state, &format!("{prefix}.state"))?,
            pincode: Pincode::new(require(self.pincode, &format!("{prefix}.pincode"))?)?,
        })
    }
}

/// Request to move an application to a new processing status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status name, e.g. `under_review` or `approved`.
    pub status: String,
    /// Officer recording the change.
    #[serde(default)]
    pub officer: Option<String>,
    /// Free-text remarks entered with the change.
    #[serde(default)]
    pub remarks: Option<String>,
}

impl Validate for UpdateStatusRequest {
    fn validate(&self) -> Result<(), String> {
        if ApplicationStatus::from_name(&self.status).is_none() {
            return Err(format!(
                "unknown status '{}'. Valid statuses: {}",
                self.status,
                status_names().join(", ")
            ));
        }
        if let Some(officer) = &self.officer {
            if officer.len() > 255 {
                return Err("officer must not exceed 255 characters".to_string());
            }
        }
        if let Some(remarks) = &self.remarks {
            if remarks.len() > 2000 {
                return Err("remarks must not exceed 2000 characters".to_string());
            }
        }
        Ok(())
    }
}

fn status_names() -> Vec<&'static str> {
    ApplicationStatus::all().iter().map(|s| s.as_str()).collect()
}

/// Identifying fields returned on submission. The full record is available
/// through the owner queries; the response deliberately omits the personal
/// data that was just posted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitApplicationResponse {
    pub application_no: ApplicationNumber,
    pub application_type: ApplicationType,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Confirmation returned after a status update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub application_no: ApplicationNumber,
    pub status: ApplicationStatus,
    pub updated_at: DateTime<Utc>,
}

/// Per-status counts over the applications visible to the caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsSummaryResponse {
    /// Count per status name. Every status appears, zero-filled.
    pub by_status: BTreeMap<String, u64>,
    /// Total applications visible to the caller.
    pub total: u64,
}

/// Build the applications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/applications",
            post(submit_application).get(list_applications),
        )
        .route("/v1/applications/stats/summary", get(stats_summary))
        .route("/v1/applications/:number", get(get_application))
        .route("/v1/applications/:number/status", put(update_status))
}

/// Records visible to the caller. Applicants see only applications bound to
/// their own user id; officers and admins see everything.
fn visible_records(state: &AppState, caller: &CallerIdentity) -> Vec<ApplicationRecord> {
    let all = state.applications.list();
    if caller.has_role(Role::Officer) {
        all
    } else {
        all.into_iter()
            .filter(|record| caller.can_access_application(record))
            .collect()
    }
}

/// Parse a path segment as an application number. A malformed segment maps
/// to the same 404 an unknown number produces, so the path shape leaks
/// nothing about which numbers exist.
fn parse_path_number(raw: &str) -> Result<ApplicationNumber, AppError> {
    ApplicationNumber::new(raw)
        .map_err(|_| AppError::NotFound(format!("application {raw} not found")))
}

#[utoipa::path(
    post,
    path = "/v1/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = SubmitApplicationResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
async fn submit_application(
    State(state): State<AppState>,
    caller: CallerIdentity,
    request: Result<Json<CreateApplicationRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<(StatusCode, Json<SubmitApplicationResponse>), AppError> {
    let request = extract_json(request)?;
    let now = state.clock.now();
    let form = request.into_form(now.date_naive())?;

    // Anonymous-token submissions still get an owner so the record can be
    // claimed later; it just won't match any caller's user id.
    let owner_id = caller.user_id.unwrap_or_else(UserId::new);

    // The generator's collision check only sees inserted records, so two
    // in-flight submissions can draw the same candidate. Retry the draw
    // when the insert loses that race.
    let mut inserted = None;
    for _ in 0..3 {
        let application_no = state
            .number_gen
            .generate(|candidate| state.applications.contains(candidate))?;
        let record = ApplicationRecord::submit(application_no, owner_id, form.clone(), now);
        if state
            .applications
            .insert_new(record.application_no.clone(), record.clone())
        {
            inserted = Some(record);
            break;
        }
    }
    let record = inserted.ok_or_else(|| {
        AppError::Internal("could not allocate a unique application number".to_string())
    })?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::applications::insert(pool, &record).await {
            tracing::error!(
                application_no = %record.application_no,
                error = %e,
                "failed to persist application to database"
            );
            return Err(AppError::Internal(
                "application recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(
        application_no = %record.application_no,
        application_type = %record.application_type,
        "application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            application_no: record.application_no,
            application_type: record.application_type,
            status: record.status,
            submitted_at: record.submitted_at,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/applications",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum items to return (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip"),
    ),
    responses(
        (status = 200, description = "Applications visible to the caller, newest first", body = [PublicApplicationView]),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
async fn list_applications(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(pagination): Query<PaginationParams>,
) -> Json<Vec<PublicApplicationView>> {
    let mut records = visible_records(&state, &caller);
    records.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| b.application_no.as_str().cmp(a.application_no.as_str()))
    });

    let offset = pagination.effective_offset().min(records.len());
    let views: Vec<PublicApplicationView> = records
        .into_iter()
        .skip(offset)
        .take(pagination.effective_limit())
        .map(|record| record.public_view())
        .collect();

    Json(views)
}

#[utoipa::path(
    get,
    path = "/v1/applications/stats/summary",
    responses(
        (status = 200, description = "Per-status counts for the caller's applications", body = StatsSummaryResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
async fn stats_summary(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<StatsSummaryResponse> {
    let records = visible_records(&state, &caller);

    let mut by_status: BTreeMap<String, u64> = ApplicationStatus::all()
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for record in &records {
        *by_status
            .entry(record.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    Json(StatsSummaryResponse {
        by_status,
        total: records.len() as u64,
    })
}

#[utoipa::path(
    get,
    path = "/v1/applications/{number}",
    params(
        ("number" = String, Path, description = "Application number, e.g. DESH25089514237"),
    ),
    responses(
        (status = 200, description = "Full application record", body = ApplicationRecord),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Application belongs to another user"),
        (status = 404, description = "Unknown application number"),
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
async fn get_application(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(number): Path<String>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let application_no = parse_path_number(&number)?;
    let record = state
        .applications
        .get(&application_no)
        .ok_or_else(|| AppError::NotFound(format!("application {number} not found")))?;

    if !caller.can_access_application(&record) {
        return Err(AppError::Forbidden(
            "you do not have access to this application".to_string(),
        ));
    }

    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/v1/applications/{number}/status",
    params(
        ("number" = String, Path, description = "Application number"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an officer or admin"),
        (status = 404, description = "Unknown application number"),
        (status = 409, description = "Transition not allowed from the current status"),
        (status = 422, description = "Unknown status name"),
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
async fn update_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(number): Path<String>,
    request: Result<Json<UpdateStatusRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    require_role(&caller, Role::Officer)?;
    let request = extract_validated_json(request)?;

    let application_no = parse_path_number(&number)?;
    // Validate already checked the name; re-parse to get the typed value.
    let target = ApplicationStatus::from_name(&request.status).ok_or_else(|| {
        AppError::Validation(format!("unknown status '{}'", request.status))
    })?;

    let now = state.clock.now();
    let updated = state
        .applications
        .try_update(&application_no, |record| {
            if !record.status.can_transition_to(target) {
                let valid: Vec<&str> = record
                    .status
                    .valid_transitions()
                    .iter()
                    .map(|s| s.as_str())
                    .collect();
                return Err(AppError::Conflict(format!(
                    "cannot transition application from {} to {}. Valid transitions from {}: [{}]",
                    record.status,
                    target,
                    record.status,
                    valid.join(", ")
                )));
            }
            record
                .apply_transition(target, now, request.officer.clone(), request.remarks.clone())
                .map_err(AppError::from)?;
            Ok(record.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("application {number} not found")))?;
    let record = updated?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::applications::update_status(pool, &record).await {
            tracing::error!(
                application_no = %record.application_no,
                error = %e,
                "failed to persist status update to database"
            );
            return Err(AppError::Internal(
                "status updated in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(
        application_no = %record.application_no,
        status = %record.status,
        "application status updated"
    );

    Ok(Json(UpdateStatusResponse {
        application_no: record.application_no,
        status: record.status,
        updated_at: record.updated_at,
    }))
}
