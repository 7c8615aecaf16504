//! Anonymous application tracking.
//!
//! The track endpoint is the one piece of the API that runs without a
//! bearer token: an applicant proves knowledge of the application number
//! plus the date of birth on file. Every failure mode (malformed number,
//! unknown number, wrong date of birth) returns the same 404 body, so a
//! caller probing numbers learns nothing about which ones exist.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use dpp_core::ApplicationNumber;
use dpp_state::{derive_timeline, PublicApplicationView, Timeline};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// The uniform rejection body for every track failure mode.
const TRACK_NOT_FOUND: &str = "no application found with the provided details";

/// Credentials for an anonymous tracking lookup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackRequest {
    /// Application number printed on the submission receipt.
    pub application_no: String,
    /// Date of birth on file for the applicant.
    pub date_of_birth: NaiveDate,
}

/// Tracking result: the public view of the record plus the derived
/// processing timeline.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackResponse {
    pub application: PublicApplicationView,
    pub timeline: Timeline,
}

/// Build the tracking router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/track", post(track_application))
}

#[utoipa::path(
    post,
    path = "/v1/track",
    request_body = TrackRequest,
    responses(
        (status = 200, description = "Application found", body = TrackResponse),
        (status = 400, description = "Malformed request body"),
        (status = 404, description = "No application matches the provided details"),
    ),
    tag = "track"
)]
async fn track_application(
    State(state): State<AppState>,
    request: Result<Json<TrackRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<TrackResponse>, AppError> {
    let request = extract_json(request)?;

    let not_found = || AppError::NotFound(TRACK_NOT_FOUND.to_string());

    // A malformed number cannot match anything; reject it with the same
    // body as an unknown one.
    let application_no =
        ApplicationNumber::new(&request.application_no).map_err(|_| not_found())?;
    let record = state
        .applications
        .get(&application_no)
        .ok_or_else(not_found)?;

    if record.personal_info.date_of_birth != request.date_of_birth {
        tracing::debug!(
            application_no = %application_no,
            "tracking attempt with mismatched date of birth"
        );
        return Err(not_found());
    }

    let timeline = derive_timeline(record.submitted_at, state.clock.now());
    Ok(Json(TrackResponse {
        application: record.public_view(),
        timeline,
    }))
}
