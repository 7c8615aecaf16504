//! # API Error Envelope
//!
//! [`AppError`] is the one error type handlers return. It maps dpp-core
//! and dpp-state failures onto HTTP statuses and renders the uniform
//! `{"error": {code, message, details?}}` body. Internal messages are
//! logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body of every non-2xx response.
///
/// `details` is populated only for 422 validation failures; 500-class
/// responses carry a fixed message and nothing else.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Code, message, and optional field-level context.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable machine code, e.g. "NOT_FOUND" or "VALIDATION_ERROR".
    pub code: String,
    /// Client-facing description of what went wrong.
    pub message: String,
    /// Field-level context, carried by 422 responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Failure taxonomy for the HTTP surface.
///
/// Each variant fixes a status and a stable machine code; the payload
/// string becomes the client-visible message, except for
/// [`AppError::Internal`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup target does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Well-formed body that breaks a business rule (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed body or parameters (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or unrecognized bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the privilege (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request clashes with the resource's current state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Client exceeded the per-window request quota (429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Unexpected failure (500). The payload string is for the logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status and stable machine code for this variant.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // 500-class messages stay in the logs; the client gets a fixed line.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert dpp-core validation errors to API errors.
impl From<dpp_core::ValidationError> for AppError {
    fn from(err: dpp_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert status transition errors to API errors.
impl From<dpp_state::StatusError> for AppError {
    fn from(err: dpp_state::StatusError) -> Self {
        match &err {
            dpp_state::StatusError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
        }
    }
}

/// Convert number generator errors to API errors.
///
/// Both variants are server-side conditions (misconfiguration or an
/// exhausted retry budget), so neither surfaces detail to the client.
impl From<dpp_state::NumberGeneratorError> for AppError {
    fn from(err: dpp_state::NumberGeneratorError) -> Self {
        Self::Internal(err.to_string())
    }
}
