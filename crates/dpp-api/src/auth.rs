//! # Bearer Authentication
//!
//! Token checking and role gating for the `/v1/applications` subtree.
//!
//! ## Accepted Tokens
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}   — role-qualified format
//! Bearer {secret}                     — legacy format (treated as admin)
//! ```
//!
//! The roles are `applicant` (citizens submitting and reading their own
//! applications), `officer` (passport office staff updating statuses), and
//! `admin` (full access). When no token is configured the middleware runs
//! in development mode and every request is treated as admin.
//!
//! ## Identity Resolution
//!
//! The middleware resolves each request to a [`CallerIdentity`] stored in
//! the request extensions; handlers take it as an extractor argument.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

use dpp_core::UserId;
use dpp_state::ApplicationRecord;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── Roles ───────────────────────────────────────────────────────────────────

/// Roles in the passport portal, ordered by privilege level.
///
/// `Ord` follows declaration order, `Applicant < Officer < Admin`, so a
/// minimum-role check is a single `>=` comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can submit applications and read their own.
    Applicant,
    /// Can read all applications and update statuses.
    Officer,
    /// Unrestricted access.
    Admin,
}

impl Role {
    /// Lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applicant => "applicant",
            Self::Officer => "officer",
            Self::Admin => "admin",
        }
    }
}

// ── Caller identity ─────────────────────────────────────────────────────────

/// Who is making the request, as resolved by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Privilege level granted by the token.
    pub role: Role,
    /// The caller's account ID. Applicant tokens carry one so owner-scoped
    /// queries can bind to it; officer and admin tokens may omit it.
    pub user_id: Option<UserId>,
}

impl CallerIdentity {
    /// Whether the caller holds `minimum` or a higher role.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }

    /// Check if the caller can access the given application.
    ///
    /// - `Admin` and `Officer` can access any application.
    /// - `Applicant` can only access applications they own.
    pub fn can_access_application(&self, record: &ApplicationRecord) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Officer => true,
            Role::Applicant => match self.user_id {
                Some(caller) => caller == record.owner_id,
                None => false, // token with no account binding = denied
            },
        }
    }
}

/// Extractor impl: pulls the identity the middleware stored in request
/// extensions. No stored identity means the middleware never ran for this
/// route, which reads as 401.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Reject callers below `minimum` with a 403 naming both roles.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

// ── Auth config ─────────────────────────────────────────────────────────────

/// Expected bearer secret, handed to the middleware via request
/// extensions. `Debug` hides the value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token checks ────────────────────────────────────────────────────────────

/// Length-guarded constant-time token comparison.
///
/// The timing profile must not depend on how much of the token matched, so
/// unequal lengths still pay for one full comparison before failing.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        // Burn a comparison so unequal lengths cost the same.
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse `{role}:{user_id}:{secret}` or a legacy bare `{secret}` against
/// the configured secret.
///
/// A bare secret resolves to an unbound `Admin` identity; pre-role tokens
/// stay valid.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.len() {
        // Bare secret, pre-role format. Resolves to admin.
        1 => {
            if constant_time_token_eq(provided, expected_secret) {
                Ok(CallerIdentity {
                    role: Role::Admin,
                    user_id: None,
                })
            } else {
                Err("invalid bearer token".into())
            }
        }
        // role:user_id:secret; staff tokens may leave user_id empty.
        3 => {
            let role_str = parts[0];
            let user_str = parts[1];
            let secret = parts[2];

            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = match role_str {
                "admin" => Role::Admin,
                "officer" => Role::Officer,
                "applicant" => Role::Applicant,
                other => return Err(format!("unknown role: {other}")),
            };

            let user_id = if user_str.is_empty() {
                None
            } else {
                Some(UserId::from_uuid(
                    user_str
                        .parse::<Uuid>()
                        .map_err(|e| format!("invalid user_id: {e}"))?,
                ))
            };

            Ok(CallerIdentity { role, user_id })
        }
        _ => Err("invalid token format — expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

// ── Request middleware ───────────────────────────────────────────────────────

/// Bearer check for the authenticated subtree.
///
/// Resolves the `Authorization` header to a [`CallerIdentity`] and stores
/// it in the request extensions. When `AuthConfig.token` is `None` every
/// request gets an admin identity (development mode).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(reason) => {
                            tracing::warn!(%reason, "authentication failed: bearer token rejected");
                            unauthorized_response("invalid or expired token")
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("invalid or expired token")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("access token required")
                }
            }
        }
        _ => {
            // Auth disabled — inject admin identity for full access.
            request.extensions_mut().insert(CallerIdentity {
                role: Role::Admin,
                user_id: None,
            });
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
