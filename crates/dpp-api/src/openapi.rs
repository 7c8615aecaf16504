//! # OpenAPI Document Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`. The spec is the contract the web frontend
//! and the `dpp` CLI are built against.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Bearer token authentication. Tokens carry a role: \
                             `role:user_id:secret` (role one of applicant, officer, \
                             admin) or a bare legacy secret, which grants admin. \
                             Set via DPP_AUTH_TOKEN env var.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// The portal's OpenAPI document, derived from the handler annotations.
///
/// Collects every documented route, schema, tag, and security scheme into
/// one document; what integrators read is generated from here.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DPP API — Desh Passport Portal",
        version = "0.3.2",
        description = "Axum API service for the Desh Passport Portal.\n\nProvides:\n- **Application intake**: validated passport application submission with server-generated application numbers\n- **Owner queries**: paginated listings and per-status summaries, scoped to the caller\n- **Status lifecycle**: officer-driven status transitions with an append-only history trail\n- **Anonymous tracking**: application number + date of birth lookup with a derived processing timeline\n\nAuthentication: Bearer token via `Authorization: Bearer <token>` header.\nAll `/v1/applications*` endpoints require authentication. `/v1/track` and health probes are unauthenticated.",
        license(name = "AGPL-3.0-or-later"),
        contact(name = "Desh Portal", url = "https://github.com/desh-portal/dpp-stack")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // ── Applications ─────────────────────────────────────────────────
        crate::routes::applications::submit_application,
        crate::routes::applications::list_applications,
        crate::routes::applications::stats_summary,
        crate::routes::applications::get_application,
        crate::routes::applications::update_status,
        // ── Tracking ─────────────────────────────────────────────────────
        crate::routes::track::track_application,
    ),
    components(
        schemas(
            // ── Record types ─────────────────────────────────────────────
            dpp_state::ApplicationRecord,
            dpp_state::PublicApplicationView,
            dpp_state::ApplicationForm,
            dpp_state::PersonalInfo,
            dpp_state::Address,
            dpp_state::FamilyDetails,
            dpp_state::EmergencyContact,
            dpp_state::DocumentsInfo,
            dpp_state::DocumentSlot,
            dpp_state::ApplicationStatus,
            dpp_state::StatusHistoryEntry,
            dpp_state::Timeline,
            dpp_state::TimelineStage,
            dpp_state::CurrentStatus,
            // ── Domain scalar types ──────────────────────────────────────
            dpp_core::ApplicationNumber,
            dpp_core::UserId,
            dpp_core::AadharNumber,
            dpp_core::PanNumber,
            dpp_core::Email,
            dpp_core::PhoneNumber,
            dpp_core::Pincode,
            dpp_core::ApplicationType,
            dpp_core::ServiceType,
            dpp_core::BookletType,
            dpp_core::Gender,
            dpp_core::MaritalStatus,
            dpp_core::Citizenship,
            // ── Error types ──────────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Auth ─────────────────────────────────────────────────────
            crate::auth::Role,
            // ── Application DTOs ─────────────────────────────────────────
            crate::routes::applications::PaginationParams,
            crate::routes::applications::CreateApplicationRequest,
            crate::routes::applications::PersonalInfoInput,
            crate::routes::applications::AddressInput,
            crate::routes::applications::UpdateStatusRequest,
            crate::routes::applications::SubmitApplicationResponse,
            crate::routes::applications::UpdateStatusResponse,
            crate::routes::applications::StatsSummaryResponse,
            // ── Tracking DTOs ────────────────────────────────────────────
            crate::routes::track::TrackRequest,
            crate::routes::track::TrackResponse,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "applications", description = "Application intake, owner queries, and officer status administration"),
        (name = "track", description = "Anonymous tracking — application number + date of birth lookup with derived timeline"),
    )
)]
pub struct ApiDoc;

/// Router exposing the generated document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — serve the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates_successfully() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "DPP API — Desh Passport Portal");
        assert_eq!(spec.info.version, "0.3.2");
    }

    #[test]
    fn spec_has_application_paths() {
        let spec = ApiDoc::openapi();
        assert!(
            spec.paths.paths.contains_key("/v1/applications"),
            "should contain /v1/applications"
        );
        assert!(
            spec.paths.paths.contains_key("/v1/applications/{number}"),
            "should contain the single-application path"
        );
        assert!(
            spec.paths
                .paths
                .contains_key("/v1/applications/{number}/status"),
            "should contain the status update path"
        );
        assert!(
            spec.paths
                .paths
                .contains_key("/v1/applications/stats/summary"),
            "should contain the stats path"
        );
    }

    #[test]
    fn spec_has_track_path() {
        let spec = ApiDoc::openapi();
        assert!(
            spec.paths.paths.contains_key("/v1/track"),
            "should contain /v1/track"
        );
    }

    #[test]
    fn spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.as_ref().expect("spec should have tags");
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        for expected in &["applications", "track"] {
            assert!(tag_names.contains(expected), "should contain {expected} tag");
        }
    }

    #[test]
    fn spec_has_components() {
        let spec = ApiDoc::openapi();
        let components = spec.components.as_ref().expect("spec should have components");
        for name in &[
            "ApplicationRecord",
            "PublicApplicationView",
            "ApplicationStatus",
            "Timeline",
            "CreateApplicationRequest",
            "TrackRequest",
            "TrackResponse",
            "ErrorBody",
        ] {
            assert!(
                components.schemas.contains_key(*name),
                "should contain {name} schema"
            );
        }
    }

    #[test]
    fn spec_has_security_scheme() {
        let spec = ApiDoc::openapi();
        let components = spec.components.as_ref().expect("spec should have components");
        assert!(
            components.security_schemes.contains_key("bearer_auth"),
            "should contain bearer_auth security scheme"
        );
    }

    #[test]
    fn spec_serializes_to_json() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).expect("spec should serialize");
        assert!(json.contains("openapi"));
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn router_builds() {
        let _router = router();
    }
}
