//! # dpp-api — Axum API Service for the Desh Passport Portal
//!
//! Backend for the passport application portal: validated intake,
//! owner-scoped queries, an officer-driven status lifecycle with an
//! append-only history trail, and anonymous tracking with a derived
//! processing timeline.
//!
//! ## Routes
//!
//! | Prefix                        | Module                    | Auth      |
//! |-------------------------------|---------------------------|-----------|
//! | `/v1/applications*`           | [`routes::applications`]  | Bearer    |
//! | `/v1/track`                   | [`routes::track`]         | None      |
//! | `/openapi.json`               | [`openapi`]               | None      |
//! | `/health/*`, `/metrics`       | this module               | None      |
//!
//! ## Middleware, outermost first
//!
//! ```text
//! TraceLayer → MetricsMiddleware → RateLimitMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Rate limiting sits outside auth because the anonymous track endpoint
//! must consume quota too; auth applies only to the applications subtree.
//!
//! ## OpenAPI
//!
//! The document served at `/openapi.json` is generated from utoipa derive
//! annotations on the handlers and DTOs; see [`openapi`].

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use dpp_state::ApplicationStatus;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::RateLimiter;
use crate::state::{AppConfig, AppState};

/// Check if metrics are enabled via the `DPP_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other
/// than `"false"`.
fn metrics_enabled() -> bool {
    std::env::var("DPP_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// CORS layer allowing the configured web frontend origin.
///
/// An unparseable origin disables cross-origin access rather than failing
/// startup; same-origin API clients are unaffected either way.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!(
                origin = %config.frontend_origin,
                "invalid frontend origin, cross-origin requests disabled"
            );
            CorsLayer::new()
        }
    }
}

/// Wire every route and middleware layer into the portal router.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the rate
/// limiter and auth so probes and scrapes never compete with client quota.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(state.config.rate_limit.clone());
    let metrics_on = metrics_enabled();

    // Bearer auth wraps only the applications surface. Tracking is
    // anonymous by design: the application number + date of birth pair is
    // the credential.
    let protected = routes::applications::router().layer(from_fn(auth::auth_middleware));

    // Body size limit: 2 MiB. An application form is a few KiB; anything
    // near the limit is hostile or broken.
    let mut api = Router::new()
        .merge(protected)
        .merge(routes::track::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware));

    // The recording middleware is attached only when the scrape surface is on.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )))
        .layer(cors_layer(&state.config))
        .layer(Extension(auth_config))
        .layer(Extension(limiter))
        .with_state(state.clone());

    // Probes and scrapes bypass auth and the rate limiter.
    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    // Mount /metrics when metrics are enabled (unauthenticated, like probes).
    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — text exposition for the Prometheus scraper.
///
/// Updates domain gauges from current `AppState` on each scrape (pull
/// model), then gathers and encodes all metrics in Prometheus text
/// exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let records = state.applications.list();

    let mut by_status: HashMap<&'static str, usize> = HashMap::new();
    for record in &records {
        *by_status.entry(record.status.as_str()).or_default() += 1;
    }
    // Reset, then set every status label so absent statuses read zero.
    metrics.applications_total().reset();
    for status in ApplicationStatus::all() {
        let count = by_status.get(status.as_str()).copied().unwrap_or(0);
        metrics
            .applications_total()
            .with_label_values(&[status.as_str()])
            .set(count as f64);
    }

    let history_entries: usize = records.iter().map(|r| r.status_history.len()).sum();
    metrics
        .status_history_entries_total()
        .set(history_entries as f64);

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// GET /health/liveness — 200 whenever the process can answer at all.
async fn liveness() -> &'static str {
    "ok"
}

/// GET /health/readiness — whether the portal should receive traffic.
///
/// The in-memory store must take a read lock and, when a database is
/// attached, `SELECT 1` must succeed. Answers 200 "ready" or 503 naming
/// the failing dependency.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // A read lock must be obtainable.
    let _ = state.applications.len();

    // Ping the database when one is attached.
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
