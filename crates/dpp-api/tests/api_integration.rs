//! # Integration Tests for dpp-api
//!
//! Exercises the fully assembled app: authentication middleware, submission
//! and validation, owner-scoped queries, officer status updates, anonymous
//! tracking, rate limiting, metrics, and the derived timeline against a
//! fixed clock.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use dpp_api::middleware::rate_limit::RateLimitConfig;
use dpp_api::state::{AppConfig, AppState};
use dpp_core::FixedClock;

const TEST_SECRET: &str = "integration-secret";

/// Helper: build the test app with auth disabled (every caller is admin).
fn test_app() -> axum::Router {
    dpp_api::app(AppState::new())
}

/// Helper: build the test app with bearer auth enabled.
fn test_app_with_auth() -> axum::Router {
    let config = AppConfig {
        auth_token: Some(TEST_SECRET.to_string()),
        ..AppConfig::default()
    };
    dpp_api::app(AppState::with_config(config).expect("default prefix is valid"))
}

/// Collect a response body into a string.
async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body and parse it as JSON.
async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid_submission() -> Value {
    json!({
        "application_type": "fresh",
        "service_type": "normal",
        "booklet_type": "thirty_six_pages",
        "personal_info": {
            "first_name": "Asha",
            "last_name": "Verma",
            "date_of_birth": "1992-04-15",
            "place_of_birth": "Pune",
            "gender": "female",
            "marital_status": "single",
            "citizenship": "indian",
            "email": "asha.verma@example.in",
            "phone": "9876543210",
            "aadhar_number": "123412341234"
        },
        "present_address": {
            "house_no": "14-B",
            "street": "MG Road",
            "area": "Shivajinagar",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411005"
        },
        "permanent_address": {
            "house_no": "14-B",
            "street": "MG Road",
            "area": "Shivajinagar",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411005"
        }
    })
}

/// Helper: JSON request with an optional bearer token.
fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Helper: GET request with an optional bearer token.
fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Helper: submit an application and return the generated number.
async fn submit(app: &axum::Router, token: Option<&str>) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/applications",
            token,
            &valid_submission(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["application_no"].as_str().unwrap().to_string()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = app
        .oneshot(get_request("/health/liveness", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app();
    let response = app
        .oneshot(get_request("/health/readiness", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_auth_rejects_missing_token() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(get_request("/v1/applications", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "access token required");
}

#[tokio::test]
async fn test_auth_rejects_wrong_token() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(get_request("/v1/applications", Some("wrong-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "invalid or expired token");
}

#[tokio::test]
async fn test_auth_accepts_legacy_secret_as_admin() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(get_request("/v1/applications", Some(TEST_SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_accepts_role_qualified_tokens() {
    let app = test_app_with_auth();

    let officer = format!("officer::{TEST_SECRET}");
    let response = app
        .clone()
        .oneshot(get_request("/v1/applications", Some(&officer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // An applicant token without an account binding authenticates but
    // sees an empty portfolio.
    let applicant = format!("applicant::{TEST_SECRET}");
    let response = app
        .oneshot(get_request("/v1/applications", Some(&applicant)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_health_bypasses_auth() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(get_request("/health/liveness", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Submission ---------------------------------------------------------------

#[tokio::test]
async fn test_submit_returns_identifying_fields_only() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/v1/applications",
            Some(TEST_SECRET),
            &valid_submission(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 4);
    assert!(fields.contains_key("application_no"));
    assert!(fields.contains_key("application_type"));
    assert!(fields.contains_key("status"));
    assert!(fields.contains_key("submitted_at"));
    assert_eq!(body["status"], "submitted");
}

#[tokio::test]
async fn test_submit_missing_section_is_400() {
    let app = test_app();
    let mut body = valid_submission();
    body.as_object_mut().unwrap().remove("present_address");

    let response = app
        .oneshot(json_request(Method::POST, "/v1/applications", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_submit_invalid_email_is_422() {
    let app = test_app();
    let mut body = valid_submission();
    body["personal_info"]["email"] = json!("not-an-email");

    let response = app
        .oneshot(json_request(Method::POST, "/v1/applications", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid email address"));
}

// -- Owner Queries ------------------------------------------------------------

#[tokio::test]
async fn test_applicant_flow_is_owner_scoped() {
    let app = test_app_with_auth();
    let asha = format!("applicant:550e8400-e29b-41d4-a716-446655440000:{TEST_SECRET}");
    let ravi = format!("applicant:6ba7b810-9dad-11d1-80b4-00c04fd430c8:{TEST_SECRET}");

    let asha_first = submit(&app, Some(&asha)).await;
    let asha_second = submit(&app, Some(&asha)).await;
    let ravi_only = submit(&app, Some(&ravi)).await;

    // Each applicant lists only their own applications.
    let response = app
        .clone()
        .oneshot(get_request("/v1/applications", Some(&asha)))
        .await
        .unwrap();
    let listed = body_json(response).await;
    let numbers: HashSet<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["application_no"].as_str().unwrap())
        .collect();
    assert_eq!(numbers.len(), 2);
    assert!(numbers.contains(asha_first.as_str()));
    assert!(numbers.contains(asha_second.as_str()));

    // Fetching a foreign application is forbidden, not hidden.
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/v1/applications/{ravi_only}"),
            Some(&asha),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Stats are scoped the same way.
    let response = app
        .clone()
        .oneshot(get_request("/v1/applications/stats/summary", Some(&asha)))
        .await
        .unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["by_status"]["submitted"], 2);
    assert_eq!(stats["by_status"]["approved"], 0);

    // Officers see everything.
    let officer = format!("officer::{TEST_SECRET}");
    let response = app
        .oneshot(get_request("/v1/applications", Some(&officer)))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

// -- Status Lifecycle ---------------------------------------------------------

#[tokio::test]
async fn test_officer_status_flow() {
    let app = test_app_with_auth();
    let officer = format!("officer::{TEST_SECRET}");
    let number = submit(&app, Some(TEST_SECRET)).await;
    let status_uri = format!("/v1/applications/{number}/status");

    // Applicants cannot drive the lifecycle.
    let applicant = format!("applicant:550e8400-e29b-41d4-a716-446655440000:{TEST_SECRET}");
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &status_uri,
            Some(&applicant),
            &json!({"status": "under_review"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Officers can.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &status_uri,
            Some(&officer),
            &json!({"status": "under_review", "officer": "R. Iyer", "remarks": "Documents received"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "under_review");
    assert_eq!(body["application_no"].as_str().unwrap(), number);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &status_uri,
            Some(&officer),
            &json!({"status": "documents_verified"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The full record shows the append-only trail.
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/v1/applications/{number}"),
            Some(&officer),
        ))
        .await
        .unwrap();
    let record = body_json(response).await;
    let history = record["status_history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["status"], "submitted");
    assert_eq!(history[1]["status"], "under_review");
    assert_eq!(history[1]["officer"], "R. Iyer");
    assert_eq!(history[2]["status"], "documents_verified");

    // Backward transitions are rejected with the valid targets listed.
    let response = app
        .oneshot(json_request(
            Method::PUT,
            &status_uri,
            Some(&officer),
            &json!({"status": "submitted"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Valid transitions from documents_verified"));
}

// -- Anonymous Tracking -------------------------------------------------------

#[tokio::test]
async fn test_track_round_trip_without_token() {
    let app = test_app_with_auth();
    let number = submit(&app, Some(TEST_SECRET)).await;

    // No Authorization header at all.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/track",
            None,
            &json!({"application_no": number, "date_of_birth": "1992-04-15"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["application"]["application_no"].as_str().unwrap(), number);
    assert!(body["application"].get("owner_id").is_none());
    assert_eq!(body["timeline"]["stages"].as_array().unwrap().len(), 7);

    // A wrong date of birth is indistinguishable from an unknown number.
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/v1/track",
            None,
            &json!({"application_no": number, "date_of_birth": "1990-01-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "no application found with the provided details"
    );
}

#[tokio::test]
async fn test_timeline_advances_with_the_clock() {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    ));
    let state = AppState::with_parts(AppConfig::default(), clock.clone(), None)
        .expect("default prefix is valid");
    let app = dpp_api::app(state);

    let number = submit(&app, None).await;
    clock.advance(chrono::Duration::days(4));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/v1/track",
            None,
            &json!({"application_no": number, "date_of_birth": "1992-04-15"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["timeline"]["current_status"], "Police Verification");
    assert_eq!(body["timeline"]["processing_days"], 4);
    // Submission, document verification, and police verification stages
    // are complete at day 4; approval is not.
    let stages = body["timeline"]["stages"].as_array().unwrap();
    assert_eq!(stages[2]["completed"], true);
    assert_eq!(stages[2]["current"], true);
    assert_eq!(stages[3]["completed"], false);
}

// -- Rate Limiting ------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_enforced_across_the_surface() {
    let config = AppConfig {
        rate_limit: RateLimitConfig {
            max_requests: 3,
            window_secs: 600,
        },
        ..AppConfig::default()
    };
    let app = dpp_api::app(AppState::with_config(config).expect("default prefix is valid"));

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get_request("/v1/applications", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_request("/v1/applications", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
    assert_eq!(
        body["error"]["message"],
        "Too many requests from this IP, please try again later."
    );

    // Health probes sit outside the limiter.
    let response = app
        .oneshot(get_request("/health/liveness", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_reflect_store_contents() {
    let app = test_app();
    submit(&app, None).await;

    let response = app.oneshot(get_request("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("dpp_applications_total{status=\"submitted\"} 1"));
    assert!(body.contains("dpp_status_history_entries_total 1"));
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_served() {
    let app = test_app_with_auth();
    let response = app
        .oneshot(get_request("/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["paths"].get("/v1/track").is_some());
    assert!(body["paths"].get("/v1/applications").is_some());
}

// -- Concurrency --------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_get_distinct_numbers() {
    let app = test_app();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let response = app
                .oneshot(json_request(
                    Method::POST,
                    "/v1/applications",
                    None,
                    &valid_submission(),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            let body = body_json(response).await;
            body["application_no"].as_str().unwrap().to_string()
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        numbers.insert(handle.await.unwrap());
    }
    assert_eq!(numbers.len(), 50);
}
