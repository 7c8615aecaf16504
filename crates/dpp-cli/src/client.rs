//! # Portal HTTP client
//!
//! Thin typed wrapper over `reqwest` for the dpp-api HTTP surface. Each
//! method maps to one endpoint, decodes the success body into a trimmed
//! response struct, and turns the API's error envelope into an `anyhow`
//! error carrying the server's message and error code.
//!
//! The response structs deliberately name only the fields the CLI renders;
//! serde ignores everything else, so the tool keeps working as the API
//! grows new fields.

use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default API address when neither `--api-url` nor `DPP_API_URL` is set.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Resolved connection settings for one CLI invocation.
#[derive(Clone)]
pub struct PortalConfig {
    /// Base URL of the running API.
    pub base_url: String,
    /// Bearer token for authenticated endpoints. `None` leaves the
    /// `Authorization` header off entirely (anonymous tracking only).
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl PortalConfig {
    /// Resolve settings from flags, falling back to `DPP_API_URL` /
    /// `DPP_API_TOKEN` and then to [`DEFAULT_API_URL`].
    pub fn resolve(api_url: Option<String>, token: Option<String>) -> Self {
        let base_url = api_url
            .or_else(|| std::env::var("DPP_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = token.or_else(|| std::env::var("DPP_API_TOKEN").ok());
        Self {
            base_url,
            token,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for a running portal API.
///
/// The bearer token, when present, is installed as a default header at
/// build time so every request carries it.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    /// Build a client from resolved settings.
    ///
    /// Fails when the base URL does not parse or the token contains
    /// characters that cannot appear in an HTTP header.
    pub fn new(config: &PortalConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .with_context(|| format!("invalid API URL: {}", config.base_url))?;

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .context("API token contains characters not allowed in a header")?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /v1/track` — anonymous tracking by application number plus
    /// date of birth.
    pub async fn track(&self, number: &str, date_of_birth: NaiveDate) -> Result<TrackResult> {
        let url = format!("{}/v1/track", self.base_url);
        let body = serde_json::json!({
            "application_no": number,
            "date_of_birth": date_of_birth,
        });
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        let resp = Self::check(resp, "track").await?;
        resp.json()
            .await
            .context("track: response deserialization failed")
    }

    /// `GET /v1/applications` — the applications visible to the token's
    /// identity, newest first.
    pub async fn list_applications(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<ApplicationSummary>> {
        let url = format!("{}/v1/applications", self.base_url);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let resp = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        let resp = Self::check(resp, "list applications").await?;
        resp.json()
            .await
            .context("list applications: response deserialization failed")
    }

    /// `GET /v1/applications`, paged until exhausted, returning the raw
    /// records. The server's JSON is kept untouched so an export
    /// round-trips through other tooling.
    pub async fn export_applications(&self) -> Result<Vec<serde_json::Value>> {
        const PAGE_SIZE: usize = 1000;

        let url = format!("{}/v1/applications", self.base_url);
        let mut records = Vec::new();
        let mut offset = 0usize;
        loop {
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("limit", PAGE_SIZE.to_string()),
                    ("offset", offset.to_string()),
                ])
                .send()
                .await
                .with_context(|| format!("GET {url} failed"))?;
            let resp = Self::check(resp, "export applications").await?;
            let page: Vec<serde_json::Value> = resp
                .json()
                .await
                .context("export applications: response deserialization failed")?;
            let fetched = page.len();
            records.extend(page);
            if fetched < PAGE_SIZE {
                return Ok(records);
            }
            offset += fetched;
        }
    }

    /// `PUT /v1/applications/{number}/status` — officer status update.
    pub async fn update_status(
        &self,
        number: &str,
        status: &str,
        remarks: Option<&str>,
    ) -> Result<StatusUpdate> {
        let url = format!("{}/v1/applications/{number}/status", self.base_url);
        let body = UpdateStatusBody { status, remarks };
        let resp = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;
        let resp = Self::check(resp, "update status").await?;
        resp.json()
            .await
            .context("update status: response deserialization failed")
    }

    /// Map a non-success response to an error carrying the API's message.
    async fn check(resp: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ApiErrorBody>(&body) {
            bail!(
                "{operation}: {} [{}]",
                envelope.error.message,
                envelope.error.code
            );
        }
        bail!("{operation}: HTTP {status} — {body}");
    }
}

#[derive(Debug, Serialize)]
struct UpdateStatusBody<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remarks: Option<&'a str>,
}

/// The subset of an application record the CLI renders in tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSummary {
    /// Unique application number.
    pub application_no: String,
    /// Kind of application (`fresh`, `reissue`, ...).
    pub application_type: String,
    /// Current processing status name.
    pub status: String,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
}

/// One derived timeline stage as served by `POST /v1/track`.
#[derive(Debug, Clone, Deserialize)]
pub struct StageView {
    /// Display label, e.g. `"Police Verification"`.
    pub label: String,
    /// Nominal date once the stage threshold is reached.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Whether the stage threshold has been reached.
    pub completed: bool,
    /// Whether processing currently sits in this stage's window.
    pub current: bool,
}

/// Derived progress for a tracked application.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineView {
    /// Scalar classification, e.g. `"Under Review"`.
    pub current_status: String,
    /// All stages in processing order.
    pub stages: Vec<StageView>,
    /// Whole days elapsed since submission.
    pub processing_days: i64,
    /// Nominal completion estimate.
    pub estimated_completion: DateTime<Utc>,
}

/// Response of `POST /v1/track`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackResult {
    /// The tracked application, owner identity stripped.
    pub application: ApplicationSummary,
    /// Progress derived from the submission instant.
    pub timeline: TimelineView,
}

/// Response of `PUT /v1/applications/{number}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    /// The updated application's number.
    pub application_no: String,
    /// The status the application now holds.
    pub status: String,
    /// When the update was recorded.
    pub updated_at: DateTime<Utc>,
}

/// Error envelope shape served by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- PortalConfig -----------------------------------------------------------

    #[test]
    fn resolve_prefers_flags() {
        let config = PortalConfig::resolve(
            Some("https://portal.example.gov".to_string()),
            Some("flag-token".to_string()),
        );
        assert_eq!(config.base_url, "https://portal.example.gov");
        assert_eq!(config.token.as_deref(), Some("flag-token"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_debug_redacts_token() {
        let config = PortalConfig {
            base_url: "http://localhost:8080".to_string(),
            token: Some("super-secret".to_string()),
            timeout_secs: 30,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    // -- PortalClient construction ----------------------------------------------

    #[test]
    fn client_builds_without_token() {
        let config = PortalConfig {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            timeout_secs: 30,
        };
        assert!(PortalClient::new(&config).is_ok());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let config = PortalConfig {
            base_url: "http://localhost:8080/".to_string(),
            token: None,
            timeout_secs: 30,
        };
        let client = PortalClient::new(&config).expect("client should build");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_rejects_garbage_url() {
        let config = PortalConfig {
            base_url: "not a url".to_string(),
            token: None,
            timeout_secs: 30,
        };
        let err = PortalClient::new(&config).unwrap_err();
        assert!(err.to_string().contains("invalid API URL"));
    }

    #[test]
    fn client_rejects_token_with_control_characters() {
        let config = PortalConfig {
            base_url: "http://localhost:8080".to_string(),
            token: Some("bad\ntoken".to_string()),
            timeout_secs: 30,
        };
        assert!(PortalClient::new(&config).is_err());
    }

    // -- Response decoding ------------------------------------------------------

    #[test]
    fn track_result_decodes_api_shape() {
        let body = serde_json::json!({
            "application": {
                "application_no": "DESH12345678901",
                "application_type": "fresh",
                "service_type": "normal",
                "booklet_type": "thirty_six_pages",
                "status": "submitted",
                "status_history": [],
                "submitted_at": "2025-06-01T09:00:00Z",
                "updated_at": "2025-06-01T09:00:00Z"
            },
            "timeline": {
                "current_status": "Police Verification",
                "stages": [
                    {
                        "label": "Application Submitted",
                        "description": "Your application has been successfully submitted and received.",
                        "date": "2025-06-01T09:00:00Z",
                        "completed": true,
                        "current": false
                    },
                    {
                        "label": "Police Verification",
                        "description": "Police verification process is in progress.",
                        "completed": false,
                        "current": false
                    }
                ],
                "processing_days": 4,
                "estimated_completion": "2025-07-01T09:00:00Z"
            }
        });
        let result: TrackResult =
            serde_json::from_value(body).expect("track response should decode");
        assert_eq!(result.application.application_no, "DESH12345678901");
        assert_eq!(result.timeline.current_status, "Police Verification");
        assert_eq!(result.timeline.processing_days, 4);
        assert!(result.timeline.stages[0].date.is_some());
        assert!(result.timeline.stages[1].date.is_none());
    }

    #[test]
    fn error_envelope_decodes() {
        let body = r#"{"error":{"code":"NOT_FOUND","message":"no application found"}}"#;
        let envelope: ApiErrorBody = serde_json::from_str(body).expect("envelope decodes");
        assert_eq!(envelope.error.code, "NOT_FOUND");
        assert_eq!(envelope.error.message, "no application found");
    }

    #[test]
    fn update_status_body_omits_absent_remarks() {
        let body = UpdateStatusBody {
            status: "approved",
            remarks: None,
        };
        let json = serde_json::to_string(&body).expect("serialize");
        assert_eq!(json, r#"{"status":"approved"}"#);
    }

    #[test]
    fn update_status_body_carries_remarks() {
        let body = UpdateStatusBody {
            status: "under_review",
            remarks: Some("called applicant"),
        };
        let json = serde_json::to_string(&body).expect("serialize");
        assert!(json.contains("called applicant"));
    }
}
