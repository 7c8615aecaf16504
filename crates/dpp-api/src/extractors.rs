//! # Body Extraction & Validation
//!
//! Body handling is split in two: serde-level failures (malformed JSON,
//! missing or mistyped fields) become 400 responses, while well-formed
//! bodies that break a business rule become 422 responses naming the
//! offending field.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business-rule check applied after deserialization.
///
/// Implementors report the first broken rule as a message that names the
/// field, e.g. `"personal_info.phone: expected exactly 10 digits"`.
pub trait Validate {
    /// First broken rule, as a client-facing message.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON extraction, turning serde failures into 400s.
///
/// Handlers take the body as `Result<Json<T>, JsonRejection>` so the
/// rejection reaches application code instead of axum's default response:
/// ```ignore
/// async fn handler(body: Result<Json<Form>, JsonRejection>) -> Result<Response, AppError> {
///     let form = extract_json(body)?;
///     // use form...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract, then apply [`Validate`]; rule failures become 422s.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        name: String,
    }

    impl Validate for Form {
        fn validate(&self) -> Result<(), String> {
            if self.name.trim().is_empty() {
                return Err("name: must not be empty".into());
            }
            Ok(())
        }
    }

    /// Run a raw body through axum's JSON extraction.
    async fn body_result(raw: &str) -> Result<Json<Form>, JsonRejection> {
        let request = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        Json::<Form>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn well_formed_body_passes_both_helpers() {
        let form = extract_json(body_result(r#"{"name":"Asha"}"#).await).unwrap();
        assert_eq!(form.name, "Asha");

        let form = extract_validated_json(body_result(r#"{"name":"Asha"}"#).await).unwrap();
        assert_eq!(form.name, "Asha");
    }

    #[tokio::test]
    async fn malformed_json_maps_to_bad_request() {
        let err = extract_json(body_result("{not json").await).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn missing_field_maps_to_bad_request() {
        let err = extract_json(body_result("{}").await).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn rule_violation_maps_to_validation() {
        let err = extract_validated_json(body_result(r#"{"name":"  "}"#).await).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("name")),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }
}
