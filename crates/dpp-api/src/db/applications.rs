//! Application record persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `applications` table.
//! Scalar fields are stored as text columns so they can be indexed and
//! inspected with plain SQL; nested form sections are stored as JSONB.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use dpp_core::{ApplicationNumber, ApplicationType, UserId};
use dpp_state::{ApplicationRecord, ApplicationStatus};

/// Insert a new application record.
pub async fn insert(pool: &PgPool, record: &ApplicationRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO applications (application_no, owner_id, application_type, service_type,
         booklet_type, personal_info, present_address, permanent_address, family_details,
         documents, status, status_history, submitted_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(record.application_no.as_str())
    .bind(record.owner_id.as_uuid())
    .bind(record.application_type.as_str())
    .bind(record.service_type.as_str())
    .bind(record.booklet_type.as_str())
    .bind(Json(&record.personal_info))
    .bind(Json(&record.present_address))
    .bind(Json(&record.permanent_address))
    .bind(Json(&record.family_details))
    .bind(Json(&record.documents))
    .bind(record.status.as_str())
    .bind(Json(&record.status_history))
    .bind(record.submitted_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a status change: the new status, the full history, and the
/// update timestamp.
pub async fn update_status(
    pool: &PgPool,
    record: &ApplicationRecord,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE applications SET status = $1, status_history = $2, updated_at = $3
         WHERE application_no = $4",
    )
    .bind(record.status.as_str())
    .bind(Json(&record.status_history))
    .bind(record.updated_at)
    .bind(record.application_no.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all applications from the database into the in-memory store on
/// startup. Rows that no longer parse are skipped, not fatal.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ApplicationRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT application_no, owner_id, application_type, service_type, booklet_type,
         personal_info, present_address, permanent_address, family_details, documents,
         status, status_history, submitted_at, updated_at
         FROM applications ORDER BY submitted_at",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                // into_record() already logs which column was bad.
                tracing::error!("skipping unparseable application row during load_all");
            }
        }
    }
    Ok(records)
}

/// Row shape sqlx maps the `applications` table onto.
#[derive(sqlx::FromRow)]
struct ApplicationRow {
    application_no: String,
    owner_id: Uuid,
    application_type: String,
    service_type: String,
    booklet_type: String,
    personal_info: serde_json::Value,
    present_address: serde_json::Value,
    permanent_address: serde_json::Value,
    family_details: serde_json::Value,
    documents: serde_json::Value,
    status: String,
    status_history: serde_json::Value,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Decode one JSONB column, logging the offending column on failure.
fn decode_json<T: serde::de::DeserializeOwned>(
    application_no: &str,
    column: &'static str,
    value: serde_json::Value,
) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                application_no,
                column,
                error = %e,
                "skipping application row with invalid JSON column"
            );
            None
        }
    }
}

impl ApplicationRow {
    fn into_record(self) -> Option<ApplicationRecord> {
        let application_no = match ApplicationNumber::new(&self.application_no) {
            Ok(number) => number,
            Err(_) => {
                tracing::warn!(
                    application_no = %self.application_no,
                    "skipping application row with invalid application number"
                );
                return None;
            }
        };

        let application_type = match ApplicationType::from_name(&self.application_type) {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(
                    application_no = %self.application_no,
                    application_type = %self.application_type,
                    "skipping application row with unknown application type"
                );
                return None;
            }
        };

        let status = match ApplicationStatus::from_name(&self.status) {
            Some(status) => status,
            None => {
                tracing::warn!(
                    application_no = %self.application_no,
                    status = %self.status,
                    "skipping application row with unknown status"
                );
                return None;
            }
        };

        let number = &self.application_no;
        Some(ApplicationRecord {
            application_no,
            owner_id: UserId::from_uuid(self.owner_id),
            application_type,
            service_type: decode_json(
                number,
                "service_type",
                serde_json::Value::String(self.service_type.clone()),
            )?,
            booklet_type: decode_json(
                number,
                "booklet_type",
                serde_json::Value::String(self.booklet_type.clone()),
            )?,
            personal_info: decode_json(number, "personal_info", self.personal_info)?,
            present_address: decode_json(number, "present_address", self.present_address)?,
            permanent_address: decode_json(number, "permanent_address", self.permanent_address)?,
            family_details: decode_json(number, "family_details", self.family_details)?,
            documents: decode_json(number, "documents", self.documents)?,
            status,
            status_history: decode_json(number, "status_history", self.status_history)?,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
        })
    }
}
