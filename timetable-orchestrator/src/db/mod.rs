//! Database access for timetable-orchestrator
//!
//! Single-statement reads are generic over the executor so they run against
//! the pool or inside an open transaction. Multi-statement writes take a
//! `&mut SqliteConnection` and expect the caller to own the transaction.

pub mod candidates;
pub mod configurations;
pub mod live;
pub mod partition_state;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::{sqlite::SqliteRow, Row};
use timetable_common::{Error, PartitionKey, Result};
use uuid::Uuid;

pub(crate) fn partition_from_row(row: &SqliteRow) -> PartitionKey {
    PartitionKey {
        tenant_id: row.get("tenant_id"),
        course: row.get("course"),
        year: row.get("year"),
        semester: row.get("semester"),
    }
}

pub(crate) fn parse_uuid(raw: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

pub(crate) fn parse_json<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", column, e)))
}
