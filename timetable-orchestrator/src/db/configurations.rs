//! Configuration store
//!
//! One document per partition. Writes replace, never append.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use timetable_common::{Error, PartitionKey, Result};

use super::{parse_json, parse_timestamp, partition_from_row};
use crate::models::RawConfiguration;

/// Stored configuration document exactly as submitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredConfiguration {
    pub partition: PartitionKey,
    pub document: Value,
    pub updated_at: DateTime<Utc>,
}

impl StoredConfiguration {
    /// Typed view of the document
    pub fn raw(&self) -> Result<RawConfiguration> {
        serde_json::from_value(self.document.clone()).map_err(|e| {
            Error::Internal(format!(
                "Stored configuration for {} is unreadable: {}",
                self.partition, e
            ))
        })
    }
}

/// Replace the configuration for a partition
pub async fn upsert(
    pool: &SqlitePool,
    partition: &PartitionKey,
    document: &Value,
) -> Result<StoredConfiguration> {
    let updated_at = Utc::now();
    let document_text = serde_json::to_string(document)?;

    sqlx::query(
        r#"
        INSERT INTO configurations (tenant_id, course, year, semester, document, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(tenant_id, course, year, semester) DO UPDATE SET
            document = excluded.document,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(&document_text)
    .bind(updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(StoredConfiguration {
        partition: partition.clone(),
        document: document.clone(),
        updated_at,
    })
}

/// Load the configuration for a partition, if one exists
pub async fn load(pool: &SqlitePool, partition: &PartitionKey) -> Result<Option<StoredConfiguration>> {
    let row = sqlx::query(
        r#"
        SELECT tenant_id, course, year, semester, document, updated_at
        FROM configurations
        WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?
        "#,
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let document: String = row.get("document");
            let updated_at: String = row.get("updated_at");
            Ok(Some(StoredConfiguration {
                partition: partition_from_row(&row),
                document: parse_json(&document, "document")?,
                updated_at: parse_timestamp(&updated_at, "updated_at")?,
            }))
        }
        None => Ok(None),
    }
}

/// Load the configuration or fail with `NotFound`
pub async fn load_required(pool: &SqlitePool, partition: &PartitionKey) -> Result<StoredConfiguration> {
    load(pool, partition)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No configuration for partition {}", partition)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use timetable_common::db::init_memory_database;

    fn partition() -> PartitionKey {
        PartitionKey::new("org1", "btech", "2", "1").unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces_document() {
        let pool = init_memory_database().await.unwrap();

        upsert(&pool, &partition(), &json!({"college_info": {"name": "Old"}}))
            .await
            .unwrap();
        upsert(&pool, &partition(), &json!({"college_info": {"name": "New"}}))
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM configurations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let stored = load(&pool, &partition()).await.unwrap().unwrap();
        assert_eq!(stored.document["college_info"]["name"], json!("New"));
        assert_eq!(stored.raw().unwrap().college_info.unwrap().name.as_deref(), Some("New"));
    }

    #[tokio::test]
    async fn test_missing_configuration_is_not_found() {
        let pool = init_memory_database().await.unwrap();

        assert!(load(&pool, &partition()).await.unwrap().is_none());
        assert!(matches!(
            load_required(&pool, &partition()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_partitions_are_isolated() {
        let pool = init_memory_database().await.unwrap();
        let other = PartitionKey::new("org1", "btech", "2", "2").unwrap();

        upsert(&pool, &partition(), &json!({})).await.unwrap();
        assert!(load(&pool, &other).await.unwrap().is_none());
    }
}
