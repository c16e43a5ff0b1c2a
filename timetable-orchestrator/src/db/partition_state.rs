//! Partition bookkeeping
//!
//! Generation tickets order concurrent `generate` calls: a ticket is issued
//! before the engine call and a batch may only be committed with a ticket
//! newer than the last committed one. `approval_version` increments on every
//! successful approval and backs the approval compare-and-set.

use chrono::Utc;
use sqlx::{Executor, Row, Sqlite, SqliteConnection};
use timetable_common::{Error, PartitionKey, Result};
use uuid::Uuid;

use super::parse_uuid;
use crate::models::PartitionState;

/// Current state of a partition; all-zero when it has never been touched
pub async fn load<'e, E>(executor: E, partition: &PartitionKey) -> Result<PartitionState>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT issued_ticket, committed_ticket, batch_id, approved_candidate_id, approval_version
        FROM partition_state
        WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?
        "#,
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_optional(executor)
    .await?;

    let Some(row) = row else {
        return Ok(PartitionState {
            issued_ticket: 0,
            committed_ticket: 0,
            batch_id: None,
            approved_candidate_id: None,
            approval_version: 0,
        });
    };

    let batch_id: Option<String> = row.get("batch_id");
    let approved: Option<String> = row.get("approved_candidate_id");

    Ok(PartitionState {
        issued_ticket: row.get("issued_ticket"),
        committed_ticket: row.get("committed_ticket"),
        batch_id: batch_id.as_deref().map(|s| parse_uuid(s, "batch_id")).transpose()?,
        approved_candidate_id: approved
            .as_deref()
            .map(|s| parse_uuid(s, "approved_candidate_id"))
            .transpose()?,
        approval_version: row.get("approval_version"),
    })
}

/// Draw the next generation ticket for a partition
pub async fn issue_ticket<'e, E>(executor: E, partition: &PartitionKey) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let ticket: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO partition_state (tenant_id, course, year, semester, issued_ticket, updated_at)
        VALUES (?, ?, ?, ?, 1, ?)
        ON CONFLICT(tenant_id, course, year, semester) DO UPDATE SET
            issued_ticket = partition_state.issued_ticket + 1,
            updated_at = excluded.updated_at
        RETURNING issued_ticket
        "#,
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(executor)
    .await?;

    Ok(ticket)
}

/// Record a committed batch; the partition drops back to "generated"
pub async fn commit_batch(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
    ticket: i64,
    batch_id: Uuid,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE partition_state
        SET committed_ticket = ?, batch_id = ?, approved_candidate_id = NULL, updated_at = ?
        WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?
        "#,
    )
    .bind(ticket)
    .bind(batch_id.to_string())
    .bind(Utc::now().to_rfc3339())
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Internal(format!(
            "No ticket was issued for partition {}",
            partition
        )));
    }

    Ok(())
}

/// Record an approval and return the new approval version
pub async fn record_approval(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
    candidate_id: Uuid,
) -> Result<i64> {
    let version: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE partition_state
        SET approved_candidate_id = ?, approval_version = approval_version + 1, updated_at = ?
        WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?
        RETURNING approval_version
        "#,
    )
    .bind(candidate_id.to_string())
    .bind(Utc::now().to_rfc3339())
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_optional(&mut *conn)
    .await?;

    version.ok_or_else(|| {
        Error::Internal(format!("No partition state for {} during approval", partition))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PartitionPhase;
    use timetable_common::db::init_memory_database;

    fn partition() -> PartitionKey {
        PartitionKey::new("org1", "btech", "2", "1").unwrap()
    }

    #[tokio::test]
    async fn test_untouched_partition_has_no_solutions() {
        let pool = init_memory_database().await.unwrap();
        let state = load(&pool, &partition()).await.unwrap();

        assert_eq!(state.phase(), PartitionPhase::NoSolutions);
        assert_eq!(state.issued_ticket, 0);
    }

    #[tokio::test]
    async fn test_tickets_increase_monotonically() {
        let pool = init_memory_database().await.unwrap();

        assert_eq!(issue_ticket(&pool, &partition()).await.unwrap(), 1);
        assert_eq!(issue_ticket(&pool, &partition()).await.unwrap(), 2);
        assert_eq!(issue_ticket(&pool, &partition()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_commit_then_approve_moves_phase() {
        let pool = init_memory_database().await.unwrap();
        let ticket = issue_ticket(&pool, &partition()).await.unwrap();
        let batch_id = Uuid::new_v4();
        let candidate_id = Uuid::new_v4();

        let mut conn = pool.acquire().await.unwrap();
        commit_batch(&mut conn, &partition(), ticket, batch_id).await.unwrap();
        let state = load(&mut *conn, &partition()).await.unwrap();
        assert_eq!(state.phase(), PartitionPhase::Generated);
        assert_eq!(state.committed_ticket, ticket);

        let version = record_approval(&mut conn, &partition(), candidate_id).await.unwrap();
        assert_eq!(version, 1);
        let state = load(&mut *conn, &partition()).await.unwrap();
        assert_eq!(state.phase(), PartitionPhase::Approved);
        assert_eq!(state.approved_candidate_id, Some(candidate_id));

        // A new batch clears the approval but keeps the version counter
        let ticket = issue_ticket(&mut *conn, &partition()).await.unwrap();
        commit_batch(&mut conn, &partition(), ticket, Uuid::new_v4()).await.unwrap();
        let state = load(&mut *conn, &partition()).await.unwrap();
        assert_eq!(state.phase(), PartitionPhase::Generated);
        assert_eq!(state.approval_version, 1);
    }
}
