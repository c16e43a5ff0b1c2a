//! Candidate store
//!
//! Holds exactly one batch per partition. `(partition, rank)` is unique and
//! at most one row per partition has `is_approved = 1`; both are enforced by
//! the schema as well as by the writers here.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqliteConnection, SqlitePool};
use timetable_common::{PartitionKey, Result};
use uuid::Uuid;

use super::{parse_json, parse_timestamp, parse_uuid, partition_from_row};
use crate::models::{Candidate, CandidateSummary, EngineSolution};

const SUMMARY_COLUMNS: &str = "candidate_id, batch_id, tenant_id, course, year, semester, rank, \
     fitness, constraint_violations, statistics, is_approved, created_at";

/// Replace the partition's batch with freshly generated solutions
///
/// Must run inside the caller's transaction so the old batch never
/// disappears without the new one appearing.
pub async fn replace_batch(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
    batch_id: Uuid,
    solutions: &[EngineSolution],
) -> Result<Vec<CandidateSummary>> {
    let removed = delete_for_partition(&mut *conn, partition).await?;
    if removed > 0 {
        tracing::debug!(partition = %partition, removed, "Discarded previous candidate batch");
    }

    let created_at = Utc::now();
    let mut summaries = Vec::with_capacity(solutions.len());

    for solution in solutions {
        let candidate_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO candidates (
                candidate_id, tenant_id, course, year, semester, batch_id, rank, fitness,
                constraint_violations, sections, faculty, statistics, is_approved, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(candidate_id.to_string())
        .bind(&partition.tenant_id)
        .bind(&partition.course)
        .bind(&partition.year)
        .bind(&partition.semester)
        .bind(batch_id.to_string())
        .bind(solution.rank)
        .bind(solution.fitness)
        .bind(serde_json::to_string(&solution.constraint_violations)?)
        .bind(serde_json::to_string(&solution.sections)?)
        .bind(serde_json::to_string(&solution.faculty)?)
        .bind(serde_json::to_string(&solution.statistics)?)
        .bind(created_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;

        summaries.push(CandidateSummary {
            candidate_id,
            batch_id,
            partition: partition.clone(),
            rank: solution.rank,
            fitness: solution.fitness,
            constraint_violations: solution.constraint_violations.clone(),
            statistics: solution.statistics.clone(),
            is_approved: false,
            created_at,
        });
    }

    Ok(summaries)
}

/// Remove every candidate of a partition
pub async fn delete_for_partition<'e, E>(executor: E, partition: &PartitionKey) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM candidates WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?",
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Candidates of a partition ordered by rank, without timetables
pub async fn list_summaries<'e, E>(
    executor: E,
    partition: &PartitionKey,
) -> Result<Vec<CandidateSummary>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(&format!(
        "SELECT {} FROM candidates \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? \
         ORDER BY rank",
        SUMMARY_COLUMNS
    ))
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_all(executor)
    .await?;

    rows.iter().map(summary_from_row).collect()
}

/// Candidates of every partition of a tenant, ordered by partition then rank
pub async fn list_summaries_for_tenant(
    pool: &SqlitePool,
    tenant_id: &str,
) -> Result<Vec<CandidateSummary>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM candidates WHERE tenant_id = ? \
         ORDER BY course, year, semester, rank",
        SUMMARY_COLUMNS
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(summary_from_row).collect()
}

/// Full candidate, scoped to its partition
pub async fn load<'e, E>(
    executor: E,
    partition: &PartitionKey,
    candidate_id: Uuid,
) -> Result<Option<Candidate>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        "SELECT {}, sections, faculty FROM candidates \
         WHERE candidate_id = ? AND tenant_id = ? AND course = ? AND year = ? AND semester = ?",
        SUMMARY_COLUMNS
    ))
    .bind(candidate_id.to_string())
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_optional(executor)
    .await?;

    match row {
        Some(row) => {
            let sections: String = row.get("sections");
            let faculty: String = row.get("faculty");
            Ok(Some(Candidate {
                summary: summary_from_row(&row)?,
                sections: parse_json(&sections, "sections")?,
                faculty: parse_json(&faculty, "faculty")?,
            }))
        }
        None => Ok(None),
    }
}

/// Number of candidates in the partition's current batch
pub async fn count<'e, E>(executor: E, partition: &PartitionKey) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM candidates \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?",
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Flip the approval flag to exactly one candidate of the partition
///
/// Clears every sibling first so the single-approved index is never violated
/// mid-statement. Returns the previously approved candidate, if any.
pub async fn set_approved(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
    candidate_id: Uuid,
) -> Result<Option<Uuid>> {
    let previous: Option<String> = sqlx::query_scalar(
        "SELECT candidate_id FROM candidates \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? AND is_approved = 1",
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_optional(&mut *conn)
    .await?;

    sqlx::query(
        "UPDATE candidates SET is_approved = 0 \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? AND is_approved = 1",
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "UPDATE candidates SET is_approved = 1 \
         WHERE candidate_id = ? AND tenant_id = ? AND course = ? AND year = ? AND semester = ?",
    )
    .bind(candidate_id.to_string())
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .execute(&mut *conn)
    .await?;

    previous
        .as_deref()
        .map(|s| parse_uuid(s, "candidate_id"))
        .transpose()
}

fn summary_from_row(row: &SqliteRow) -> Result<CandidateSummary> {
    let candidate_id: String = row.get("candidate_id");
    let batch_id: String = row.get("batch_id");
    let constraint_violations: String = row.get("constraint_violations");
    let statistics: String = row.get("statistics");
    let created_at: String = row.get("created_at");

    Ok(CandidateSummary {
        candidate_id: parse_uuid(&candidate_id, "candidate_id")?,
        batch_id: parse_uuid(&batch_id, "batch_id")?,
        partition: partition_from_row(row),
        rank: row.get("rank"),
        fitness: row.get("fitness"),
        constraint_violations: parse_json(&constraint_violations, "constraint_violations")?,
        statistics: parse_json(&statistics, "statistics")?,
        is_approved: row.get::<i64, _>("is_approved") != 0,
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}
