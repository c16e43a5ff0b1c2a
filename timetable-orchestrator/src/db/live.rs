//! Live timetable views
//!
//! Per-section and per-faculty documents published from the approved
//! candidate. Only the promotion service writes here, which is why the write
//! functions are crate-private.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqliteConnection, SqlitePool};
use timetable_common::{PartitionKey, Result};
use uuid::Uuid;

use super::{parse_json, parse_timestamp, parse_uuid, partition_from_row};
use crate::models::{
    FacultyTimetable, LiveFacultyTimetable, LiveSectionTimetable, SectionTimetable,
};

/// Remove every published document of a partition; returns rows removed
pub(crate) async fn delete_for_partition(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
) -> Result<u64> {
    let mut removed = 0;

    for table in ["live_section_timetables", "live_faculty_timetables"] {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?",
            table
        ))
        .bind(&partition.tenant_id)
        .bind(&partition.course)
        .bind(&partition.year)
        .bind(&partition.semester)
        .execute(&mut *conn)
        .await?;
        removed += result.rows_affected();
    }

    Ok(removed)
}

pub(crate) async fn upsert_section(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
    section: &SectionTimetable,
    candidate_id: Uuid,
    published_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO live_section_timetables (
            tenant_id, course, year, semester, section_id, section_name, specialization,
            periods, timetable, candidate_id, published_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(tenant_id, course, year, semester, section_id) DO UPDATE SET
            section_name = excluded.section_name,
            specialization = excluded.specialization,
            periods = excluded.periods,
            timetable = excluded.timetable,
            candidate_id = excluded.candidate_id,
            published_at = excluded.published_at
        "#,
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(&section.section_id)
    .bind(&section.section_name)
    .bind(&section.specialization)
    .bind(serde_json::to_string(&section.periods)?)
    .bind(serde_json::to_string(&section.timetable)?)
    .bind(candidate_id.to_string())
    .bind(published_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn upsert_faculty(
    conn: &mut SqliteConnection,
    partition: &PartitionKey,
    faculty: &FacultyTimetable,
    candidate_id: Uuid,
    published_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO live_faculty_timetables (
            tenant_id, course, year, semester, faculty_id, faculty_name, department,
            periods, timetable, candidate_id, published_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(tenant_id, course, year, semester, faculty_id) DO UPDATE SET
            faculty_name = excluded.faculty_name,
            department = excluded.department,
            periods = excluded.periods,
            timetable = excluded.timetable,
            candidate_id = excluded.candidate_id,
            published_at = excluded.published_at
        "#,
    )
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(&faculty.faculty_id)
    .bind(&faculty.faculty_name)
    .bind(&faculty.department)
    .bind(serde_json::to_string(&faculty.periods)?)
    .bind(serde_json::to_string(&faculty.timetable)?)
    .bind(candidate_id.to_string())
    .bind(published_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Publication time of a partition's live documents, if all of them come
/// from `candidate_id`
pub(crate) async fn published_at<'e, E>(
    executor: E,
    partition: &PartitionKey,
    candidate_id: Uuid,
) -> Result<Option<DateTime<Utc>>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(Option<String>, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT MAX(published_at), SUM(candidate_id != ?)
        FROM (
            SELECT published_at, candidate_id FROM live_section_timetables
            WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?
            UNION ALL
            SELECT published_at, candidate_id FROM live_faculty_timetables
            WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ?
        )
        HAVING COUNT(*) > 0
        "#,
    )
    .bind(candidate_id.to_string())
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_optional(executor)
    .await?;

    match row {
        Some((Some(published_at), Some(0))) => Ok(Some(parse_timestamp(&published_at, "published_at")?)),
        _ => Ok(None),
    }
}

const SECTION_COLUMNS: &str = "tenant_id, course, year, semester, section_id, section_name, \
     specialization, periods, timetable, candidate_id, published_at";

const FACULTY_COLUMNS: &str = "tenant_id, course, year, semester, faculty_id, faculty_name, \
     department, periods, timetable, candidate_id, published_at";

/// Published section documents of a partition, ordered by section id
pub async fn list_sections(
    pool: &SqlitePool,
    partition: &PartitionKey,
) -> Result<Vec<LiveSectionTimetable>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM live_section_timetables \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? \
         ORDER BY section_id",
        SECTION_COLUMNS
    ))
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_all(pool)
    .await?;

    rows.iter().map(section_from_row).collect()
}

pub async fn get_section(
    pool: &SqlitePool,
    partition: &PartitionKey,
    section_id: &str,
) -> Result<Option<LiveSectionTimetable>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM live_section_timetables \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? AND section_id = ?",
        SECTION_COLUMNS
    ))
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(section_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(section_from_row).transpose()
}

/// Published faculty documents of a partition, ordered by faculty id
pub async fn list_faculty(
    pool: &SqlitePool,
    partition: &PartitionKey,
) -> Result<Vec<LiveFacultyTimetable>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM live_faculty_timetables \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? \
         ORDER BY faculty_id",
        FACULTY_COLUMNS
    ))
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .fetch_all(pool)
    .await?;

    rows.iter().map(faculty_from_row).collect()
}

pub async fn get_faculty(
    pool: &SqlitePool,
    partition: &PartitionKey,
    faculty_id: &str,
) -> Result<Option<LiveFacultyTimetable>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM live_faculty_timetables \
         WHERE tenant_id = ? AND course = ? AND year = ? AND semester = ? AND faculty_id = ?",
        FACULTY_COLUMNS
    ))
    .bind(&partition.tenant_id)
    .bind(&partition.course)
    .bind(&partition.year)
    .bind(&partition.semester)
    .bind(faculty_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(faculty_from_row).transpose()
}

/// Every published section document of a tenant
pub async fn list_sections_for_tenant(
    pool: &SqlitePool,
    tenant_id: &str,
) -> Result<Vec<LiveSectionTimetable>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM live_section_timetables WHERE tenant_id = ? \
         ORDER BY course, year, semester, section_id",
        SECTION_COLUMNS
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(section_from_row).collect()
}

/// Every published faculty document of a tenant
pub async fn list_faculty_for_tenant(
    pool: &SqlitePool,
    tenant_id: &str,
) -> Result<Vec<LiveFacultyTimetable>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM live_faculty_timetables WHERE tenant_id = ? \
         ORDER BY course, year, semester, faculty_id",
        FACULTY_COLUMNS
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(faculty_from_row).collect()
}

fn section_from_row(row: &SqliteRow) -> Result<LiveSectionTimetable> {
    let periods: String = row.get("periods");
    let timetable: String = row.get("timetable");
    let candidate_id: String = row.get("candidate_id");
    let published_at: String = row.get("published_at");

    Ok(LiveSectionTimetable {
        partition: partition_from_row(row),
        section_id: row.get("section_id"),
        section_name: row.get("section_name"),
        specialization: row.get("specialization"),
        periods: parse_json(&periods, "periods")?,
        timetable: parse_json(&timetable, "timetable")?,
        candidate_id: parse_uuid(&candidate_id, "candidate_id")?,
        published_at: parse_timestamp(&published_at, "published_at")?,
    })
}

fn faculty_from_row(row: &SqliteRow) -> Result<LiveFacultyTimetable> {
    let periods: String = row.get("periods");
    let timetable: String = row.get("timetable");
    let candidate_id: String = row.get("candidate_id");
    let published_at: String = row.get("published_at");

    Ok(LiveFacultyTimetable {
        partition: partition_from_row(row),
        faculty_id: row.get("faculty_id"),
        faculty_name: row.get("faculty_name"),
        department: row.get("department"),
        periods: parse_json(&periods, "periods")?,
        timetable: parse_json(&timetable, "timetable")?,
        candidate_id: parse_uuid(&candidate_id, "candidate_id")?,
        published_at: parse_timestamp(&published_at, "published_at")?,
    })
}
