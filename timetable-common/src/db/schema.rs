//! Table definitions
//!
//! Every table carries the four partition columns
//! `(tenant_id, course, year, semester)`, stored already normalized.

use crate::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Create every table and index used by the orchestrator
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_configurations_table(pool).await?;
    create_partition_state_table(pool).await?;
    create_candidates_table(pool).await?;
    create_live_section_table(pool).await?;
    create_live_faculty_table(pool).await?;

    debug!("Database schema ready");
    Ok(())
}

/// One configuration document per partition (upsert semantics)
pub async fn create_configurations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS configurations (
            tenant_id TEXT NOT NULL,
            course TEXT NOT NULL,
            year TEXT NOT NULL,
            semester TEXT NOT NULL,
            document TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (tenant_id, course, year, semester)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-partition bookkeeping: generation tickets, current batch, approval
pub async fn create_partition_state_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS partition_state (
            tenant_id TEXT NOT NULL,
            course TEXT NOT NULL,
            year TEXT NOT NULL,
            semester TEXT NOT NULL,
            issued_ticket INTEGER NOT NULL DEFAULT 0,
            committed_ticket INTEGER NOT NULL DEFAULT 0,
            batch_id TEXT,
            approved_candidate_id TEXT,
            approval_version INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (tenant_id, course, year, semester)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ranked candidate solutions; one batch per partition
pub async fn create_candidates_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidates (
            candidate_id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            course TEXT NOT NULL,
            year TEXT NOT NULL,
            semester TEXT NOT NULL,
            batch_id TEXT NOT NULL,
            rank INTEGER NOT NULL,
            fitness REAL,
            constraint_violations TEXT NOT NULL DEFAULT '{}',
            sections TEXT NOT NULL,
            faculty TEXT NOT NULL,
            statistics TEXT NOT NULL DEFAULT '{}',
            is_approved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            UNIQUE (tenant_id, course, year, semester, rank)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // At most one approved candidate per partition
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_candidates_single_approved
        ON candidates (tenant_id, course, year, semester)
        WHERE is_approved = 1
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Published per-section timetables
pub async fn create_live_section_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS live_section_timetables (
            tenant_id TEXT NOT NULL,
            course TEXT NOT NULL,
            year TEXT NOT NULL,
            semester TEXT NOT NULL,
            section_id TEXT NOT NULL,
            section_name TEXT NOT NULL,
            specialization TEXT NOT NULL DEFAULT '',
            periods TEXT NOT NULL,
            timetable TEXT NOT NULL,
            candidate_id TEXT NOT NULL,
            published_at TEXT NOT NULL,
            PRIMARY KEY (tenant_id, course, year, semester, section_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Published per-faculty timetables
pub async fn create_live_faculty_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS live_faculty_timetables (
            tenant_id TEXT NOT NULL,
            course TEXT NOT NULL,
            year TEXT NOT NULL,
            semester TEXT NOT NULL,
            faculty_id TEXT NOT NULL,
            faculty_name TEXT NOT NULL,
            department TEXT NOT NULL DEFAULT '',
            periods TEXT NOT NULL,
            timetable TEXT NOT NULL,
            candidate_id TEXT NOT NULL,
            published_at TEXT NOT NULL,
            PRIMARY KEY (tenant_id, course, year, semester, faculty_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
