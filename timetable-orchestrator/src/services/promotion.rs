//! Promotion engine
//!
//! Approving a candidate makes the partition's live views an exact mirror of
//! that candidate: the approval flag moves, every previously published
//! document of the partition is removed, and one document per section and
//! per faculty member is written. All of it happens in one transaction under
//! the partition lock; on any failure the partition keeps its previous state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use timetable_common::{PartitionKey, Result};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::{candidates, live, partition_state};
use crate::error::{ApiError, ApiResult};
use crate::services::partition_locks::PartitionLocks;
use crate::utils::{retry_on_lock, DEFAULT_MAX_LOCK_WAIT_MS};

/// Result of a successful approval
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub partition: PartitionKey,
    pub candidate_id: Uuid,
    pub rank: i64,
    pub approval_version: i64,
    /// Candidate of the same batch that was approved before this call
    pub superseded_candidate_id: Option<Uuid>,
    pub sections_published: usize,
    pub faculty_published: usize,
    pub published_at: DateTime<Utc>,
}

enum ApprovalAttempt {
    Applied(ApprovalOutcome),
    UnknownCandidate,
    VersionMismatch { current: i64 },
}

/// Approve a candidate of the partition's current batch
///
/// `expected_version`, when given, must equal the partition's current
/// approval version or the call fails with `Conflict` and changes nothing.
pub async fn approve(
    pool: &SqlitePool,
    locks: &PartitionLocks,
    partition: &PartitionKey,
    candidate_id: Uuid,
    expected_version: Option<i64>,
) -> ApiResult<ApprovalOutcome> {
    let _guard = locks.acquire(partition).await;

    let attempt = retry_on_lock("approve", DEFAULT_MAX_LOCK_WAIT_MS, || {
        approve_once(pool, partition, candidate_id, expected_version)
    })
    .await
    .map_err(|e| {
        error!(
            partition = %partition,
            candidate_id = %candidate_id,
            error = %e,
            "Live view reconciliation rolled back"
        );
        ApiError::ReconciliationFailure(e.to_string())
    })?;

    match attempt {
        ApprovalAttempt::Applied(outcome) => {
            info!(
                partition = %partition,
                candidate_id = %candidate_id,
                rank = outcome.rank,
                approval_version = outcome.approval_version,
                sections = outcome.sections_published,
                faculty = outcome.faculty_published,
                "Candidate approved and published"
            );
            Ok(outcome)
        }
        ApprovalAttempt::UnknownCandidate => Err(ApiError::NotFound(format!(
            "Candidate {} is not in the current batch of {}",
            candidate_id, partition
        ))),
        ApprovalAttempt::VersionMismatch { current } => Err(ApiError::Conflict(format!(
            "Approval version is {}, expected {}",
            current,
            expected_version.unwrap_or_default()
        ))),
    }
}

async fn approve_once(
    pool: &SqlitePool,
    partition: &PartitionKey,
    candidate_id: Uuid,
    expected_version: Option<i64>,
) -> Result<ApprovalAttempt> {
    let mut tx = pool.begin().await?;

    let state = partition_state::load(&mut *tx, partition).await?;
    if let Some(expected) = expected_version {
        if expected != state.approval_version {
            return Ok(ApprovalAttempt::VersionMismatch {
                current: state.approval_version,
            });
        }
    }

    let candidate = match candidates::load(&mut *tx, partition, candidate_id).await? {
        Some(candidate) if state.batch_id == Some(candidate.summary.batch_id) => candidate,
        _ => return Ok(ApprovalAttempt::UnknownCandidate),
    };

    // Already live: the published documents are this candidate's, leave them be
    if state.approved_candidate_id == Some(candidate_id) {
        if let Some(published_at) = live::published_at(&mut *tx, partition, candidate_id).await? {
            tx.rollback().await?;
            return Ok(ApprovalAttempt::Applied(ApprovalOutcome {
                partition: partition.clone(),
                candidate_id,
                rank: candidate.summary.rank,
                approval_version: state.approval_version,
                superseded_candidate_id: None,
                sections_published: candidate.sections.len(),
                faculty_published: candidate.faculty.len(),
                published_at,
            }));
        }
    }

    let previous = candidates::set_approved(&mut tx, partition, candidate_id).await?;
    let removed = live::delete_for_partition(&mut tx, partition).await?;

    let published_at = Utc::now();
    for section in candidate.sections.values() {
        live::upsert_section(&mut tx, partition, section, candidate_id, published_at).await?;
    }
    for faculty in candidate.faculty.values() {
        live::upsert_faculty(&mut tx, partition, faculty, candidate_id, published_at).await?;
    }

    let approval_version = partition_state::record_approval(&mut tx, partition, candidate_id).await?;
    tx.commit().await?;

    tracing::debug!(partition = %partition, removed, "Replaced live documents");

    Ok(ApprovalAttempt::Applied(ApprovalOutcome {
        partition: partition.clone(),
        candidate_id,
        rank: candidate.summary.rank,
        approval_version,
        superseded_candidate_id: previous.filter(|id| *id != candidate_id),
        sections_published: candidate.sections.len(),
        faculty_published: candidate.faculty.len(),
        published_at,
    }))
}
