//! Generation pipeline
//!
//! Configuration → assembled request → engine → candidate batch. The batch
//! write is all-or-nothing and guarded by a generation ticket so a slow run
//! can never overwrite the batch of a newer one.

use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Instant;
use timetable_common::{PartitionKey, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{candidates, configurations, partition_state};
use crate::error::{ApiError, ApiResult};
use crate::models::{CandidateSummary, EngineSolution};
use crate::services::assembler::assemble;
use crate::services::engine_client::{order_by_rank, OptimizationEngine};
use crate::services::partition_locks::PartitionLocks;
use crate::utils::{retry_on_lock, DEFAULT_MAX_LOCK_WAIT_MS};

/// Result of a successful generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub partition: PartitionKey,
    pub batch_id: Uuid,
    pub candidates: Vec<CandidateSummary>,
}

enum CommitAttempt {
    Committed(Vec<CandidateSummary>),
    Superseded { committed_ticket: i64 },
}

/// Run one generation for a partition
///
/// Fails with `NotFound` before touching the engine when the partition has no
/// configuration. Engine failures leave the previous batch untouched.
pub async fn generate(
    pool: &SqlitePool,
    engine: &dyn OptimizationEngine,
    locks: &PartitionLocks,
    partition: &PartitionKey,
) -> ApiResult<GenerationOutcome> {
    let stored = configurations::load_required(pool, partition).await?;
    let request = assemble(&stored.raw()?);

    let ticket = retry_on_lock("issue_ticket", DEFAULT_MAX_LOCK_WAIT_MS, || {
        partition_state::issue_ticket(pool, partition)
    })
    .await?;

    info!(partition = %partition, ticket, "Starting generation");
    let started = Instant::now();

    let solutions = engine
        .generate(&request)
        .await
        .and_then(order_by_rank)
        .map_err(|e| {
            warn!(
                partition = %partition,
                ticket,
                elapsed_ms = started.elapsed().as_millis(),
                error = %e,
                "Generation failed at the engine"
            );
            ApiError::from(e)
        })?;

    let batch_id = Uuid::new_v4();
    let attempt = {
        let _guard = locks.acquire(partition).await;
        retry_on_lock("commit_batch", DEFAULT_MAX_LOCK_WAIT_MS, || {
            commit_once(pool, partition, ticket, batch_id, &solutions)
        })
        .await?
    };

    match attempt {
        CommitAttempt::Committed(candidates) => {
            info!(
                partition = %partition,
                ticket,
                batch_id = %batch_id,
                candidates = candidates.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "Candidate batch committed"
            );
            Ok(GenerationOutcome {
                partition: partition.clone(),
                batch_id,
                candidates,
            })
        }
        CommitAttempt::Superseded { committed_ticket } => {
            warn!(
                partition = %partition,
                ticket,
                committed_ticket,
                "Discarding stale generation result"
            );
            Err(ApiError::Conflict(format!(
                "Generation {} for {} was superseded by generation {}",
                ticket, partition, committed_ticket
            )))
        }
    }
}

async fn commit_once(
    pool: &SqlitePool,
    partition: &PartitionKey,
    ticket: i64,
    batch_id: Uuid,
    solutions: &[EngineSolution],
) -> Result<CommitAttempt> {
    let mut tx = pool.begin().await?;

    let state = partition_state::load(&mut *tx, partition).await?;
    if ticket <= state.committed_ticket {
        tx.rollback().await?;
        return Ok(CommitAttempt::Superseded {
            committed_ticket: state.committed_ticket,
        });
    }

    let summaries = candidates::replace_batch(&mut tx, partition, batch_id, solutions).await?;
    partition_state::commit_batch(&mut tx, partition, ticket, batch_id).await?;

    tx.commit().await?;
    Ok(CommitAttempt::Committed(summaries))
}
