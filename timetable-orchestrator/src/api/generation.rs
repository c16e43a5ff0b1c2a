//! Generation API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use super::{PartitionPath, PARTITION_PREFIX};
use crate::db::{candidates, partition_state};
use crate::error::ApiResult;
use crate::models::PartitionStatus;
use crate::services::{generate, GenerationOutcome};
use crate::AppState;

/// POST .../generate
///
/// Blocks until the engine answers. Every candidate in the response is
/// unapproved; any previous batch for the partition is gone.
pub async fn start_generation(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<GenerationOutcome>> {
    let partition = path.key()?;
    let outcome = generate(&state.db, state.engine.as_ref(), &state.locks, &partition).await?;
    Ok(Json(outcome))
}

/// GET .../status
pub async fn partition_status(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<PartitionStatus>> {
    let partition = path.key()?;
    let current = partition_state::load(&state.db, &partition).await?;
    let candidate_count = candidates::count(&state.db, &partition).await?;

    Ok(Json(PartitionStatus {
        state: current.phase(),
        batch_id: current.batch_id,
        candidate_count,
        approved_candidate_id: current.approved_candidate_id,
        approval_version: current.approval_version,
        partition,
    }))
}

/// Build generation routes
pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route(&format!("{}/generate", PARTITION_PREFIX), post(start_generation))
        .route(&format!("{}/status", PARTITION_PREFIX), get(partition_status))
}
