//! Candidate review and approval handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use timetable_common::{partition::normalize_tenant, PartitionKey};
use uuid::Uuid;

use super::{json_body, PartitionPath, PARTITION_PREFIX};
use crate::db::{candidates, partition_state};
use crate::error::{ApiError, ApiResult};
use crate::models::{Candidate, CandidateSummary};
use crate::services::{approve, ApprovalOutcome};
use crate::AppState;

/// GET .../candidates response
#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub partition: PartitionKey,
    pub batch_id: Uuid,
    pub candidates: Vec<CandidateSummary>,
}

/// GET /api/tenants/:tenant/candidates response
#[derive(Debug, Serialize)]
pub struct TenantCandidatesResponse {
    pub tenant_id: String,
    pub total: usize,
    pub candidates: Vec<CandidateSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePath {
    pub tenant: String,
    pub course: String,
    pub year: String,
    pub semester: String,
    pub candidate_id: String,
}

/// POST .../approve request
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub candidate_id: Uuid,
    /// Approval version the caller last observed
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// GET .../candidates
pub async fn list_candidates(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<CandidateListResponse>> {
    let partition = path.key()?;
    let current = partition_state::load(&state.db, &partition).await?;
    let batch_id = current
        .batch_id
        .ok_or_else(|| ApiError::NotFound(format!("No candidates generated for {}", partition)))?;
    let candidates = candidates::list_summaries(&state.db, &partition).await?;

    Ok(Json(CandidateListResponse {
        partition,
        batch_id,
        candidates,
    }))
}

/// GET .../candidates/:candidate_id
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(path): Path<CandidatePath>,
) -> ApiResult<Json<Candidate>> {
    let partition = PartitionKey::new(&path.tenant, &path.course, &path.year, &path.semester)?;
    let not_found = || ApiError::NotFound(format!("Candidate {}", path.candidate_id));

    // A malformed id cannot name any candidate
    let candidate_id = Uuid::parse_str(&path.candidate_id).map_err(|_| not_found())?;

    candidates::load(&state.db, &partition, candidate_id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// POST .../approve
pub async fn approve_candidate(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> ApiResult<Json<ApprovalOutcome>> {
    let partition = path.key()?;
    let request = json_body(payload)?;

    let outcome = approve(
        &state.db,
        &state.locks,
        &partition,
        request.candidate_id,
        request.expected_version,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/tenants/:tenant/candidates
pub async fn list_tenant_candidates(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Json<TenantCandidatesResponse>> {
    let tenant_id = normalize_tenant(&tenant)?;
    let candidates = candidates::list_summaries_for_tenant(&state.db, &tenant_id).await?;

    Ok(Json(TenantCandidatesResponse {
        tenant_id,
        total: candidates.len(),
        candidates,
    }))
}

/// Build candidate routes
pub fn candidate_routes() -> Router<AppState> {
    Router::new()
        .route(&format!("{}/candidates", PARTITION_PREFIX), get(list_candidates))
        .route(
            &format!("{}/candidates/:candidate_id", PARTITION_PREFIX),
            get(get_candidate),
        )
        .route(&format!("{}/approve", PARTITION_PREFIX), post(approve_candidate))
        .route("/api/tenants/:tenant/candidates", get(list_tenant_candidates))
}
