//! Configuration API handlers
//!
//! GET/PUT of the partition's configuration, validation and a preview of the
//! engine request that a generation would send.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use timetable_common::PartitionKey;

use super::{json_body, PartitionPath, PARTITION_PREFIX};
use crate::db::configurations::{self, StoredConfiguration};
use crate::error::{ApiError, ApiResult};
use crate::models::{EngineRequest, RawConfiguration};
use crate::services::{assemble, validate, ValidationReport};
use crate::AppState;

/// GET .../configuration/summary response
#[derive(Debug, Serialize)]
pub struct ConfigurationSummary {
    pub partition: PartitionKey,
    pub updated_at: DateTime<Utc>,
    pub report: ValidationReport,
}

/// GET .../configuration
pub async fn get_configuration(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<StoredConfiguration>> {
    let partition = path.key()?;
    Ok(Json(configurations::load_required(&state.db, &partition).await?))
}

/// PUT .../configuration
///
/// Replaces the stored document. The document must be a JSON object that
/// fits the configuration shape; completeness is not required.
pub async fn put_configuration(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<StoredConfiguration>> {
    let partition = path.key()?;
    let document = json_body(payload)?;

    if !document.is_object() {
        return Err(ApiError::Validation(
            "Configuration must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value::<RawConfiguration>(document.clone())
        .map_err(|e| ApiError::Validation(format!("Configuration has an unexpected shape: {}", e)))?;

    let stored = configurations::upsert(&state.db, &partition, &document).await?;

    tracing::info!(partition = %partition, "Configuration saved");

    Ok(Json(stored))
}

/// GET .../configuration/summary
pub async fn configuration_summary(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<ConfigurationSummary>> {
    let partition = path.key()?;
    let stored = configurations::load_required(&state.db, &partition).await?;

    Ok(Json(ConfigurationSummary {
        partition,
        updated_at: stored.updated_at,
        report: validate(&stored.document),
    }))
}

/// POST .../configuration/validate
///
/// Checks a candidate document without storing it.
pub async fn validate_configuration(
    Path(path): Path<PartitionPath>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ValidationReport>> {
    path.key()?;
    let document = json_body(payload)?;
    Ok(Json(validate(&document)))
}

/// GET .../request
pub async fn preview_request(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<EngineRequest>> {
    let partition = path.key()?;
    let stored = configurations::load_required(&state.db, &partition).await?;
    Ok(Json(assemble(&stored.raw()?)))
}

/// Build configuration routes
pub fn configuration_routes() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/configuration", PARTITION_PREFIX),
            get(get_configuration).put(put_configuration),
        )
        .route(
            &format!("{}/configuration/summary", PARTITION_PREFIX),
            get(configuration_summary),
        )
        .route(
            &format!("{}/configuration/validate", PARTITION_PREFIX),
            post(validate_configuration),
        )
        .route(&format!("{}/request", PARTITION_PREFIX), get(preview_request))
}
