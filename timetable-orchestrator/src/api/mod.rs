//! HTTP API handlers for timetable-orchestrator
//!
//! Partition-scoped routes live under
//! `/api/partitions/:tenant/:course/:year/:semester`; tenant-wide reads under
//! `/api/tenants/:tenant`.

pub mod candidates;
pub mod configuration;
pub mod generation;
pub mod health;
pub mod live;
pub mod master;

pub use candidates::candidate_routes;
pub use configuration::configuration_routes;
pub use generation::generation_routes;
pub use health::health_routes;
pub use live::live_routes;
pub use master::master_routes;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;
use timetable_common::PartitionKey;

use crate::error::{ApiError, ApiResult};

/// Path prefix shared by every partition-scoped route
pub const PARTITION_PREFIX: &str = "/api/partitions/:tenant/:course/:year/:semester";

/// Raw partition components from the URL
#[derive(Debug, Deserialize)]
pub struct PartitionPath {
    pub tenant: String,
    pub course: String,
    pub year: String,
    pub semester: String,
}

impl PartitionPath {
    pub fn key(&self) -> ApiResult<PartitionKey> {
        Ok(PartitionKey::new(
            &self.tenant,
            &self.course,
            &self.year,
            &self.semester,
        )?)
    }
}

/// Unwrap a JSON body, reporting malformed input as a validation error
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}
