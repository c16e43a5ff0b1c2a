//! timetable-orchestrator library interface
//!
//! Exposes the router and services for the binary and for integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{OptimizationEngine, PartitionLocks};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Optimization engine gateway
    pub engine: Arc<dyn OptimizationEngine>,
    /// Per-partition write serialization
    pub locks: PartitionLocks,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, engine: Arc<dyn OptimizationEngine>) -> Self {
        Self {
            db,
            engine,
            locks: PartitionLocks::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::configuration_routes())
        .merge(api::generation_routes())
        .merge(api::candidate_routes())
        .merge(api::live_routes())
        .merge(api::master_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
