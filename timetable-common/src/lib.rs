//! # Timetable Common Library
//!
//! Shared code for the timetable orchestration services:
//! - Partition key normalization
//! - Error types
//! - Configuration loading and root folder resolution
//! - Database initialization and schema

pub mod config;
pub mod db;
pub mod error;
pub mod partition;

pub use error::{Error, Result};
pub use partition::PartitionKey;
