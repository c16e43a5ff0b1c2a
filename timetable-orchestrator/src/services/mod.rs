//! Services for timetable-orchestrator

pub mod assembler;
pub mod engine_client;
pub mod generation;
pub mod partition_locks;
pub mod promotion;
pub mod validation;

pub use assembler::assemble;
pub use engine_client::{EngineError, HttpEngine, OptimizationEngine};
pub use generation::{generate, GenerationOutcome};
pub use partition_locks::PartitionLocks;
pub use promotion::{approve, ApprovalOutcome};
pub use validation::{validate, ValidationReport};
