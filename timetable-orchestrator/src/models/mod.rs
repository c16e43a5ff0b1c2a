//! Data models for timetable-orchestrator

pub mod candidate;
pub mod configuration;
pub mod engine_request;
pub mod live;
pub mod timetable;

pub use candidate::{Candidate, CandidateSummary, EngineSolution};
pub use configuration::RawConfiguration;
pub use engine_request::EngineRequest;
pub use live::{
    LiveFacultyTimetable, LiveSectionTimetable, PartitionPhase, PartitionState, PartitionStatus,
};
pub use timetable::{ClassSlot, FacultyTimetable, Grid, PeriodMap, SectionTimetable, Slot};
