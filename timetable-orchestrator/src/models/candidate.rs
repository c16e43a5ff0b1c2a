//! Candidate solutions produced by one generation run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use timetable_common::PartitionKey;
use uuid::Uuid;

use super::timetable::{FacultyTimetable, SectionTimetable};

/// One validated solution from the engine, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSolution {
    pub rank: i64,
    pub fitness: Option<f64>,
    pub constraint_violations: Value,
    pub sections: BTreeMap<String, SectionTimetable>,
    pub faculty: BTreeMap<String, FacultyTimetable>,
    pub statistics: Value,
}

/// Candidate without the heavy timetable payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub candidate_id: Uuid,
    pub batch_id: Uuid,
    pub partition: PartitionKey,
    pub rank: i64,
    pub fitness: Option<f64>,
    pub constraint_violations: Value,
    pub statistics: Value,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Candidate including its section and faculty timetables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub summary: CandidateSummary,
    pub sections: BTreeMap<String, SectionTimetable>,
    pub faculty: BTreeMap<String, FacultyTimetable>,
}
