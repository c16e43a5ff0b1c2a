//! Published timetable views and partition status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timetable_common::PartitionKey;
use uuid::Uuid;

use super::timetable::{Grid, PeriodMap};

/// Published timetable for one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSectionTimetable {
    pub partition: PartitionKey,
    pub section_id: String,
    pub section_name: String,
    pub specialization: String,
    pub periods: PeriodMap,
    pub timetable: Grid,
    pub candidate_id: Uuid,
    pub published_at: DateTime<Utc>,
}

/// Published timetable for one faculty member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFacultyTimetable {
    pub partition: PartitionKey,
    pub faculty_id: String,
    pub faculty_name: String,
    pub department: String,
    pub periods: PeriodMap,
    pub timetable: Grid,
    pub candidate_id: Uuid,
    pub published_at: DateTime<Utc>,
}

/// Position of a partition in the generate → approve state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionPhase {
    NoSolutions,
    Generated,
    Approved,
}

/// Partition bookkeeping row
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionState {
    pub issued_ticket: i64,
    pub committed_ticket: i64,
    pub batch_id: Option<Uuid>,
    pub approved_candidate_id: Option<Uuid>,
    pub approval_version: i64,
}

impl PartitionState {
    pub fn phase(&self) -> PartitionPhase {
        match (self.batch_id, self.approved_candidate_id) {
            (None, _) => PartitionPhase::NoSolutions,
            (Some(_), None) => PartitionPhase::Generated,
            (Some(_), Some(_)) => PartitionPhase::Approved,
        }
    }
}

/// `GET .../status` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionStatus {
    pub partition: PartitionKey,
    pub state: PartitionPhase,
    pub batch_id: Option<Uuid>,
    pub candidate_count: i64,
    pub approved_candidate_id: Option<Uuid>,
    pub approval_version: i64,
}
