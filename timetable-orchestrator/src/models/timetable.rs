//! Timetable grids shared by candidates and live views
//!
//! A grid maps working day → period id → slot. A slot is either a marker
//! (`"FREE"`, `"BREAK"`, `"LUNCH BREAK"`, `"MENTORSHIP"`, ...) or a class
//! assignment. Period ids are JSON object keys, hence strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Period id → display time, e.g. `"1" → "09:00-09:55"`
pub type PeriodMap = BTreeMap<String, String>;

/// Day → period id → slot
pub type Grid = BTreeMap<String, BTreeMap<String, Slot>>;

/// One cell of a timetable grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    Class(ClassSlot),
    Marker(String),
}

/// A scheduled class
///
/// Section grids name the faculty, faculty grids name the section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSlot {
    pub subject: String,
    #[serde(default)]
    pub room: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// Per-section timetable as produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTimetable {
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub periods: PeriodMap,
    pub timetable: Grid,
}

/// Per-faculty timetable as produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyTimetable {
    #[serde(default)]
    pub faculty_id: String,
    #[serde(default)]
    pub faculty_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub periods: PeriodMap,
    pub timetable: Grid,
}
