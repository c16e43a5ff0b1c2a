//! Configuration checks
//!
//! Reports what an admin should fix before generating: missing required
//! blocks, duplicate ids (live views are keyed by section and faculty id) and
//! documents that do not fit the configuration shape at all. Never fails.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::models::RawConfiguration;

/// Top-level blocks a configuration needs before generation makes sense
pub const REQUIRED_BLOCKS: [&str; 6] = [
    "college_info",
    "time_slots",
    "departments",
    "subjects",
    "faculty",
    "rooms",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigurationStats {
    pub departments: usize,
    pub sections: usize,
    pub subjects: usize,
    pub labs: usize,
    pub faculty: usize,
    pub rooms: usize,
    pub periods: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub missing: Vec<String>,
    pub duplicates: Vec<String>,
    pub errors: Vec<String>,
    pub stats: ConfigurationStats,
}

/// Check a configuration document
pub fn validate(document: &Value) -> ValidationReport {
    let missing: Vec<String> = REQUIRED_BLOCKS
        .iter()
        .filter(|block| document.get(**block).map_or(true, Value::is_null))
        .map(|block| block.to_string())
        .collect();

    let (stats, duplicates, errors) = match serde_json::from_value::<RawConfiguration>(document.clone()) {
        Ok(config) => (stats(&config), duplicate_ids(&config), Vec::new()),
        Err(e) if document.is_object() => (
            ConfigurationStats::default(),
            Vec::new(),
            vec![format!("Configuration has an unexpected shape: {}", e)],
        ),
        Err(_) => (
            ConfigurationStats::default(),
            Vec::new(),
            vec!["Configuration must be a JSON object".to_string()],
        ),
    };

    ValidationReport {
        valid: missing.is_empty() && duplicates.is_empty() && errors.is_empty(),
        missing,
        duplicates,
        errors,
        stats,
    }
}

fn stats(config: &RawConfiguration) -> ConfigurationStats {
    let departments = config.departments.as_deref().unwrap_or_default();

    ConfigurationStats {
        departments: departments.len(),
        sections: departments
            .iter()
            .map(|d| d.sections.as_ref().map_or(0, Vec::len))
            .sum(),
        subjects: config.subjects.as_ref().map_or(0, Vec::len),
        labs: config.labs.as_ref().map_or(0, Vec::len),
        faculty: config.faculty.as_ref().map_or(0, Vec::len),
        rooms: config.rooms.as_ref().map_or(0, Vec::len),
        periods: config
            .time_slots
            .as_ref()
            .and_then(|t| t.periods.as_ref())
            .map_or(0, Vec::len),
    }
}

fn duplicate_ids(config: &RawConfiguration) -> Vec<String> {
    let sections = config
        .departments
        .iter()
        .flatten()
        .flat_map(|d| d.sections.iter().flatten())
        .filter_map(|s| s.section_id.as_deref());
    let subjects = config
        .subjects
        .iter()
        .flatten()
        .filter_map(|s| s.subject_id.as_deref());
    let faculty = config
        .faculty
        .iter()
        .flatten()
        .filter_map(|f| f.faculty_id.as_deref());
    let rooms = config
        .rooms
        .iter()
        .flatten()
        .filter_map(|r| r.room_id.as_deref());

    let mut duplicates = Vec::new();
    collect_duplicates("section_id", sections, &mut duplicates);
    collect_duplicates("subject_id", subjects, &mut duplicates);
    collect_duplicates("faculty_id", faculty, &mut duplicates);
    collect_duplicates("room_id", rooms, &mut duplicates);
    duplicates
}

fn collect_duplicates<'a>(
    field: &str,
    ids: impl Iterator<Item = &'a str>,
    out: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            out.push(format!("{} '{}'", field, id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_blocks_reported() {
        let report = validate(&json!({"college_info": {"name": "GEC"}, "rooms": null}));

        assert!(!report.valid);
        assert_eq!(
            report.missing,
            vec!["time_slots", "departments", "subjects", "faculty", "rooms"]
        );
    }

    #[test]
    fn test_complete_document_is_valid_with_stats() {
        let report = validate(&json!({
            "college_info": {"name": "GEC"},
            "time_slots": {"periods": [{"id": 1}, {"id": 2}]},
            "departments": [{"dept_id": "CSE", "sections": [{"section_id": "A"}, {"section_id": "B"}]}],
            "subjects": [{"subject_id": "MA201"}],
            "faculty": [{"faculty_id": "F1"}, {"faculty_id": "F2"}],
            "rooms": [{"room_id": "R1"}]
        }));

        assert!(report.valid, "{:?}", report);
        assert_eq!(report.stats.sections, 2);
        assert_eq!(report.stats.periods, 2);
        assert_eq!(report.stats.faculty, 2);
        assert_eq!(report.stats.labs, 0);
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let report = validate(&json!({
            "faculty": [{"faculty_id": "F1"}, {"faculty_id": "F1"}, {"faculty_id": "F1"}],
            "departments": [
                {"sections": [{"section_id": "A"}]},
                {"sections": [{"section_id": "A"}]}
            ]
        }));

        assert_eq!(report.duplicates, vec!["section_id 'A'", "faculty_id 'F1'"]);
    }

    #[test]
    fn test_wrong_shape_is_an_error_not_a_panic() {
        let report = validate(&json!({"departments": "CSE"}));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);

        let report = validate(&json!([1, 2, 3]));
        assert_eq!(report.errors, vec!["Configuration must be a JSON object"]);
    }
}
