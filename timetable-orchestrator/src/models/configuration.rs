//! Stored configuration document, as entered by tenant administrators
//!
//! Every field is optional. Scalar leaves that the engine treats numerically
//! are kept as raw JSON values so that `"3"` and `3` both survive parsing; the
//! request assembler coerces and defaults them. Identifier and name fields
//! accept strings, numbers or booleans and are read as strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Full configuration for one partition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawConfiguration {
    pub college_info: Option<RawCollegeInfo>,
    pub time_slots: Option<RawTimeSlots>,
    pub departments: Option<Vec<RawDepartment>>,
    pub subjects: Option<Vec<RawSubject>>,
    pub labs: Option<Vec<RawLab>>,
    pub faculty: Option<Vec<RawFaculty>>,
    pub rooms: Option<Vec<RawRoom>>,
    pub constraints: Option<RawConstraints>,
    pub special_requirements: Option<RawSpecialRequirements>,
    pub genetic_algorithm_params: Option<RawGeneticAlgorithmParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCollegeInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub session: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub effective_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTimeSlots {
    pub periods: Option<Vec<RawPeriod>>,
    pub working_days: Option<Vec<Value>>,
    pub break_periods: Option<Vec<Value>>,
    pub lunch_period: Option<Value>,
    pub mentorship_period: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawPeriod {
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDepartment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub dept_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    pub sections: Option<Vec<RawSection>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub section_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    pub semester: Option<Value>,
    pub year: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub room: Option<String>,
    pub student_count: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub coordinator: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSubject {
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    pub credits: Option<Value>,
    pub lectures_per_week: Option<Value>,
    pub semester: Option<Value>,
    pub departments: Option<Vec<Value>>,
    pub min_classes_per_week: Option<Value>,
    pub max_classes_per_day: Option<Value>,
    pub tutorial_sessions: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialization: Option<String>,
    pub flexible_timing: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawLab {
    #[serde(default, deserialize_with = "lenient_string")]
    pub lab_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    pub credits: Option<Value>,
    pub sessions_per_week: Option<Value>,
    pub duration_hours: Option<Value>,
    pub semester: Option<Value>,
    pub departments: Option<Vec<Value>>,
    pub lab_rooms: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawFaculty {
    #[serde(default, deserialize_with = "lenient_string")]
    pub faculty_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub designation: Option<String>,
    pub subjects: Option<Vec<Value>>,
    pub max_hours_per_week: Option<Value>,
    pub avg_leaves_per_month: Option<Value>,
    pub preferred_time_slots: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRoom {
    #[serde(default, deserialize_with = "lenient_string")]
    pub room_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    pub capacity: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: Option<String>,
    pub equipment: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawConstraints {
    pub hard_constraints: Option<RawHardConstraints>,
    pub soft_constraints: Option<RawSoftConstraints>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawHardConstraints {
    pub no_faculty_clash: Option<Value>,
    pub no_room_clash: Option<Value>,
    pub no_section_clash: Option<Value>,
    pub break_periods_fixed: Option<Value>,
    pub lunch_period_fixed: Option<Value>,
    pub mentorship_period_fixed: Option<Value>,
    pub max_classes_per_day_per_section: Option<Value>,
    pub min_classes_per_week_per_subject: Option<Value>,
    pub lab_duration_consecutive: Option<Value>,
    pub faculty_availability: Option<Value>,
    pub section_room_assignment: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSoftConstraints {
    pub balanced_daily_load: Option<RawBalancedLoad>,
    pub faculty_preference_slots: Option<RawWeight>,
    pub minimize_faculty_travel: Option<RawWeight>,
    pub morning_heavy_subjects: Option<RawMorningHeavy>,
    pub avoid_single_period_gaps: Option<RawWeight>,
    pub distribute_subjects_evenly: Option<RawWeight>,
    pub minimize_free_periods: Option<RawWeight>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawWeight {
    pub weight: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawBalancedLoad {
    pub weight: Option<Value>,
    pub max_deviation: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMorningHeavy {
    pub weight: Option<Value>,
    pub subjects: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSpecialRequirements {
    pub mentorship_break: Option<RawMentorshipBreak>,
    pub library_periods: Option<RawLibraryPeriods>,
    pub project_work: Option<RawProjectWork>,
    pub tutorial_classes: Option<RawTutorialClasses>,
    pub open_electives: Option<RawOpenElectives>,
    pub minors_honors: Option<RawMinorsHonors>,
    pub lab_batch_division: Option<RawLabBatchDivision>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMentorshipBreak {
    pub period: Option<Value>,
    pub duration: Option<Value>,
    pub all_sections: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawLibraryPeriods {
    pub sections: Option<Value>,
    pub periods_per_week: Option<Value>,
    pub flexible: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawProjectWork {
    pub sections: Option<Value>,
    pub periods_per_week: Option<Value>,
    pub flexible_scheduling: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTutorialClasses {
    pub subjects: Option<Value>,
    pub marked_as: Option<Value>,
    pub duration: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawOpenElectives {
    pub cross_department: Option<Value>,
    pub faculty_rotation: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMinorsHonors {
    pub delivery_mode: Option<Value>,
    pub platform: Option<Value>,
    pub sections: Option<Value>,
    pub periods: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawLabBatchDivision {
    pub max_students_per_batch: Option<Value>,
    pub batch_naming: Option<Value>,
    pub rotation_labs: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawGeneticAlgorithmParams {
    pub population_size: Option<Value>,
    pub generations: Option<Value>,
    pub mutation_rate: Option<Value>,
    pub crossover_rate: Option<Value>,
    pub elite_size: Option<Value>,
    pub tournament_size: Option<Value>,
    pub early_stopping_patience: Option<Value>,
    pub fitness_weights: Option<RawFitnessWeights>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawFitnessWeights {
    pub coverage_weight: Option<Value>,
    pub balanced_daily_load_weight: Option<Value>,
    pub faculty_pref_weight: Option<Value>,
    pub consecutive_periods_weight: Option<Value>,
    pub faculty_clash_penalty: Option<Value>,
    pub room_clash_penalty: Option<Value>,
    pub section_clash_penalty: Option<Value>,
    pub min_classes_violation_penalty: Option<Value>,
    pub gap_penalty: Option<Value>,
    pub free_period_penalty: Option<Value>,
    pub room_assignment_penalty: Option<Value>,
    pub placement_failed_penalty: Option<Value>,
}

/// Accept a string, number or boolean and read it as a string
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_identifiers_read_as_strings() {
        let section: RawSection = serde_json::from_value(json!({
            "section_id": 101,
            "name": "A",
            "semester": "3"
        }))
        .unwrap();

        assert_eq!(section.section_id.as_deref(), Some("101"));
        assert_eq!(section.semester, Some(json!("3")));
    }

    #[test]
    fn test_null_leaf_reads_as_absent() {
        let hard: RawHardConstraints = serde_json::from_value(json!({
            "no_faculty_clash": null,
            "no_room_clash": false
        }))
        .unwrap();

        assert_eq!(hard.no_faculty_clash, None);
        assert_eq!(hard.no_room_clash, Some(json!(false)));
    }

    #[test]
    fn test_empty_document_parses() {
        let config: RawConfiguration = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, RawConfiguration::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config: RawConfiguration = serde_json::from_value(json!({
            "college_info": {"name": "GEC", "motto": "ignored"},
            "extra_block": {"x": 1}
        }))
        .unwrap();

        assert_eq!(
            config.college_info.and_then(|c| c.name).as_deref(),
            Some("GEC")
        );
    }
}
