//! Fully-populated request sent to the optimization engine
//!
//! Produced only by the request assembler. Every key is always present; values
//! are either the configuration's own (coerced) value or the documented
//! default from `services::assembler::defaults`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineRequest {
    pub college_info: CollegeInfo,
    pub time_slots: TimeSlots,
    pub departments: Vec<Department>,
    pub subjects: Vec<Subject>,
    pub labs: Vec<Lab>,
    pub faculty: Vec<Faculty>,
    pub rooms: Vec<Room>,
    pub constraints: Constraints,
    pub special_requirements: SpecialRequirements,
    pub genetic_algorithm_params: GeneticAlgorithmParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollegeInfo {
    pub name: String,
    pub session: String,
    pub effective_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlots {
    pub periods: Vec<Period>,
    pub working_days: Vec<Value>,
    pub break_periods: Vec<Value>,
    pub lunch_period: Value,
    pub mentorship_period: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Period {
    pub id: Value,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub dept_id: String,
    pub name: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub section_id: String,
    pub name: String,
    pub semester: Value,
    pub year: Value,
    pub room: String,
    pub student_count: Value,
    pub coordinator: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub subject_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub credits: Value,
    pub lectures_per_week: Value,
    pub semester: Value,
    pub departments: Vec<Value>,
    pub min_classes_per_week: Value,
    pub max_classes_per_day: Value,
    pub tutorial_sessions: Value,
    pub specialization: String,
    pub flexible_timing: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lab {
    pub lab_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub credits: Value,
    pub sessions_per_week: Value,
    pub duration_hours: Value,
    pub semester: Value,
    pub departments: Vec<Value>,
    pub lab_rooms: Vec<Value>,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faculty {
    pub faculty_id: String,
    pub name: String,
    pub department: String,
    pub designation: String,
    pub subjects: Vec<Value>,
    pub max_hours_per_week: Value,
    pub avg_leaves_per_month: Value,
    pub preferred_time_slots: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub room_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub capacity: Value,
    pub department: String,
    pub equipment: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    pub hard_constraints: HardConstraints,
    pub soft_constraints: SoftConstraints,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardConstraints {
    pub no_faculty_clash: Value,
    pub no_room_clash: Value,
    pub no_section_clash: Value,
    pub break_periods_fixed: Value,
    pub lunch_period_fixed: Value,
    pub mentorship_period_fixed: Value,
    pub max_classes_per_day_per_section: Value,
    pub min_classes_per_week_per_subject: Value,
    pub lab_duration_consecutive: Value,
    pub faculty_availability: Value,
    pub section_room_assignment: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoftConstraints {
    pub balanced_daily_load: BalancedLoad,
    pub faculty_preference_slots: Weight,
    pub minimize_faculty_travel: Weight,
    pub morning_heavy_subjects: MorningHeavy,
    pub avoid_single_period_gaps: Weight,
    pub distribute_subjects_evenly: Weight,
    pub minimize_free_periods: Weight,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weight {
    pub weight: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalancedLoad {
    pub weight: Value,
    pub max_deviation: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MorningHeavy {
    pub weight: Value,
    pub subjects: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialRequirements {
    pub mentorship_break: MentorshipBreak,
    pub library_periods: LibraryPeriods,
    pub project_work: ProjectWork,
    pub tutorial_classes: TutorialClasses,
    pub open_electives: OpenElectives,
    pub minors_honors: MinorsHonors,
    pub lab_batch_division: LabBatchDivision,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentorshipBreak {
    pub period: Value,
    pub duration: Value,
    pub all_sections: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryPeriods {
    pub sections: Value,
    pub periods_per_week: Value,
    pub flexible: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectWork {
    pub sections: Value,
    pub periods_per_week: Value,
    pub flexible_scheduling: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TutorialClasses {
    pub subjects: Value,
    pub marked_as: Value,
    pub duration: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenElectives {
    pub cross_department: Value,
    pub faculty_rotation: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinorsHonors {
    pub delivery_mode: Value,
    pub platform: Value,
    pub sections: Value,
    pub periods: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabBatchDivision {
    pub max_students_per_batch: Value,
    pub batch_naming: Value,
    pub rotation_labs: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneticAlgorithmParams {
    pub population_size: Value,
    pub generations: Value,
    pub mutation_rate: Value,
    pub crossover_rate: Value,
    pub elite_size: Value,
    pub tournament_size: Value,
    pub early_stopping_patience: Value,
    pub fitness_weights: FitnessWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitnessWeights {
    pub coverage_weight: Value,
    pub balanced_daily_load_weight: Value,
    pub faculty_pref_weight: Value,
    pub consecutive_periods_weight: Value,
    pub faculty_clash_penalty: Value,
    pub room_clash_penalty: Value,
    pub section_clash_penalty: Value,
    pub min_classes_violation_penalty: Value,
    pub gap_penalty: Value,
    pub free_period_penalty: Value,
    pub room_assignment_penalty: Value,
    pub placement_failed_penalty: Value,
}
