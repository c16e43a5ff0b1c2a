//! Request assembler
//!
//! Turns a stored, partially-populated [`RawConfiguration`] into the complete
//! [`EngineRequest`] the optimization engine expects. The transform is pure and
//! never fails: absent fields take the value from [`defaults`], present fields
//! pass through after best-effort numeric coercion.

pub mod defaults;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::models::configuration::{
    RawBalancedLoad, RawCollegeInfo, RawConfiguration, RawConstraints, RawDepartment,
    RawFaculty, RawFitnessWeights, RawGeneticAlgorithmParams, RawHardConstraints, RawLab,
    RawLabBatchDivision, RawLibraryPeriods, RawMentorshipBreak, RawMinorsHonors,
    RawMorningHeavy, RawOpenElectives, RawPeriod, RawProjectWork, RawRoom, RawSection,
    RawSoftConstraints, RawSpecialRequirements, RawSubject, RawTimeSlots, RawTutorialClasses,
    RawWeight,
};
use crate::models::engine_request::{
    BalancedLoad, CollegeInfo, Constraints, Department, EngineRequest, Faculty, FitnessWeights,
    GeneticAlgorithmParams, HardConstraints, Lab, LabBatchDivision, LibraryPeriods,
    MentorshipBreak, MinorsHonors, MorningHeavy, OpenElectives, Period, ProjectWork, Room,
    Section, SoftConstraints, SpecialRequirements, Subject, TimeSlots, TutorialClasses, Weight,
};

/// Assemble the engine request for a configuration
pub fn assemble(config: &RawConfiguration) -> EngineRequest {
    EngineRequest {
        college_info: resolve(&config.college_info),
        time_slots: resolve(&config.time_slots),
        departments: resolve_list(&config.departments),
        subjects: resolve_list(&config.subjects),
        labs: resolve_list(&config.labs),
        faculty: resolve_list(&config.faculty),
        rooms: resolve_list(&config.rooms),
        constraints: resolve(&config.constraints),
        special_requirements: resolve(&config.special_requirements),
        genetic_algorithm_params: resolve(&config.genetic_algorithm_params),
    }
}

/// Merge of a raw block over its default counterpart
trait Resolve {
    type Output: Default;

    fn resolve_with(&self, defaults: Self::Output) -> Self::Output;
}

fn resolve<R: Resolve>(raw: &Option<R>) -> R::Output {
    match raw {
        Some(raw) => raw.resolve_with(R::Output::default()),
        None => R::Output::default(),
    }
}

fn resolve_list<R: Resolve>(raw: &Option<Vec<R>>) -> Vec<R::Output> {
    raw.iter()
        .flatten()
        .map(|item| item.resolve_with(R::Output::default()))
        .collect()
}

/// Present-and-non-null raw value (coerced), otherwise the default
fn pick(raw: &Option<Value>, default: Value) -> Value {
    match raw {
        Some(value) if !value.is_null() => coerce_numeric(value),
        _ => default,
    }
}

fn pick_string(raw: &Option<String>, default: String) -> String {
    raw.clone().unwrap_or(default)
}

fn pick_list(raw: &Option<Vec<Value>>, default: Vec<Value>) -> Vec<Value> {
    match raw {
        Some(items) => items.iter().map(coerce_numeric).collect(),
        None => default,
    }
}

/// Strings holding an integer become JSON numbers; anything else is unchanged
pub fn coerce_numeric(value: &Value) -> Value {
    match value {
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => value.clone(),
        },
        other => other.clone(),
    }
}

/// `YYYY-MM-DD` for RFC 3339 timestamps and plain dates; other input unchanged
pub fn normalize_effective_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return timestamp.with_timezone(&Utc).date_naive().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}

impl Resolve for RawCollegeInfo {
    type Output = CollegeInfo;

    fn resolve_with(&self, d: CollegeInfo) -> CollegeInfo {
        CollegeInfo {
            name: pick_string(&self.name, d.name),
            session: pick_string(&self.session, d.session),
            effective_date: self
                .effective_date
                .as_deref()
                .map(normalize_effective_date)
                .unwrap_or(d.effective_date),
        }
    }
}

impl Resolve for RawTimeSlots {
    type Output = TimeSlots;

    fn resolve_with(&self, d: TimeSlots) -> TimeSlots {
        TimeSlots {
            periods: resolve_list(&self.periods),
            working_days: pick_list(&self.working_days, d.working_days),
            break_periods: pick_list(&self.break_periods, d.break_periods),
            lunch_period: pick(&self.lunch_period, d.lunch_period),
            mentorship_period: pick(&self.mentorship_period, d.mentorship_period),
        }
    }
}

impl Resolve for RawPeriod {
    type Output = Period;

    fn resolve_with(&self, d: Period) -> Period {
        Period {
            id: pick(&self.id, d.id),
            start_time: pick_string(&self.start_time, d.start_time),
            end_time: pick_string(&self.end_time, d.end_time),
        }
    }
}

impl Resolve for RawDepartment {
    type Output = Department;

    fn resolve_with(&self, d: Department) -> Department {
        Department {
            dept_id: pick_string(&self.dept_id, d.dept_id),
            name: pick_string(&self.name, d.name),
            sections: resolve_list(&self.sections),
        }
    }
}

impl Resolve for RawSection {
    type Output = Section;

    fn resolve_with(&self, d: Section) -> Section {
        Section {
            section_id: pick_string(&self.section_id, d.section_id),
            name: pick_string(&self.name, d.name),
            semester: pick(&self.semester, d.semester),
            year: pick(&self.year, d.year),
            room: pick_string(&self.room, d.room),
            student_count: pick(&self.student_count, d.student_count),
            coordinator: pick_string(&self.coordinator, d.coordinator),
            specialization: pick_string(&self.specialization, d.specialization),
        }
    }
}

impl Resolve for RawSubject {
    type Output = Subject;

    fn resolve_with(&self, d: Subject) -> Subject {
        let lectures_per_week = pick(&self.lectures_per_week, d.lectures_per_week);
        Subject {
            subject_id: pick_string(&self.subject_id, d.subject_id),
            name: pick_string(&self.name, d.name),
            kind: pick_string(&self.kind, d.kind),
            credits: pick(&self.credits, d.credits),
            min_classes_per_week: pick(&self.min_classes_per_week, lectures_per_week.clone()),
            lectures_per_week,
            semester: pick(&self.semester, d.semester),
            departments: pick_list(&self.departments, d.departments),
            max_classes_per_day: pick(&self.max_classes_per_day, d.max_classes_per_day),
            tutorial_sessions: pick(&self.tutorial_sessions, d.tutorial_sessions),
            specialization: pick_string(&self.specialization, d.specialization),
            flexible_timing: pick(&self.flexible_timing, d.flexible_timing),
        }
    }
}

impl Resolve for RawLab {
    type Output = Lab;

    fn resolve_with(&self, d: Lab) -> Lab {
        Lab {
            lab_id: pick_string(&self.lab_id, d.lab_id),
            name: pick_string(&self.name, d.name),
            kind: pick_string(&self.kind, d.kind),
            credits: pick(&self.credits, d.credits),
            sessions_per_week: pick(&self.sessions_per_week, d.sessions_per_week),
            duration_hours: pick(&self.duration_hours, d.duration_hours),
            semester: pick(&self.semester, d.semester),
            departments: pick_list(&self.departments, d.departments),
            lab_rooms: pick_list(&self.lab_rooms, d.lab_rooms),
            specialization: pick_string(&self.specialization, d.specialization),
        }
    }
}

impl Resolve for RawFaculty {
    type Output = Faculty;

    fn resolve_with(&self, d: Faculty) -> Faculty {
        Faculty {
            faculty_id: pick_string(&self.faculty_id, d.faculty_id),
            name: pick_string(&self.name, d.name),
            department: pick_string(&self.department, d.department),
            designation: pick_string(&self.designation, d.designation),
            subjects: pick_list(&self.subjects, d.subjects),
            max_hours_per_week: pick(&self.max_hours_per_week, d.max_hours_per_week),
            avg_leaves_per_month: pick(&self.avg_leaves_per_month, d.avg_leaves_per_month),
            preferred_time_slots: pick_list(&self.preferred_time_slots, d.preferred_time_slots),
        }
    }
}

impl Resolve for RawRoom {
    type Output = Room;

    fn resolve_with(&self, d: Room) -> Room {
        Room {
            room_id: pick_string(&self.room_id, d.room_id),
            name: pick_string(&self.name, d.name),
            kind: pick_string(&self.kind, d.kind),
            capacity: pick(&self.capacity, d.capacity),
            department: pick_string(&self.department, d.department),
            equipment: pick_list(&self.equipment, d.equipment),
        }
    }
}

impl Resolve for RawConstraints {
    type Output = Constraints;

    fn resolve_with(&self, _d: Constraints) -> Constraints {
        Constraints {
            hard_constraints: resolve(&self.hard_constraints),
            soft_constraints: resolve(&self.soft_constraints),
        }
    }
}

impl Resolve for RawHardConstraints {
    type Output = HardConstraints;

    fn resolve_with(&self, d: HardConstraints) -> HardConstraints {
        HardConstraints {
            no_faculty_clash: pick(&self.no_faculty_clash, d.no_faculty_clash),
            no_room_clash: pick(&self.no_room_clash, d.no_room_clash),
            no_section_clash: pick(&self.no_section_clash, d.no_section_clash),
            break_periods_fixed: pick(&self.break_periods_fixed, d.break_periods_fixed),
            lunch_period_fixed: pick(&self.lunch_period_fixed, d.lunch_period_fixed),
            mentorship_period_fixed: pick(&self.mentorship_period_fixed, d.mentorship_period_fixed),
            max_classes_per_day_per_section: pick(
                &self.max_classes_per_day_per_section,
                d.max_classes_per_day_per_section,
            ),
            min_classes_per_week_per_subject: pick(
                &self.min_classes_per_week_per_subject,
                d.min_classes_per_week_per_subject,
            ),
            lab_duration_consecutive: pick(&self.lab_duration_consecutive, d.lab_duration_consecutive),
            faculty_availability: pick(&self.faculty_availability, d.faculty_availability),
            section_room_assignment: pick(&self.section_room_assignment, d.section_room_assignment),
        }
    }
}

impl Resolve for RawSoftConstraints {
    type Output = SoftConstraints;

    fn resolve_with(&self, d: SoftConstraints) -> SoftConstraints {
        SoftConstraints {
            balanced_daily_load: resolve_or(&self.balanced_daily_load, d.balanced_daily_load),
            faculty_preference_slots: resolve_or(
                &self.faculty_preference_slots,
                d.faculty_preference_slots,
            ),
            minimize_faculty_travel: resolve_or(
                &self.minimize_faculty_travel,
                d.minimize_faculty_travel,
            ),
            morning_heavy_subjects: resolve_or(
                &self.morning_heavy_subjects,
                d.morning_heavy_subjects,
            ),
            avoid_single_period_gaps: resolve_or(
                &self.avoid_single_period_gaps,
                d.avoid_single_period_gaps,
            ),
            distribute_subjects_evenly: resolve_or(
                &self.distribute_subjects_evenly,
                d.distribute_subjects_evenly,
            ),
            minimize_free_periods: resolve_or(&self.minimize_free_periods, d.minimize_free_periods),
        }
    }
}

/// Blocks whose defaults differ per position (e.g. each soft-constraint weight)
trait ResolveFrom<T> {
    fn resolve_from(&self, defaults: T) -> T;
}

fn resolve_or<R: ResolveFrom<T>, T>(raw: &Option<R>, defaults: T) -> T {
    match raw {
        Some(raw) => raw.resolve_from(defaults),
        None => defaults,
    }
}

impl ResolveFrom<Weight> for RawWeight {
    fn resolve_from(&self, d: Weight) -> Weight {
        Weight {
            weight: pick(&self.weight, d.weight),
        }
    }
}

impl ResolveFrom<BalancedLoad> for RawBalancedLoad {
    fn resolve_from(&self, d: BalancedLoad) -> BalancedLoad {
        BalancedLoad {
            weight: pick(&self.weight, d.weight),
            max_deviation: pick(&self.max_deviation, d.max_deviation),
        }
    }
}

impl ResolveFrom<MorningHeavy> for RawMorningHeavy {
    fn resolve_from(&self, d: MorningHeavy) -> MorningHeavy {
        MorningHeavy {
            weight: pick(&self.weight, d.weight),
            subjects: pick(&self.subjects, d.subjects),
        }
    }
}

impl Resolve for RawSpecialRequirements {
    type Output = SpecialRequirements;

    fn resolve_with(&self, d: SpecialRequirements) -> SpecialRequirements {
        SpecialRequirements {
            mentorship_break: resolve_or(&self.mentorship_break, d.mentorship_break),
            library_periods: resolve_or(&self.library_periods, d.library_periods),
            project_work: resolve_or(&self.project_work, d.project_work),
            tutorial_classes: resolve_or(&self.tutorial_classes, d.tutorial_classes),
            open_electives: resolve_or(&self.open_electives, d.open_electives),
            minors_honors: resolve_or(&self.minors_honors, d.minors_honors),
            lab_batch_division: resolve_or(&self.lab_batch_division, d.lab_batch_division),
        }
    }
}

impl ResolveFrom<MentorshipBreak> for RawMentorshipBreak {
    fn resolve_from(&self, d: MentorshipBreak) -> MentorshipBreak {
        MentorshipBreak {
            period: pick(&self.period, d.period),
            duration: pick(&self.duration, d.duration),
            all_sections: pick(&self.all_sections, d.all_sections),
        }
    }
}

impl ResolveFrom<LibraryPeriods> for RawLibraryPeriods {
    fn resolve_from(&self, d: LibraryPeriods) -> LibraryPeriods {
        LibraryPeriods {
            sections: pick(&self.sections, d.sections),
            periods_per_week: pick(&self.periods_per_week, d.periods_per_week),
            flexible: pick(&self.flexible, d.flexible),
        }
    }
}

impl ResolveFrom<ProjectWork> for RawProjectWork {
    fn resolve_from(&self, d: ProjectWork) -> ProjectWork {
        ProjectWork {
            sections: pick(&self.sections, d.sections),
            periods_per_week: pick(&self.periods_per_week, d.periods_per_week),
            flexible_scheduling: pick(&self.flexible_scheduling, d.flexible_scheduling),
        }
    }
}

impl ResolveFrom<TutorialClasses> for RawTutorialClasses {
    fn resolve_from(&self, d: TutorialClasses) -> TutorialClasses {
        TutorialClasses {
            subjects: pick(&self.subjects, d.subjects),
            marked_as: pick(&self.marked_as, d.marked_as),
            duration: pick(&self.duration, d.duration),
        }
    }
}

impl ResolveFrom<OpenElectives> for RawOpenElectives {
    fn resolve_from(&self, d: OpenElectives) -> OpenElectives {
        OpenElectives {
            cross_department: pick(&self.cross_department, d.cross_department),
            faculty_rotation: pick(&self.faculty_rotation, d.faculty_rotation),
        }
    }
}

impl ResolveFrom<MinorsHonors> for RawMinorsHonors {
    fn resolve_from(&self, d: MinorsHonors) -> MinorsHonors {
        MinorsHonors {
            delivery_mode: pick(&self.delivery_mode, d.delivery_mode),
            platform: pick(&self.platform, d.platform),
            sections: pick(&self.sections, d.sections),
            periods: pick(&self.periods, d.periods),
        }
    }
}

impl ResolveFrom<LabBatchDivision> for RawLabBatchDivision {
    fn resolve_from(&self, d: LabBatchDivision) -> LabBatchDivision {
        LabBatchDivision {
            max_students_per_batch: pick(&self.max_students_per_batch, d.max_students_per_batch),
            batch_naming: pick(&self.batch_naming, d.batch_naming),
            rotation_labs: pick(&self.rotation_labs, d.rotation_labs),
        }
    }
}

impl Resolve for RawGeneticAlgorithmParams {
    type Output = GeneticAlgorithmParams;

    fn resolve_with(&self, d: GeneticAlgorithmParams) -> GeneticAlgorithmParams {
        GeneticAlgorithmParams {
            population_size: pick(&self.population_size, d.population_size),
            generations: pick(&self.generations, d.generations),
            mutation_rate: pick(&self.mutation_rate, d.mutation_rate),
            crossover_rate: pick(&self.crossover_rate, d.crossover_rate),
            elite_size: pick(&self.elite_size, d.elite_size),
            tournament_size: pick(&self.tournament_size, d.tournament_size),
            early_stopping_patience: pick(&self.early_stopping_patience, d.early_stopping_patience),
            fitness_weights: resolve(&self.fitness_weights),
        }
    }
}

impl Resolve for RawFitnessWeights {
    type Output = FitnessWeights;

    fn resolve_with(&self, d: FitnessWeights) -> FitnessWeights {
        FitnessWeights {
            coverage_weight: pick(&self.coverage_weight, d.coverage_weight),
            balanced_daily_load_weight: pick(
                &self.balanced_daily_load_weight,
                d.balanced_daily_load_weight,
            ),
            faculty_pref_weight: pick(&self.faculty_pref_weight, d.faculty_pref_weight),
            consecutive_periods_weight: pick(
                &self.consecutive_periods_weight,
                d.consecutive_periods_weight,
            ),
            faculty_clash_penalty: pick(&self.faculty_clash_penalty, d.faculty_clash_penalty),
            room_clash_penalty: pick(&self.room_clash_penalty, d.room_clash_penalty),
            section_clash_penalty: pick(&self.section_clash_penalty, d.section_clash_penalty),
            min_classes_violation_penalty: pick(
                &self.min_classes_violation_penalty,
                d.min_classes_violation_penalty,
            ),
            gap_penalty: pick(&self.gap_penalty, d.gap_penalty),
            free_period_penalty: pick(&self.free_period_penalty, d.free_period_penalty),
            room_assignment_penalty: pick(&self.room_assignment_penalty, d.room_assignment_penalty),
            placement_failed_penalty: pick(
                &self.placement_failed_penalty,
                d.placement_failed_penalty,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> RawConfiguration {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_configuration_gets_full_default_table() {
        let request = assemble(&RawConfiguration::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["constraints"]["hard_constraints"]["no_faculty_clash"], json!(true));
        assert_eq!(
            value["constraints"]["soft_constraints"]["balanced_daily_load"]["weight"],
            json!(0.3)
        );
        assert_eq!(value["genetic_algorithm_params"]["population_size"], json!(50));
        assert_eq!(value["genetic_algorithm_params"]["generations"], json!(200));
        assert_eq!(value["genetic_algorithm_params"]["mutation_rate"], json!(0.2));
        assert_eq!(
            value["genetic_algorithm_params"]["fitness_weights"]
                .as_object()
                .map(|m| m.len()),
            Some(12)
        );
        assert_eq!(value["departments"], json!([]));
        assert_eq!(value["time_slots"]["working_days"].as_array().map(|d| d.len()), Some(5));
    }

    #[test]
    fn test_every_top_level_key_present() {
        let value = serde_json::to_value(assemble(&RawConfiguration::default())).unwrap();
        for key in [
            "college_info",
            "time_slots",
            "departments",
            "subjects",
            "labs",
            "faculty",
            "rooms",
            "constraints",
            "special_requirements",
            "genetic_algorithm_params",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_explicit_false_is_not_replaced_by_default() {
        let config = parse(json!({
            "constraints": {"hard_constraints": {"no_room_clash": false}}
        }));
        let request = assemble(&config);

        assert_eq!(request.constraints.hard_constraints.no_room_clash, json!(false));
        assert_eq!(request.constraints.hard_constraints.no_faculty_clash, json!(true));
    }

    #[test]
    fn test_partial_block_keeps_sibling_defaults() {
        let config = parse(json!({
            "genetic_algorithm_params": {
                "generations": 80,
                "fitness_weights": {"gap_penalty": 40.0}
            }
        }));
        let ga = assemble(&config).genetic_algorithm_params;

        assert_eq!(ga.generations, json!(80));
        assert_eq!(ga.population_size, json!(50));
        assert_eq!(ga.fitness_weights.gap_penalty, json!(40.0));
        assert_eq!(ga.fitness_weights.coverage_weight, json!(1000.0));
    }

    #[test]
    fn test_integer_strings_coerced_other_strings_pass_through() {
        let config = parse(json!({
            "departments": [{
                "dept_id": "CSE",
                "name": "Computer Science",
                "sections": [
                    {"section_id": "CSE-A", "semester": "3", "year": " 2 "},
                    {"section_id": "CSE-B", "semester": "third", "year": 2}
                ]
            }],
            "genetic_algorithm_params": {"population_size": "64", "mutation_rate": "0.35"}
        }));
        let request = assemble(&config);
        let sections = &request.departments[0].sections;

        assert_eq!(sections[0].semester, json!(3));
        assert_eq!(sections[0].year, json!(2));
        assert_eq!(sections[1].semester, json!("third"));
        assert_eq!(sections[1].year, json!(2));
        assert_eq!(request.genetic_algorithm_params.population_size, json!(64));
        assert_eq!(request.genetic_algorithm_params.mutation_rate, json!("0.35"));
    }

    #[test]
    fn test_min_classes_falls_back_to_lectures_per_week() {
        let config = parse(json!({
            "subjects": [
                {"subject_id": "MA201", "lectures_per_week": "4"},
                {"subject_id": "PH201", "lectures_per_week": 3, "min_classes_per_week": 2}
            ]
        }));
        let subjects = assemble(&config).subjects;

        assert_eq!(subjects[0].min_classes_per_week, json!(4));
        assert_eq!(subjects[1].min_classes_per_week, json!(2));
        assert_eq!(subjects[0].max_classes_per_day, json!(2));
    }

    #[test]
    fn test_null_lunch_period_stays_explicit_null() {
        let value = serde_json::to_value(assemble(&RawConfiguration::default())).unwrap();
        let time_slots = value["time_slots"].as_object().unwrap();
        assert!(time_slots.contains_key("lunch_period"));
        assert_eq!(time_slots["lunch_period"], Value::Null);
    }

    #[test]
    fn test_effective_date_normalization() {
        assert_eq!(normalize_effective_date("2024-07-01T00:00:00.000Z"), "2024-07-01");
        assert_eq!(normalize_effective_date("2024-07-01"), "2024-07-01");
        assert_eq!(normalize_effective_date("July 2024"), "July 2024");
    }

    #[test]
    fn test_entity_defaults_applied() {
        let config = parse(json!({
            "rooms": [{"room_id": "R101"}],
            "faculty": [{"faculty_id": "F1", "name": "Dr. Rao"}],
            "labs": [{"lab_id": "L1"}]
        }));
        let request = assemble(&config);

        assert_eq!(request.rooms[0].capacity, json!(100));
        assert_eq!(request.rooms[0].equipment, Vec::<Value>::new());
        assert_eq!(request.faculty[0].max_hours_per_week, json!(18));
        assert_eq!(request.labs[0].sessions_per_week, json!(2));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let config = parse(json!({
            "college_info": {"name": "GEC", "session": "2024-25"},
            "subjects": [{"subject_id": "MA201"}]
        }));
        assert_eq!(assemble(&config), assemble(&config));
    }
}
