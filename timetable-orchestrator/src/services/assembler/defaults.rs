//! Default table for the engine request
//!
//! Every value the assembler substitutes for an absent configuration field is
//! defined here and nowhere else. Entries documented as `null` mean "no such
//! period"; the key is still always sent.

use serde_json::{json, Value};

use crate::models::engine_request::{
    BalancedLoad, CollegeInfo, Constraints, Department, Faculty, FitnessWeights,
    GeneticAlgorithmParams, HardConstraints, Lab, LabBatchDivision, LibraryPeriods,
    MentorshipBreak, MinorsHonors, MorningHeavy, OpenElectives, Period, ProjectWork, Room,
    Section, SoftConstraints, SpecialRequirements, Subject, TimeSlots, TutorialClasses, Weight,
};

/// Working days used when the configuration names none
pub const DEFAULT_WORKING_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

impl Default for CollegeInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            session: String::new(),
            effective_date: String::new(),
        }
    }
}

impl Default for TimeSlots {
    fn default() -> Self {
        Self {
            periods: Vec::new(),
            working_days: DEFAULT_WORKING_DAYS.iter().map(|d| json!(d)).collect(),
            break_periods: Vec::new(),
            lunch_period: Value::Null,
            mentorship_period: Value::Null,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self {
            id: Value::Null,
            start_time: String::new(),
            end_time: String::new(),
        }
    }
}

impl Default for Department {
    fn default() -> Self {
        Self {
            dept_id: String::new(),
            name: String::new(),
            sections: Vec::new(),
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self {
            section_id: String::new(),
            name: String::new(),
            semester: json!(""),
            year: json!(""),
            room: String::new(),
            student_count: json!(60),
            coordinator: String::new(),
            specialization: String::new(),
        }
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            subject_id: String::new(),
            name: String::new(),
            kind: String::new(),
            credits: json!(0),
            lectures_per_week: json!(1),
            semester: json!(""),
            departments: Vec::new(),
            // Falls back to the resolved lectures_per_week when absent
            min_classes_per_week: json!(1),
            max_classes_per_day: json!(2),
            tutorial_sessions: json!(0),
            specialization: String::new(),
            flexible_timing: json!(false),
        }
    }
}

impl Default for Lab {
    fn default() -> Self {
        Self {
            lab_id: String::new(),
            name: String::new(),
            kind: String::new(),
            credits: json!(0),
            sessions_per_week: json!(2),
            duration_hours: json!(2),
            semester: json!(""),
            departments: Vec::new(),
            lab_rooms: Vec::new(),
            specialization: String::new(),
        }
    }
}

impl Default for Faculty {
    fn default() -> Self {
        Self {
            faculty_id: String::new(),
            name: String::new(),
            department: String::new(),
            designation: String::new(),
            subjects: Vec::new(),
            max_hours_per_week: json!(18),
            avg_leaves_per_month: json!(0),
            preferred_time_slots: Vec::new(),
        }
    }
}

impl Default for Room {
    fn default() -> Self {
        Self {
            room_id: String::new(),
            name: String::new(),
            kind: String::new(),
            capacity: json!(100),
            department: String::new(),
            equipment: Vec::new(),
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            hard_constraints: HardConstraints::default(),
            soft_constraints: SoftConstraints::default(),
        }
    }
}

impl Default for HardConstraints {
    fn default() -> Self {
        Self {
            no_faculty_clash: json!(true),
            no_room_clash: json!(true),
            no_section_clash: json!(true),
            break_periods_fixed: json!([]),
            lunch_period_fixed: Value::Null,
            mentorship_period_fixed: Value::Null,
            max_classes_per_day_per_section: json!(7),
            min_classes_per_week_per_subject: json!(true),
            lab_duration_consecutive: json!(true),
            faculty_availability: json!(true),
            section_room_assignment: json!(true),
        }
    }
}

impl Default for SoftConstraints {
    fn default() -> Self {
        Self {
            balanced_daily_load: BalancedLoad {
                weight: json!(0.3),
                max_deviation: json!(2),
            },
            faculty_preference_slots: Weight { weight: json!(0.2) },
            minimize_faculty_travel: Weight { weight: json!(0.15) },
            morning_heavy_subjects: MorningHeavy {
                weight: json!(0.1),
                subjects: json!([]),
            },
            avoid_single_period_gaps: Weight { weight: json!(0.15) },
            distribute_subjects_evenly: Weight { weight: json!(0.1) },
            minimize_free_periods: Weight { weight: json!(0.25) },
        }
    }
}

impl Default for SpecialRequirements {
    fn default() -> Self {
        Self {
            mentorship_break: MentorshipBreak {
                period: Value::Null,
                duration: json!(1),
                all_sections: json!(true),
            },
            library_periods: LibraryPeriods {
                sections: json!([]),
                periods_per_week: json!(1),
                flexible: json!(true),
            },
            project_work: ProjectWork {
                sections: json!([]),
                periods_per_week: json!(8),
                flexible_scheduling: json!(true),
            },
            tutorial_classes: TutorialClasses {
                subjects: json!([]),
                marked_as: json!("T"),
                duration: json!(1),
            },
            open_electives: OpenElectives {
                cross_department: json!(true),
                faculty_rotation: json!(true),
            },
            minors_honors: MinorsHonors {
                delivery_mode: json!("online"),
                platform: json!("Google Meet"),
                sections: json!([]),
                periods: json!([]),
            },
            lab_batch_division: LabBatchDivision {
                max_students_per_batch: json!(15),
                batch_naming: json!(["A", "B", "C", "D"]),
                rotation_labs: json!([]),
            },
        }
    }
}

impl Default for GeneticAlgorithmParams {
    fn default() -> Self {
        Self {
            population_size: json!(50),
            generations: json!(200),
            mutation_rate: json!(0.2),
            crossover_rate: json!(0.8),
            elite_size: json!(5),
            tournament_size: json!(3),
            early_stopping_patience: json!(5),
            fitness_weights: FitnessWeights::default(),
        }
    }
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            coverage_weight: json!(1000.0),
            balanced_daily_load_weight: json!(50.0),
            faculty_pref_weight: json!(10.0),
            consecutive_periods_weight: json!(30.0),
            faculty_clash_penalty: json!(2000.0),
            room_clash_penalty: json!(2000.0),
            section_clash_penalty: json!(2000.0),
            min_classes_violation_penalty: json!(500.0),
            gap_penalty: json!(100.0),
            free_period_penalty: json!(25.0),
            room_assignment_penalty: json!(1000.0),
            placement_failed_penalty: json!(300.0),
        }
    }
}
