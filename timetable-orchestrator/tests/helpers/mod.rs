//! Test helper utilities
//!
//! Shared fixtures for the timetable-orchestrator integration tests: a
//! scripted in-process engine, a sample configuration with 2 sections and
//! 3 faculty, and request helpers for driving the router.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

use timetable_common::db::init_memory_database;
use timetable_common::PartitionKey;
use timetable_orchestrator::models::{
    ClassSlot, EngineRequest, EngineSolution, FacultyTimetable, Grid, SectionTimetable, Slot,
};
use timetable_orchestrator::services::{EngineError, OptimizationEngine};
use timetable_orchestrator::{build_router, AppState};

pub const TENANT: &str = "org1";
pub const COURSE: &str = "btech";
pub const YEAR: &str = "2";
pub const SEMESTER: &str = "1";

pub fn partition() -> PartitionKey {
    PartitionKey::new(TENANT, COURSE, YEAR, SEMESTER).unwrap()
}

/// URI under the sample partition, e.g. `partition_uri("generate")`
pub fn partition_uri(suffix: &str) -> String {
    format!(
        "/api/partitions/{}/{}/{}/{}/{}",
        TENANT, COURSE, YEAR, SEMESTER, suffix
    )
}

/// One scripted engine answer
pub enum Script {
    Solutions(Vec<EngineSolution>),
    Timeout,
    Unavailable,
    BadResponse,
}

/// In-process engine that replays queued answers
///
/// Falls back to `sample_solutions(3)` once the queue is empty.
#[derive(Default)]
pub struct ScriptedEngine {
    queue: Mutex<VecDeque<(Duration, Script)>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<EngineRequest>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, script: Script) {
        self.push_delayed(Duration::ZERO, script);
    }

    pub fn push_delayed(&self, delay: Duration, script: Script) {
        self.queue.lock().unwrap().push_back((delay, script));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<EngineRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl OptimizationEngine for ScriptedEngine {
    async fn generate(&self, request: &EngineRequest) -> Result<Vec<EngineSolution>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let next = self.queue.lock().unwrap().pop_front();
        let (delay, script) = next.unwrap_or((Duration::ZERO, Script::Solutions(sample_solutions(3))));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match script {
            Script::Solutions(solutions) => Ok(solutions),
            Script::Timeout => Err(EngineError::Timeout(1)),
            Script::Unavailable => Err(EngineError::Unavailable("connection refused".into())),
            Script::BadResponse => Err(EngineError::BadResponse("solutions list is empty".into())),
        }
    }
}

/// Router plus handles on its collaborators
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub engine: Arc<ScriptedEngine>,
    pub state: AppState,
}

/// Test app over an in-memory database
pub async fn create_test_app() -> TestApp {
    let pool = init_memory_database()
        .await
        .expect("Failed to create in-memory database");
    create_test_app_with_pool(pool)
}

pub fn create_test_app_with_pool(pool: SqlitePool) -> TestApp {
    let engine = Arc::new(ScriptedEngine::new());
    let state = AppState::new(pool.clone(), engine.clone());
    TestApp {
        app: build_router(state.clone()),
        pool,
        engine,
        state,
    }
}

impl TestApp {
    /// Send one request and decode the JSON body (Null when empty)
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    /// Store the sample configuration for the sample partition
    pub async fn seed_configuration(&self) {
        let (status, _) = self
            .put(&partition_uri("configuration"), sample_configuration())
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Generate and return the candidate summaries
    pub async fn generate(&self) -> Vec<Value> {
        let (status, body) = self.post(&partition_uri("generate"), json!({})).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["candidates"].as_array().cloned().unwrap()
    }

    pub async fn approve(&self, candidate_id: &str) -> (StatusCode, Value) {
        self.post(&partition_uri("approve"), json!({"candidate_id": candidate_id}))
            .await
    }
}

/// Candidate id of the summary with the given rank
pub fn candidate_with_rank(candidates: &[Value], rank: i64) -> String {
    candidates
        .iter()
        .find(|c| c["rank"] == json!(rank))
        .and_then(|c| c["candidate_id"].as_str())
        .map(str::to_string)
        .unwrap()
}

/// Configuration with 2 sections (CSE-A, CSE-B) and 3 faculty (F1..F3)
pub fn sample_configuration() -> Value {
    json!({
        "college_info": {"name": "Government Engineering College", "session": "2024-25"},
        "time_slots": {
            "periods": [
                {"id": 1, "start_time": "09:00", "end_time": "09:55"},
                {"id": 2, "start_time": "09:55", "end_time": "10:50"},
                {"id": 3, "start_time": "11:05", "end_time": "12:00"}
            ],
            "working_days": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
            "lunch_period": 4
        },
        "departments": [{
            "dept_id": "CSE",
            "name": "Computer Science",
            "sections": [
                {"section_id": "CSE-A", "name": "A", "semester": "1", "year": "2", "student_count": "62"},
                {"section_id": "CSE-B", "name": "B", "semester": 1, "year": 2}
            ]
        }],
        "subjects": [
            {"subject_id": "MA201", "name": "Mathematics", "type": "Theory", "lectures_per_week": 4},
            {"subject_id": "CS201", "name": "Data Structures", "type": "Theory", "lectures_per_week": "3"}
        ],
        "faculty": [
            {"faculty_id": "F1", "name": "Dr. Rao", "department": "CSE", "subjects": ["MA201"]},
            {"faculty_id": "F2", "name": "Dr. Iyer", "department": "CSE", "subjects": ["CS201"]},
            {"faculty_id": "F3", "name": "Prof. Sen", "department": "CSE", "subjects": ["CS201"]}
        ],
        "rooms": [
            {"room_id": "R101", "name": "Room 101", "type": "Lecture", "capacity": 70}
        ],
        "constraints": {"hard_constraints": {"no_room_clash": false}},
        "genetic_algorithm_params": {"generations": 40}
    })
}

fn grid(subject: &str, counterpart: (&str, &str)) -> Grid {
    let mut monday = BTreeMap::new();
    let (key, value) = counterpart;
    monday.insert(
        "1".to_string(),
        Slot::Class(ClassSlot {
            subject: subject.to_string(),
            room: "R101".to_string(),
            kind: "Theory".to_string(),
            faculty: (key == "faculty").then(|| value.to_string()),
            section: (key == "section").then(|| value.to_string()),
        }),
    );
    monday.insert("2".to_string(), Slot::Marker("FREE".to_string()));
    monday.insert("3".to_string(), Slot::Marker("LUNCH BREAK".to_string()));

    let mut grid = BTreeMap::new();
    grid.insert("Monday".to_string(), monday);
    grid
}

/// One solution whose cells name the rank, so tests can tell solutions apart
pub fn sample_solution(rank: i64) -> EngineSolution {
    let subject = format!("Mathematics r{}", rank);
    let periods: BTreeMap<String, String> = [
        ("1", "09:00-09:55"),
        ("2", "09:55-10:50"),
        ("3", "11:05-12:00"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let sections = ["CSE-A", "CSE-B"]
        .into_iter()
        .map(|id| {
            (
                id.to_string(),
                SectionTimetable {
                    section_id: id.to_string(),
                    section_name: id.trim_start_matches("CSE-").to_string(),
                    specialization: String::new(),
                    periods: periods.clone(),
                    timetable: grid(&subject, ("faculty", "Dr. Rao")),
                },
            )
        })
        .collect();

    let faculty = [("F1", "Dr. Rao"), ("F2", "Dr. Iyer"), ("F3", "Prof. Sen")]
        .into_iter()
        .map(|(id, name)| {
            (
                id.to_string(),
                FacultyTimetable {
                    faculty_id: id.to_string(),
                    faculty_name: name.to_string(),
                    department: "CSE".to_string(),
                    periods: periods.clone(),
                    timetable: grid(&subject, ("section", "CSE-A")),
                },
            )
        })
        .collect();

    EngineSolution {
        rank,
        fitness: Some(1000.0 - 10.0 * rank as f64),
        constraint_violations: json!({"faculty_clash": 0, "room_clash": 0}),
        sections,
        faculty,
        statistics: json!({"generations_run": 40, "rank": rank}),
    }
}

pub fn sample_solutions(count: i64) -> Vec<EngineSolution> {
    (1..=count).map(sample_solution).collect()
}

/// Subject in the first Monday slot of a live or candidate grid document
pub fn first_subject(document: &Value) -> Option<String> {
    document["timetable"]["Monday"]["1"]["subject"]
        .as_str()
        .map(str::to_string)
}
