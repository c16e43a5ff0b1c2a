//! Optimization engine gateway
//!
//! Submits an assembled [`EngineRequest`] to the external optimizer and returns
//! its ranked solutions, or fails explicitly. No retries: every engine call is
//! an expensive optimization run, so replaying is the caller's decision.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use thiserror::Error;

use crate::models::{EngineRequest, EngineSolution, FacultyTimetable, SectionTimetable};

const GENERATE_PATH: &str = "/api/generate";
const USER_AGENT: &str = concat!("timetable-orchestrator/", env!("CARGO_PKG_VERSION"));

/// Engine gateway errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Connection failure or non-2xx status
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// No answer within the configured timeout (seconds)
    #[error("Engine did not answer within {0}s")]
    Timeout(u64),

    /// Answer was not a usable set of solutions
    #[error("Bad engine response: {0}")]
    BadResponse(String),
}

/// Synchronous request/response boundary to the optimizer
#[async_trait]
pub trait OptimizationEngine: Send + Sync {
    /// Run one optimization and return its solutions ordered by rank
    async fn generate(&self, request: &EngineRequest) -> Result<Vec<EngineSolution>, EngineError>;
}

/// HTTP client for the optimization engine
pub struct HttpEngine {
    http_client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpEngine {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &EngineRequest) -> Result<Value, EngineError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Unavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&error_text, 200)
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(self.timeout_secs)
            } else {
                EngineError::BadResponse(format!("body is not JSON: {}", e))
            }
        })
    }

    fn classify(&self, err: reqwest::Error) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout(self.timeout_secs)
        } else {
            EngineError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl OptimizationEngine for HttpEngine {
    async fn generate(&self, request: &EngineRequest) -> Result<Vec<EngineSolution>, EngineError> {
        tracing::info!(
            endpoint = %self.endpoint,
            timeout_secs = self.timeout_secs,
            sections = request.departments.iter().map(|d| d.sections.len()).sum::<usize>(),
            faculty = request.faculty.len(),
            "Submitting optimization request"
        );

        // The client timeout covers the transfer; this one also covers body decoding
        let deadline = Duration::from_secs(self.timeout_secs);
        let body = match tokio::time::timeout(deadline, self.post(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::Timeout(self.timeout_secs)),
        };

        let solutions = parse_solutions(body)?;

        tracing::info!(
            solutions = solutions.len(),
            best_fitness = ?solutions.first().and_then(|s| s.fitness),
            "Optimization engine returned solutions"
        );

        Ok(solutions)
    }
}

/// Validate an engine response body and extract its solutions, sorted by rank
///
/// A solution without `rank` takes its 1-based position. The map key is
/// authoritative for a timetable's `section_id` / `faculty_id`.
pub fn parse_solutions(body: Value) -> Result<Vec<EngineSolution>, EngineError> {
    let raw_solutions = match body {
        Value::Object(mut map) => match map.remove("solutions") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            Some(Value::Array(_)) => {
                return Err(EngineError::BadResponse("solutions list is empty".into()))
            }
            Some(_) => return Err(EngineError::BadResponse("solutions is not a list".into())),
            None => return Err(EngineError::BadResponse("solutions missing".into())),
        },
        _ => return Err(EngineError::BadResponse("response is not an object".into())),
    };

    let solutions = raw_solutions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| parse_solution(index, raw))
        .collect::<Result<Vec<_>, EngineError>>()?;

    order_by_rank(solutions)
}

/// Sort solutions by rank, requiring the ranks to be exactly `1..=N`
///
/// Applied to every engine answer before it becomes a candidate batch.
pub fn order_by_rank(mut solutions: Vec<EngineSolution>) -> Result<Vec<EngineSolution>, EngineError> {
    if solutions.is_empty() {
        return Err(EngineError::BadResponse("solutions list is empty".into()));
    }

    let mut seen_ranks = HashSet::new();
    if let Some(duplicate) = solutions.iter().find(|s| !seen_ranks.insert(s.rank)) {
        return Err(EngineError::BadResponse(format!(
            "duplicate rank {}",
            duplicate.rank
        )));
    }

    solutions.sort_by_key(|s| s.rank);

    if let Some((position, gap)) = solutions
        .iter()
        .enumerate()
        .find(|(position, s)| s.rank != *position as i64 + 1)
    {
        return Err(EngineError::BadResponse(format!(
            "ranks are not contiguous: expected rank {} but found {} among {} solutions",
            position + 1,
            gap.rank,
            solutions.len()
        )));
    }

    Ok(solutions)
}

fn parse_solution(index: usize, raw: Value) -> Result<EngineSolution, EngineError> {
    let Value::Object(mut map) = raw else {
        return Err(EngineError::BadResponse(format!(
            "solution {} is not an object",
            index
        )));
    };

    let rank = match map.get("rank") {
        None | Some(Value::Null) => index as i64 + 1,
        Some(value) => value.as_i64().filter(|r| *r >= 1).ok_or_else(|| {
            EngineError::BadResponse(format!("solution {} has invalid rank {}", index, value))
        })?,
    };

    let sections: BTreeMap<String, SectionTimetable> =
        required_map(&mut map, "sections", index)?
            .into_iter()
            .map(|(id, value)| {
                let mut timetable: SectionTimetable = serde_json::from_value(value)
                    .map_err(|e| bad_entry(index, "section", &id, e))?;
                timetable.section_id = id.clone();
                Ok((id, timetable))
            })
            .collect::<Result<_, EngineError>>()?;

    let faculty: BTreeMap<String, FacultyTimetable> = required_map(&mut map, "faculty", index)?
        .into_iter()
        .map(|(id, value)| {
            let mut timetable: FacultyTimetable = serde_json::from_value(value)
                .map_err(|e| bad_entry(index, "faculty", &id, e))?;
            timetable.faculty_id = id.clone();
            Ok((id, timetable))
        })
        .collect::<Result<_, EngineError>>()?;

    Ok(EngineSolution {
        rank,
        fitness: map.get("fitness").and_then(Value::as_f64),
        constraint_violations: map.remove("constraint_violations").unwrap_or_else(|| json!({})),
        sections,
        faculty,
        statistics: map.remove("statistics").unwrap_or_else(|| json!({})),
    })
}

fn required_map(
    solution: &mut serde_json::Map<String, Value>,
    key: &str,
    index: usize,
) -> Result<serde_json::Map<String, Value>, EngineError> {
    match solution.remove(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(EngineError::BadResponse(format!(
            "solution {} field '{}' is not a map",
            index, key
        ))),
        None => Err(EngineError::BadResponse(format!(
            "solution {} lacks '{}'",
            index, key
        ))),
    }
}

fn bad_entry(index: usize, kind: &str, id: &str, err: serde_json::Error) -> EngineError {
    EngineError::BadResponse(format!(
        "solution {} {} '{}' is malformed: {}",
        index, kind, id, err
    ))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Value {
        json!({"Monday": {"1": {"subject": "Maths", "room": "R1", "type": "Lecture"}, "2": "FREE"}})
    }

    fn solution(rank: Value) -> Value {
        json!({
            "rank": rank,
            "fitness": 912.5,
            "constraint_violations": {"faculty_clash": 0},
            "sections": {"CSE-A": {"section_name": "A", "timetable": grid()}},
            "faculty": {"F1": {"faculty_name": "Dr. Rao", "timetable": grid()}},
            "statistics": {"generations_run": 40}
        })
    }

    #[test]
    fn test_solutions_sorted_by_rank() {
        let body = json!({"solutions": [solution(json!(2)), solution(json!(1))]});
        let solutions = parse_solutions(body).unwrap();

        assert_eq!(solutions.len(), 2);
        assert_eq!(solutions[0].rank, 1);
        assert_eq!(solutions[1].rank, 2);
        assert_eq!(solutions[0].fitness, Some(912.5));
    }

    #[test]
    fn test_map_key_becomes_entity_id() {
        let solutions = parse_solutions(json!({"solutions": [solution(json!(1))]})).unwrap();
        assert_eq!(solutions[0].sections["CSE-A"].section_id, "CSE-A");
        assert_eq!(solutions[0].faculty["F1"].faculty_id, "F1");
    }

    #[test]
    fn test_missing_rank_uses_position() {
        let mut first = solution(Value::Null);
        first.as_object_mut().unwrap().remove("rank");
        let body = json!({"solutions": [first, solution(Value::Null)]});

        let ranks: Vec<i64> = parse_solutions(body).unwrap().iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[test]
    fn test_empty_or_missing_solutions_rejected() {
        assert!(matches!(
            parse_solutions(json!({"solutions": []})),
            Err(EngineError::BadResponse(_))
        ));
        assert!(matches!(
            parse_solutions(json!({"status": "done"})),
            Err(EngineError::BadResponse(_))
        ));
        assert!(matches!(
            parse_solutions(json!([1, 2])),
            Err(EngineError::BadResponse(_))
        ));
    }

    #[test]
    fn test_solution_without_faculty_rejected() {
        let mut broken = solution(json!(1));
        broken.as_object_mut().unwrap().remove("faculty");
        let err = parse_solutions(json!({"solutions": [broken]})).unwrap_err();
        assert!(err.to_string().contains("faculty"));
    }

    #[test]
    fn test_duplicate_rank_rejected() {
        let body = json!({"solutions": [solution(json!(1)), solution(json!(1))]});
        assert!(matches!(parse_solutions(body), Err(EngineError::BadResponse(_))));
    }

    #[test]
    fn test_rank_gap_rejected() {
        let body = json!({"solutions": [solution(json!(1)), solution(json!(5)), solution(json!(9))]});
        match parse_solutions(body) {
            Err(EngineError::BadResponse(msg)) => assert!(msg.contains("contiguous")),
            other => panic!("expected BadResponse, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_ranks_not_starting_at_one_rejected() {
        let body = json!({"solutions": [solution(json!(2)), solution(json!(3))]});
        assert!(matches!(parse_solutions(body), Err(EngineError::BadResponse(_))));
    }

    #[test]
    fn test_zero_rank_rejected() {
        let body = json!({"solutions": [solution(json!(0))]});
        assert!(matches!(parse_solutions(body), Err(EngineError::BadResponse(_))));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let engine = HttpEngine::new("http://127.0.0.1:5000/", 5).unwrap();
        assert_eq!(engine.endpoint(), "http://127.0.0.1:5000/api/generate");
    }
}
