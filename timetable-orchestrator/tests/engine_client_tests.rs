//! Engine gateway tests against a real local HTTP server
//!
//! Each test starts a throwaway axum app on an ephemeral port that plays the
//! optimization engine.

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;

use timetable_orchestrator::models::{EngineRequest, RawConfiguration};
use timetable_orchestrator::services::{assemble, EngineError, HttpEngine, OptimizationEngine};

async fn spawn_engine(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn request() -> EngineRequest {
    assemble(&RawConfiguration::default())
}

fn solution(rank: i64) -> Value {
    json!({
        "rank": rank,
        "fitness": 950.0,
        "constraint_violations": {},
        "sections": {
            "CSE-A": {
                "section_name": "A",
                "periods": {"1": "09:00-09:55"},
                "timetable": {"Monday": {"1": {"subject": "Maths", "faculty": "Dr. Rao", "room": "R101", "type": "Theory"}}}
            }
        },
        "faculty": {
            "F1": {
                "faculty_name": "Dr. Rao",
                "timetable": {"Monday": {"1": {"subject": "Maths", "section": "CSE-A", "room": "R101", "type": "Theory"}}}
            }
        },
        "statistics": {}
    })
}

#[tokio::test]
async fn test_successful_generation_returns_ranked_solutions() {
    let router = Router::new().route(
        "/api/generate",
        post(|Json(body): Json<Value>| async move {
            if body.get("genetic_algorithm_params").is_none() {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "incomplete"})));
            }
            (StatusCode::OK, Json(json!({"solutions": [solution(2), solution(1)]})))
        }),
    );
    let url = spawn_engine(router).await;
    let engine = HttpEngine::new(&url, 5).unwrap();

    let solutions = engine.generate(&request()).await.unwrap();

    assert_eq!(solutions.len(), 2);
    assert_eq!(solutions[0].rank, 1);
    assert_eq!(solutions[0].sections["CSE-A"].section_id, "CSE-A");
    assert_eq!(solutions[0].faculty["F1"].faculty_name, "Dr. Rao");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "optimizer crashed") }),
    );
    let url = spawn_engine(router).await;
    let engine = HttpEngine::new(&url, 5).unwrap();

    match engine.generate(&request()).await {
        Err(EngineError::Unavailable(msg)) => assert!(msg.contains("500")),
        other => panic!("expected Unavailable, got {:?}", other.map(|s| s.len())),
    }
}

#[tokio::test]
async fn test_slow_engine_times_out() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"solutions": [solution(1)]}))
        }),
    );
    let url = spawn_engine(router).await;
    let engine = HttpEngine::new(&url, 1).unwrap();

    let result = engine.generate(&request()).await;

    assert!(matches!(result, Err(EngineError::Timeout(1))));
}

#[tokio::test]
async fn test_empty_solutions_is_bad_response() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async { Json(json!({"solutions": []})) }),
    );
    let url = spawn_engine(router).await;
    let engine = HttpEngine::new(&url, 5).unwrap();

    let result = engine.generate(&request()).await;

    assert!(matches!(result, Err(EngineError::BadResponse(_))));
}

#[tokio::test]
async fn test_solution_without_sections_is_bad_response() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async {
            let mut broken = solution(1);
            broken.as_object_mut().unwrap().remove("sections");
            Json(json!({"solutions": [broken]}))
        }),
    );
    let url = spawn_engine(router).await;
    let engine = HttpEngine::new(&url, 5).unwrap();

    match engine.generate(&request()).await {
        Err(EngineError::BadResponse(msg)) => assert!(msg.contains("sections")),
        other => panic!("expected BadResponse, got {:?}", other.map(|s| s.len())),
    }
}

#[tokio::test]
async fn test_non_json_body_is_bad_response() {
    let router = Router::new().route("/api/generate", post(|| async { "<html>ok</html>" }));
    let url = spawn_engine(router).await;
    let engine = HttpEngine::new(&url, 5).unwrap();

    let result = engine.generate(&request()).await;

    assert!(matches!(result, Err(EngineError::BadResponse(_))));
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let engine = HttpEngine::new(&format!("http://{}", addr), 5).unwrap();
    let result = engine.generate(&request()).await;

    assert!(matches!(result, Err(EngineError::Unavailable(_))));
}
