//! Generation pipeline tests
//!
//! Request assembly as seen by the engine, and ordering between overlapping
//! generation runs for the same partition.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

use helpers::{
    create_test_app, partition, partition_uri, sample_solution, sample_solutions, Script,
};
use timetable_orchestrator::db::{candidates, partition_state};
use timetable_orchestrator::services::generate;

#[tokio::test]
async fn test_engine_receives_assembled_request() {
    let app = create_test_app().await;
    app.seed_configuration().await;
    app.generate().await;

    let request = app.engine.last_request().unwrap();
    let section = &request.departments[0].sections[0];
    assert_eq!(section.student_count, json!(62));
    assert_eq!(section.semester, json!(1));
    assert_eq!(request.subjects[1].lectures_per_week, json!(3));
    assert_eq!(request.subjects[1].min_classes_per_week, json!(3));
    assert_eq!(request.time_slots.lunch_period, json!(4));
    assert_eq!(request.constraints.hard_constraints.no_room_clash, json!(false));
    assert_eq!(request.constraints.hard_constraints.no_faculty_clash, json!(true));
    assert_eq!(request.genetic_algorithm_params.generations, json!(40));
    assert!(request.labs.is_empty());
}

#[tokio::test]
async fn test_failed_generation_does_not_call_engine_twice() {
    let app = create_test_app().await;
    app.seed_configuration().await;
    app.engine.push(Script::Unavailable);

    let (status, body) = app.post(&partition_uri("generate"), json!({})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["retryable"], true);
    assert_eq!(app.engine.calls(), 1);
}

#[tokio::test]
async fn test_slow_generation_is_superseded_by_newer_one() {
    let app = create_test_app().await;
    app.seed_configuration().await;
    app.engine
        .push_delayed(Duration::from_millis(300), Script::Solutions(sample_solutions(5)));
    app.engine.push(Script::Solutions(sample_solutions(3)));

    let key = partition();
    let slow = generate(&app.pool, app.engine.as_ref(), &app.state.locks, &key);
    let fast = async {
        while app.engine.calls() < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        generate(&app.pool, app.engine.as_ref(), &app.state.locks, &key).await
    };

    let (slow_result, fast_result) = tokio::join!(slow, fast);

    let fast_outcome = fast_result.unwrap();
    assert_eq!(fast_outcome.candidates.len(), 3);

    let err = slow_result.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    // The newer batch survives the late write
    let state = partition_state::load(&app.pool, &partition()).await.unwrap();
    assert_eq!(state.batch_id, Some(fast_outcome.batch_id));
    assert_eq!(state.issued_ticket, 2);
    assert_eq!(state.committed_ticket, 2);
    assert_eq!(candidates::count(&app.pool, &partition()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_regeneration_replaces_whole_batch() {
    let app = create_test_app().await;
    app.seed_configuration().await;
    let first = app.generate().await;

    app.engine.push(Script::Solutions(sample_solutions(2)));
    let second = app.generate().await;

    assert_eq!(second.len(), 2);
    let summaries = candidates::list_summaries(&app.pool, &partition())
        .await
        .unwrap();
    assert_eq!(summaries.len(), 2);
    assert!(summaries
        .iter()
        .all(|c| c.batch_id.to_string() == second[0]["batch_id"].as_str().unwrap()));
    assert!(first
        .iter()
        .all(|old| summaries
            .iter()
            .all(|c| c.candidate_id.to_string() != old["candidate_id"].as_str().unwrap())));
}

#[tokio::test]
async fn test_ranks_with_gaps_are_rejected_and_keep_prior_batch() {
    let app = create_test_app().await;
    app.seed_configuration().await;
    let first = app.generate().await;

    app.engine.push(Script::Solutions(vec![
        sample_solution(1),
        sample_solution(5),
        sample_solution(9),
    ]));
    let (status, body) = app.post(&partition_uri("generate"), json!({})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "ENGINE_BAD_RESPONSE");

    let summaries = candidates::list_summaries(&app.pool, &partition())
        .await
        .unwrap();
    let ranks: Vec<i64> = summaries.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(
        summaries[0].candidate_id.to_string(),
        first[0]["candidate_id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn test_unordered_ranks_are_stored_in_rank_order() {
    let app = create_test_app().await;
    app.seed_configuration().await;
    app.engine.push(Script::Solutions(vec![
        sample_solution(3),
        sample_solution(1),
        sample_solution(2),
    ]));

    let batch = app.generate().await;

    let ranks: Vec<i64> = batch.iter().map(|c| c["rank"].as_i64().unwrap()).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}
