//! Live timetable read handlers
//!
//! Read-only: live documents change only through approval.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use timetable_common::PartitionKey;
use uuid::Uuid;

use super::{PartitionPath, PARTITION_PREFIX};
use crate::db::live;
use crate::error::{ApiError, ApiResult};
use crate::models::{LiveFacultyTimetable, LiveSectionTimetable};
use crate::AppState;

/// GET .../live response
#[derive(Debug, Serialize)]
pub struct LiveTimetableResponse {
    pub partition: PartitionKey,
    pub candidate_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub sections: Vec<LiveSectionTimetable>,
    pub faculty: Vec<LiveFacultyTimetable>,
}

#[derive(Debug, Deserialize)]
pub struct SectionPath {
    pub tenant: String,
    pub course: String,
    pub year: String,
    pub semester: String,
    pub section_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FacultyPath {
    pub tenant: String,
    pub course: String,
    pub year: String,
    pub semester: String,
    pub faculty_id: String,
}

/// GET .../live
pub async fn get_live(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<LiveTimetableResponse>> {
    let partition = path.key()?;
    let sections = live::list_sections(&state.db, &partition).await?;
    let faculty = live::list_faculty(&state.db, &partition).await?;

    if sections.is_empty() && faculty.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No published timetable for {}",
            partition
        )));
    }

    let (candidate_id, published_at) = sections
        .first()
        .map(|s| (s.candidate_id, s.published_at))
        .or_else(|| faculty.first().map(|f| (f.candidate_id, f.published_at)))
        .unzip();

    Ok(Json(LiveTimetableResponse {
        partition,
        candidate_id,
        published_at,
        sections,
        faculty,
    }))
}

/// GET .../live/sections
pub async fn list_live_sections(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<BTreeMap<String, LiveSectionTimetable>>> {
    let partition = path.key()?;
    let sections = live::list_sections(&state.db, &partition).await?;

    if sections.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No published section timetables for {}",
            partition
        )));
    }

    Ok(Json(
        sections
            .into_iter()
            .map(|s| (s.section_id.clone(), s))
            .collect(),
    ))
}

/// GET .../live/sections/:section_id
pub async fn get_live_section(
    State(state): State<AppState>,
    Path(path): Path<SectionPath>,
) -> ApiResult<Json<LiveSectionTimetable>> {
    let partition = PartitionKey::new(&path.tenant, &path.course, &path.year, &path.semester)?;

    live::get_section(&state.db, &partition, &path.section_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Section timetable {}", path.section_id)))
}

/// GET .../live/faculty
pub async fn list_live_faculty(
    State(state): State<AppState>,
    Path(path): Path<PartitionPath>,
) -> ApiResult<Json<BTreeMap<String, LiveFacultyTimetable>>> {
    let partition = path.key()?;
    let faculty = live::list_faculty(&state.db, &partition).await?;

    if faculty.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No published faculty timetables for {}",
            partition
        )));
    }

    Ok(Json(
        faculty
            .into_iter()
            .map(|f| (f.faculty_id.clone(), f))
            .collect(),
    ))
}

/// GET .../live/faculty/:faculty_id
pub async fn get_live_faculty(
    State(state): State<AppState>,
    Path(path): Path<FacultyPath>,
) -> ApiResult<Json<LiveFacultyTimetable>> {
    let partition = PartitionKey::new(&path.tenant, &path.course, &path.year, &path.semester)?;

    live::get_faculty(&state.db, &partition, &path.faculty_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Faculty timetable {}", path.faculty_id)))
}

/// Build live view routes
pub fn live_routes() -> Router<AppState> {
    Router::new()
        .route(&format!("{}/live", PARTITION_PREFIX), get(get_live))
        .route(
            &format!("{}/live/sections", PARTITION_PREFIX),
            get(list_live_sections),
        )
        .route(
            &format!("{}/live/sections/:section_id", PARTITION_PREFIX),
            get(get_live_section),
        )
        .route(
            &format!("{}/live/faculty", PARTITION_PREFIX),
            get(list_live_faculty),
        )
        .route(
            &format!("{}/live/faculty/:faculty_id", PARTITION_PREFIX),
            get(get_live_faculty),
        )
}
