//! Tenant master timetable
//!
//! Every published document of a tenant grouped by course, year and semester.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use timetable_common::partition::normalize_tenant;

use crate::db::live;
use crate::error::{ApiError, ApiResult};
use crate::models::{LiveFacultyTimetable, LiveSectionTimetable};
use crate::AppState;

/// One `(course, year, semester)` group
#[derive(Debug, Serialize)]
pub struct MasterGroup {
    pub course: String,
    pub year: String,
    pub semester: String,
    pub section_count: usize,
    pub faculty_count: usize,
    pub total_entries: usize,
    pub sections: Vec<LiveSectionTimetable>,
    pub faculty: Vec<LiveFacultyTimetable>,
}

/// GET /api/tenants/:tenant/master response
#[derive(Debug, Serialize)]
pub struct MasterTimetable {
    pub tenant_id: String,
    pub total_groups: usize,
    pub total_entries: usize,
    pub groups: Vec<MasterGroup>,
}

type GroupKey = (String, String, String);

/// GET /api/tenants/:tenant/master
pub async fn master_timetable(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Json<MasterTimetable>> {
    let tenant_id = normalize_tenant(&tenant)?;
    let sections = live::list_sections_for_tenant(&state.db, &tenant_id).await?;
    let faculty = live::list_faculty_for_tenant(&state.db, &tenant_id).await?;

    if sections.is_empty() && faculty.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No published timetables for tenant {}",
            tenant_id
        )));
    }

    Ok(Json(group_documents(tenant_id, sections, faculty)))
}

fn group_documents(
    tenant_id: String,
    sections: Vec<LiveSectionTimetable>,
    faculty: Vec<LiveFacultyTimetable>,
) -> MasterTimetable {
    let mut groups: BTreeMap<GroupKey, (Vec<LiveSectionTimetable>, Vec<LiveFacultyTimetable>)> =
        BTreeMap::new();

    for section in sections {
        let key = (
            section.partition.course.clone(),
            section.partition.year.clone(),
            section.partition.semester.clone(),
        );
        groups.entry(key).or_default().0.push(section);
    }
    for member in faculty {
        let key = (
            member.partition.course.clone(),
            member.partition.year.clone(),
            member.partition.semester.clone(),
        );
        groups.entry(key).or_default().1.push(member);
    }

    let groups: Vec<MasterGroup> = groups
        .into_iter()
        .map(|((course, year, semester), (sections, faculty))| MasterGroup {
            course,
            year,
            semester,
            section_count: sections.len(),
            faculty_count: faculty.len(),
            total_entries: sections.len() + faculty.len(),
            sections,
            faculty,
        })
        .collect();

    MasterTimetable {
        tenant_id,
        total_groups: groups.len(),
        total_entries: groups.iter().map(|g| g.total_entries).sum(),
        groups,
    }
}

/// Build master timetable routes
pub fn master_routes() -> Router<AppState> {
    Router::new().route("/api/tenants/:tenant/master", get(master_timetable))
}
