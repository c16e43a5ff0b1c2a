//! Partition key: `(tenant, course, year, semester)`
//!
//! Every stored entity (configuration, candidate, live timetable) is scoped by
//! one partition. Components are trimmed and lower-cased so that `"BTech "` and
//! `"btech"` address the same scheduling problem.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Longest accepted component, matching the master-data field limits
const MAX_COMPONENT_LEN: usize = 100;

/// Normalized partition key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey {
    pub tenant_id: String,
    pub course: String,
    pub year: String,
    pub semester: String,
}

impl PartitionKey {
    /// Build a normalized key, rejecting empty or malformed components
    pub fn new(tenant_id: &str, course: &str, year: &str, semester: &str) -> Result<Self> {
        Ok(Self {
            tenant_id: normalize_component("tenant_id", tenant_id)?,
            course: normalize_component("course", course)?,
            year: normalize_component("year", year)?,
            semester: normalize_component("semester", semester)?,
        })
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.tenant_id, self.course, self.year, self.semester
        )
    }
}

/// Normalize a tenant id on its own (tenant-wide queries)
pub fn normalize_tenant(tenant_id: &str) -> Result<String> {
    normalize_component("tenant_id", tenant_id)
}

fn normalize_component(field: &str, raw: &str) -> Result<String> {
    let value = raw.trim().to_lowercase();

    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_COMPONENT_LEN {
        return Err(Error::InvalidInput(format!(
            "{} exceeds {} characters",
            field, MAX_COMPONENT_LEN
        )));
    }
    if value.chars().any(|c| c.is_control() || c == '/') {
        return Err(Error::InvalidInput(format!(
            "{} contains invalid characters",
            field
        )));
    }

    Ok(value)
}
