//! Job domain types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status and timestamps of a single job run by a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// One page of the jobs belonging to a service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobList {
    /// Job name -> job info
    #[serde(default)]
    pub jobs: BTreeMap<String, JobInfo>,
    /// Continuation token for the next page, empty on the last page
    #[serde(default)]
    pub next_page: String,
    #[serde(default, rename = "remaining_jobs")]
    pub remaining: Option<i64>,
}

impl JobList {
    /// Whether another page can be requested
    pub fn has_more(&self) -> bool {
        !self.next_page.is_empty()
    }
}
