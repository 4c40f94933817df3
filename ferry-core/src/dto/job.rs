//! Job DTOs

use serde::{Deserialize, Serialize};

/// Addresses one job of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub service_name: String,
    pub job_name: String,
}

impl JobRef {
    pub fn new(service_name: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            job_name: job_name.into(),
        }
    }
}
