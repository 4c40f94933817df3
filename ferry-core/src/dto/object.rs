//! Object DTOs

use serde::{Deserialize, Serialize};

/// Selection of objects to download from one bucket
///
/// A single key downloads the file itself; several keys are bundled
/// into a zip archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub bucket_name: String,
    pub file_names: Vec<String>,
}

impl DownloadRequest {
    pub fn new(bucket_name: impl Into<String>, file_names: Vec<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            file_names,
        }
    }
}
