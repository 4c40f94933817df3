//! Object storage domain types

use serde::{Deserialize, Serialize};

/// A storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// An object stored in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Full object key
    pub name: String,
    pub size: u64,
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
    pub etag: Option<String>,
}

impl ObjectInfo {
    /// Last path segment of the key, used as the file name on download
    pub fn file_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Returns the part of an object key after its last `/`
pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("in/2024/photo.png"), "photo.png");
        assert_eq!(base_name("photo.png"), "photo.png");
        assert_eq!(base_name("dir/"), "");
    }
}
