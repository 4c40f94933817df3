//! Error types for the Ferry client

use std::fmt;

use ferry_core::state::StateError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Ferry client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Object storage call failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stage of bucket removal failed
    #[error("Failed to remove bucket '{bucket}' during {stage}: {source}")]
    BucketRemoval {
        bucket: String,
        stage: RemovalStage,
        #[source]
        source: StorageError,
    },

    /// Building a download archive failed
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Credentials could not be read from the persisted state
    #[error("Failed to load credentials: {0}")]
    State(#[from] StateError),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if the credentials were rejected
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Check if the operator lacks access to the resource
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Check if the API rejected the request body or parameters
    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Errors reported by an object storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backend rejected or failed an operation
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    /// The bucket does not exist
    #[error("bucket '{0}' does not exist")]
    NoSuchBucket(String),

    /// Some objects of a batch removal were not removed
    #[error("{failed} object(s) could not be removed, first '{key}': {message}")]
    PartialRemoval {
        failed: usize,
        key: String,
        message: String,
    },

    /// A presigned URL could not be issued
    #[error("cannot presign request: {0}")]
    Presign(String),
}

impl StorageError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Stages of bucket removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStage {
    /// Listing the objects still in the bucket
    Listing,
    /// Removing the listed objects
    ObjectRemoval,
    /// Removing the emptied bucket
    BucketDeletion,
}

impl fmt::Display for RemovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            RemovalStage::Listing => "object listing",
            RemovalStage::ObjectRemoval => "object removal",
            RemovalStage::BucketDeletion => "bucket deletion",
        };
        f.write_str(stage)
    }
}
