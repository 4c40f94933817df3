//! Ferry access facade
//!
//! One entry point for everything the console does against a deployment:
//! control-plane REST calls (services, job logs, system info) and object
//! storage operations (buckets, listings, presigned transfers).
//!
//! # Example
//!
//! ```no_run
//! use ferry_client::{ClientConfig, ConsoleClient};
//! use ferry_core::state::{Credentials, FileStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = FileStore::open("state.json")?;
//!     let config = ClientConfig::new("https://oscar.example.org");
//!     let client = ConsoleClient::new(&config, &Credentials::load(&store)?)?;
//!
//!     for service in client.list_services().await? {
//!         println!("{} ({})", service.name, service.image);
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod objects;
pub mod storage;

mod buckets;
mod logs;
mod services;
mod system;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use archive::Archive;
pub use config::ClientConfig;
pub use error::{ClientError, RemovalStage, Result, StorageError};
pub use objects::{Download, DownloadedFile, ObjectListing, RemovalOutcome, RemovalReport, UploadRequest};
pub use storage::{ObjectStorage, PresignMethod, S3Storage};

use std::fmt;
use std::sync::Arc;

use ferry_core::state::{Credentials, StateStore};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Basic-auth pair sent on every control-plane call
#[derive(Clone)]
struct BasicAuth {
    user: String,
    password: String,
}

/// Client for a deployment's control plane and object store
///
/// Cloning is cheap: the HTTP client and the storage backend are shared.
#[derive(Clone)]
pub struct ConsoleClient {
    /// Control-plane base URL (e.g., "https://oscar.example.org")
    base_url: String,
    /// HTTP client for control-plane calls
    client: Client,
    /// HTTP client for presigned transfers
    transfer: Client,
    auth: BasicAuth,
    storage: Arc<dyn ObjectStorage>,
}

impl fmt::Debug for ConsoleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleClient")
            .field("base_url", &self.base_url)
            .field("user", &self.auth.user)
            .finish_non_exhaustive()
    }
}

impl ConsoleClient {
    /// Create a client from configuration and credentials
    ///
    /// # Arguments
    /// * `config` - Control-plane URL, TLS and timeout settings
    /// * `credentials` - Control-plane user and object-store keys
    pub fn new(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        if config.insecure_skip_tls_verify {
            warn!("TLS certificate verification disabled");
        }

        let storage = S3Storage::new(&credentials.storage, config)?;
        Ok(Self::with_parts(
            &config.api_url,
            config.http_client()?,
            &credentials.user,
            &credentials.password,
            Arc::new(storage),
        )
        .with_transfer_client(config.transfer_client()?))
    }

    /// Create a client from the credentials in the persisted state
    pub fn from_state(config: &ClientConfig, store: &dyn StateStore) -> Result<Self> {
        let credentials = Credentials::load(store)?;
        Self::new(config, &credentials)
    }

    /// Create a client from already-built parts
    ///
    /// This allows you to supply a custom HTTP client or storage backend.
    ///
    /// # Arguments
    /// * `base_url` - The control-plane base URL
    /// * `client` - A configured reqwest Client
    /// * `user`, `password` - Basic-auth credentials for the control plane
    /// * `storage` - The object storage backend
    ///
    /// `client` also carries presigned transfers until
    /// [`with_transfer_client`](Self::with_transfer_client) replaces it.
    pub fn with_parts(
        base_url: impl Into<String>,
        client: Client,
        user: impl Into<String>,
        password: impl Into<String>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transfer: client.clone(),
            client,
            auth: BasicAuth {
                user: user.into(),
                password: password.into(),
            },
            storage,
        }
    }

    /// Use a separate HTTP client for presigned uploads and downloads
    pub fn with_transfer_client(mut self, transfer: Client) -> Self {
        self.transfer = transfer;
        self
    }

    /// Get the control-plane base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    /// Builds a control-plane URL, percent-encoding each path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid API URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("API URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts an authenticated control-plane request
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .basic_auth(&self.auth.user, Some(&self.auth.password))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is plain text
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let response = Self::check_status(response).await?;

        response
            .text()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to read response body: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

/// Rejects empty names before any request is made
fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidRequest(format!("{} cannot be empty", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStorage;

    fn client(base_url: &str) -> ConsoleClient {
        ConsoleClient::with_parts(
            base_url,
            Client::new(),
            "admin",
            "secret",
            Arc::new(MemoryStorage::new("http://127.0.0.1:1")),
        )
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        assert_eq!(client("http://localhost:8080/").base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client("http://localhost:8080")
            .endpoint(&["system", "services", "my service/v2"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/system/services/my%20service%2Fv2");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("http://localhost:8080/oscar/")
            .endpoint(&["system", "info"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/oscar/system/info");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let result = client("not a url").endpoint(&["system", "info"]);
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn test_new_validates_config() {
        let credentials = Credentials {
            user: "admin".to_string(),
            password: "secret".to_string(),
            storage: ferry_core::state::StorageCredentials {
                endpoint: "localhost".to_string(),
                port: 9000,
                use_ssl: false,
                access_key: "minio".to_string(),
                secret_key: "minio123".to_string(),
            },
        };

        assert!(ConsoleClient::new(&ClientConfig::new("ftp://x"), &credentials).is_err());
        let client = ConsoleClient::new(&ClientConfig::new("http://localhost:8080"), &credentials).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_from_state_requires_credentials() {
        let store = ferry_core::state::MemoryStore::new();
        let result = ConsoleClient::from_state(&ClientConfig::new("http://localhost:8080"), &store);
        assert!(matches!(result, Err(ClientError::State(_))));
    }

    #[test]
    fn test_require() {
        assert!(require("bucket name", "images").is_ok());
        assert!(matches!(require("bucket name", "  "), Err(ClientError::InvalidRequest(_))));
    }
}
