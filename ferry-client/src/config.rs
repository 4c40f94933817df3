//! Client configuration
//!
//! Connection settings shared by every call the facade makes: where the
//! control plane lives, how long a request may take and whether TLS
//! certificates are verified.

use std::time::Duration;

use reqwest::Client;

use crate::error::{ClientError, Result};

/// Region used for request signing when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Facade configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Control-plane base URL (e.g., "https://oscar.example.org")
    pub api_url: String,

    /// Accept any TLS certificate on the control plane and on presigned
    /// transfers. Off unless explicitly requested.
    pub insecure_skip_tls_verify: bool,

    /// Region the storage client signs requests for
    pub region: String,

    /// Deadline for control-plane requests. Presigned transfers only use it
    /// to bound connecting and each read, never the whole body.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with defaults
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            insecure_skip_tls_verify: false,
            region: DEFAULT_REGION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - FERRY_API_URL (required)
    /// - FERRY_INSECURE_TLS (optional, "true"/"1" to disable verification)
    /// - FERRY_S3_REGION (optional, default: us-east-1)
    /// - FERRY_HTTP_TIMEOUT (optional, seconds, default: 30)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("FERRY_API_URL").ok_or_else(|| {
            ClientError::InvalidConfig("FERRY_API_URL environment variable not set".to_string())
        })?;

        let insecure_skip_tls_verify = lookup("FERRY_INSECURE_TLS")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let region = lookup("FERRY_S3_REGION")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let timeout = lookup("FERRY_HTTP_TIMEOUT")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            api_url,
            insecure_skip_tls_verify,
            region,
            timeout,
        })
    }

    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_skip_tls_verify = insecure;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(ClientError::InvalidConfig("api_url cannot be empty".to_string()));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(
                "api_url must start with http:// or https://".to_string(),
            ));
        }

        if self.region.trim().is_empty() {
            return Err(ClientError::InvalidConfig("region cannot be empty".to_string()));
        }

        if self.timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the HTTP client used for control-plane calls
    pub fn http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure_skip_tls_verify)
            .build()?;
        Ok(client)
    }

    /// Builds the HTTP client used for presigned uploads and downloads
    ///
    /// Object bodies can take far longer than any control-plane call, so
    /// there is no total deadline. A stalled connection still fails after
    /// `timeout` without progress.
    pub fn transfer_client(&self) -> Result<Client> {
        let client = Client::builder()
            .connect_timeout(self.timeout)
            .read_timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure_skip_tls_verify)
            .build()?;
        Ok(client)
    }
}
