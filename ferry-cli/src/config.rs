//! Configuration module
//!
//! Resolves where the console keeps its state and how it reaches the
//! control plane.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ferry_client::ClientConfig;
use ferry_core::state::FileStore;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Facade configuration
    pub client: ClientConfig,
    /// Path of the persisted client state
    pub state_file: PathBuf,
}

impl Config {
    /// Validates the facade configuration and resolves the state file
    ///
    /// Falls back to the platform config directory when no state file was
    /// given.
    pub fn new(client: ClientConfig, state_file: Option<PathBuf>) -> Result<Self> {
        client.validate().context("Invalid configuration")?;

        let state_file = match state_file {
            Some(path) => path,
            None => FileStore::default_path()
                .context("Cannot determine a config directory; pass --state-file")?,
        };

        Ok(Self { client, state_file })
    }
}
