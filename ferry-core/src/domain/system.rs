//! System information domain types

use serde::{Deserialize, Serialize};

/// Information exposed by the control plane at `/system/info`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default, rename = "kubernetes_version")]
    pub kube_version: String,
    #[serde(default)]
    pub serverless_backend: Option<ServerlessBackendInfo>,
}

/// Name and version of the serverless backend behind the control plane
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerlessBackendInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}
