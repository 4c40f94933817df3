//! Login DTOs

use serde::{Deserialize, Serialize};

/// Username/password pair checked against the control plane before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginParams {
    pub user: String,
    pub password: String,
}

impl LoginParams {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}
