//! Login check and system information

use ferry_core::domain::system::SystemInfo;
use ferry_core::dto::login::LoginParams;
use reqwest::Method;
use tracing::debug;

use crate::ConsoleClient;
use crate::error::Result;

impl ConsoleClient {
    // =============================================================================
    // System
    // =============================================================================

    /// Check a username/password pair against the control plane
    ///
    /// Uses `params` instead of the client's own credentials, so a login can
    /// be verified before anything is persisted.
    ///
    /// # Returns
    /// The HTTP status of `GET /system/info`, for success and error statuses
    /// alike. Only a transport failure is an error.
    pub async fn check_login(&self, params: &LoginParams) -> Result<u16> {
        let url = self.endpoint(&["system", "info"])?;
        let response = self
            .client
            .get(url)
            .basic_auth(&params.user, Some(&params.password))
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!("Login check for {} returned {}", params.user, status);
        Ok(status)
    }

    /// Get version and backend information of the deployment
    pub async fn system_info(&self) -> Result<SystemInfo> {
        let url = self.endpoint(&["system", "info"])?;
        let response = self.request(Method::GET, url).send().await?;

        self.handle_response(response).await
    }
}
