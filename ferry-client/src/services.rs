//! Service management endpoints

use ferry_core::domain::service::Service;
use reqwest::Method;
use tracing::debug;

use crate::error::Result;
use crate::{ConsoleClient, require};

impl ConsoleClient {
    // =============================================================================
    // Service Management
    // =============================================================================

    /// List all services
    pub async fn list_services(&self) -> Result<Vec<Service>> {
        let url = self.endpoint(&["system", "services"])?;
        let response = self.request(Method::GET, url).send().await?;

        self.handle_response(response).await
    }

    /// Get a service by name
    pub async fn get_service(&self, name: &str) -> Result<Service> {
        require("service name", name)?;
        let url = self.endpoint(&["system", "services", name])?;
        let response = self.request(Method::GET, url).send().await?;

        self.handle_response(response).await
    }

    /// Create a new service
    pub async fn create_service(&self, service: &Service) -> Result<()> {
        require("service name", &service.name)?;
        let url = self.endpoint(&["system", "services"])?;
        let response = self.request(Method::POST, url).json(service).send().await?;

        self.handle_empty_response(response).await?;
        debug!("Created service {}", service.name);
        Ok(())
    }

    /// Replace the definition of an existing service
    pub async fn edit_service(&self, service: &Service) -> Result<()> {
        require("service name", &service.name)?;
        let url = self.endpoint(&["system", "services"])?;
        let response = self.request(Method::PUT, url).json(service).send().await?;

        self.handle_empty_response(response).await?;
        debug!("Updated service {}", service.name);
        Ok(())
    }

    /// Delete a service
    pub async fn delete_service(&self, name: &str) -> Result<()> {
        require("service name", name)?;
        let url = self.endpoint(&["system", "services", name])?;
        let response = self.request(Method::DELETE, url).send().await?;

        self.handle_empty_response(response).await?;
        debug!("Deleted service {}", name);
        Ok(())
    }
}
