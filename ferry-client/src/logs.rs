//! Job log endpoints

use ferry_core::domain::job::JobList;
use ferry_core::dto::job::JobRef;
use reqwest::Method;
use tracing::debug;

use crate::error::Result;
use crate::{ConsoleClient, require};

impl ConsoleClient {
    // =============================================================================
    // Job Logs
    // =============================================================================

    /// List the jobs of a service (first page)
    pub async fn list_jobs(&self, service: &str) -> Result<JobList> {
        self.list_jobs_page(service, None).await
    }

    /// List one page of the jobs of a service
    ///
    /// # Arguments
    /// * `service` - The service name
    /// * `page` - Continuation token from a previous [`JobList::next_page`]
    pub async fn list_jobs_page(&self, service: &str, page: Option<&str>) -> Result<JobList> {
        require("service name", service)?;
        let url = self.endpoint(&["system", "logs", service])?;
        let mut request = self.request(Method::GET, url);
        if let Some(page) = page.filter(|p| !p.is_empty()) {
            request = request.query(&[("page", page)]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Get the log output of one job
    pub async fn job_logs(&self, job: &JobRef) -> Result<String> {
        require("service name", &job.service_name)?;
        require("job name", &job.job_name)?;
        let url = self.endpoint(&["system", "logs", &job.service_name, &job.job_name])?;
        let response = self.request(Method::GET, url).send().await?;

        self.handle_text_response(response).await
    }

    /// Delete one job and its logs
    pub async fn delete_job(&self, job: &JobRef) -> Result<()> {
        require("service name", &job.service_name)?;
        require("job name", &job.job_name)?;
        let url = self.endpoint(&["system", "logs", &job.service_name, &job.job_name])?;
        let response = self.request(Method::DELETE, url).send().await?;

        self.handle_empty_response(response).await?;
        debug!("Deleted job {}/{}", job.service_name, job.job_name);
        Ok(())
    }

    /// Delete the jobs of a service
    ///
    /// # Arguments
    /// * `service` - The service name
    /// * `all` - Also delete jobs that have not finished
    pub async fn delete_all_jobs(&self, service: &str, all: bool) -> Result<()> {
        require("service name", service)?;
        let url = self.endpoint(&["system", "logs", service])?;
        let response = self
            .request(Method::DELETE, url)
            .query(&[("all", all)])
            .send()
            .await?;

        self.handle_empty_response(response).await?;
        debug!("Deleted jobs of {} (all: {})", service, all);
        Ok(())
    }
}
