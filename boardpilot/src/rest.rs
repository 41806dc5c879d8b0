//! REST collaborator endpoints.
//!
//! Almost everything in this crate scrapes the live DOM, but no DOM
//! affordance exposes internal status identifiers, so `filter_tasks_by_status`
//! resolves them through two listing endpoints. The endpoints are consumed as
//! black boxes behind a trait so tests can substitute a fake directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AutomationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub name: String,
}

/// Lookup surface for identifiers the DOM never shows.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Projects belonging to an organization/workspace.
    async fn list_projects(&self, org_id: &str) -> Result<Vec<ProjectRecord>, AutomationError>;

    /// Workflow statuses defined for a project.
    async fn list_statuses(&self, project_id: &str)
        -> Result<Vec<StatusRecord>, AutomationError>;
}

/// HTTP implementation against the host app's API.
pub struct RestDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl RestDirectory {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, AutomationError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AutomationError::ApiError(format!("GET {url} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AutomationError::ApiError(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AutomationError::ApiError(format!("GET {url} decode failed: {e}")))
    }
}

#[async_trait]
impl ProjectDirectory for RestDirectory {
    async fn list_projects(&self, org_id: &str) -> Result<Vec<ProjectRecord>, AutomationError> {
        self.get_json(&format!("/api/organizations/{org_id}/projects"))
            .await
    }

    async fn list_statuses(
        &self,
        project_id: &str,
    ) -> Result<Vec<StatusRecord>, AutomationError> {
        self.get_json(&format!("/api/projects/{project_id}/statuses"))
            .await
    }
}
