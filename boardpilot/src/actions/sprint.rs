//! Sprint flows.

use serde_json::json;
use tracing::instrument;

use crate::actions::{Session, StepOutcome};
use crate::errors::AutomationError;

impl Session {
    #[instrument(skip(self, goal))]
    pub(crate) async fn create_sprint(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        name: &str,
        goal: Option<&str>,
    ) -> StepOutcome {
        if name.trim().is_empty() {
            return Err(AutomationError::InvalidArgument(
                "sprint name must not be empty".to_string(),
            ));
        }
        self.ensure_route(
            &format!("/{workspace_slug}/{project_slug}"),
            &format!("/{workspace_slug}/{project_slug}"),
            &self.config.ui.page_ready_project,
        )
        .await?;

        let modal = self
            .open_modal(&self.config.ui.create_sprint_button, "Create Sprint button")
            .await?;
        self.fill_field(&modal, &self.config.ui.name_input, name, true)
            .await?;
        if let Some(goal) = goal {
            self.fill_field(&modal, &self.config.ui.description_input, goal, false)
                .await?;
        }
        self.submit_modal(&modal, "Create").await?;
        self.wait_modal_closed().await?;
        let confirmation = self.check_submit_outcome().await?;

        let mut data = json!({
            "name": name,
            "workspace_slug": workspace_slug,
            "project_slug": project_slug,
        });
        if let Some(confirmation) = confirmation {
            data["confirmation"] = json!(confirmation);
        }
        Ok((
            format!("Sprint '{name}' created in '{workspace_slug}/{project_slug}'"),
            Some(data),
        ))
    }
}
