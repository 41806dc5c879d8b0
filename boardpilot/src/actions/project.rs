//! Project flows: create, delete (typed confirmation), list.

use serde_json::json;
use tracing::instrument;

use crate::actions::{slugify, Session, StepOutcome};
use crate::errors::AutomationError;
use crate::events::{simulate_click, simulate_typing, ClickOptions, TypingOptions};

impl Session {
    #[instrument(skip(self, description))]
    pub(crate) async fn create_project(
        &self,
        workspace_slug: &str,
        name: &str,
        description: Option<&str>,
    ) -> StepOutcome {
        if name.trim().is_empty() {
            return Err(AutomationError::InvalidArgument(
                "project name must not be empty".to_string(),
            ));
        }
        self.ensure_route(
            &format!("/{workspace_slug}"),
            &format!("/{workspace_slug}"),
            &self.config.ui.page_ready_workspace,
        )
        .await?;

        let modal = self
            .open_modal(
                &self.config.ui.create_project_button,
                "Create Project button",
            )
            .await?;
        self.fill_field(&modal, &self.config.ui.name_input, name, true)
            .await?;
        if let Some(description) = description {
            self.fill_field(&modal, &self.config.ui.description_input, description, false)
                .await?;
        }
        self.submit_modal(&modal, "Create").await?;
        self.wait_modal_closed().await?;
        let confirmation = self.check_submit_outcome().await?;

        let slug = slugify(name);
        let mut data = json!({
            "name": name,
            "slug": slug,
            "workspace_slug": workspace_slug,
        });
        if let Some(confirmation) = confirmation {
            data["confirmation"] = json!(confirmation);
        }
        Ok((
            format!("Project '{name}' created in workspace '{workspace_slug}'"),
            Some(data),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn delete_project(
        &self,
        workspace_slug: &str,
        project_slug: &str,
    ) -> StepOutcome {
        self.ensure_route(
            &format!("/{workspace_slug}/{project_slug}/settings"),
            &format!("/{workspace_slug}/{project_slug}/settings"),
            &self.config.ui.page_ready_workspace,
        )
        .await?;

        let danger = self
            .find_first(&self.config.ui.danger_zone_button, "danger zone button")
            .await?;
        simulate_click(&danger, ClickOptions::default()).await?;

        let modal = self
            .find_first(&self.config.ui.modal, "delete confirmation dialog")
            .await?;
        self.settle().await;

        if let Some(option) = self.pick_delete_option(&modal, "project").await? {
            simulate_click(&option, ClickOptions::default()).await?;
            self.settle().await;
        }

        let confirm_input = self
            .find_first(&self.config.ui.delete_confirm_input, "confirmation input")
            .await?;
        simulate_typing(
            &confirm_input,
            project_slug,
            TypingOptions { clear_first: true },
        )
        .await?;
        self.settle().await;

        let confirm_button = self
            .find_first(
                &self.config.ui.delete_confirm_button,
                "Delete Project button",
            )
            .await?;
        if !confirm_button.is_enabled().await? {
            return Err(AutomationError::PreconditionFailed(format!(
                "delete button is still disabled after typing '{project_slug}' into the confirmation input"
            )));
        }
        simulate_click(&confirm_button, ClickOptions::default()).await?;
        self.wait_modal_closed().await?;
        self.check_error_toast().await?;

        Ok((
            format!("Project '{project_slug}' deleted"),
            Some(json!({
                "slug": project_slug,
                "workspace_slug": workspace_slug,
            })),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn list_projects(&self, workspace_slug: &str) -> StepOutcome {
        self.ensure_route(
            &format!("/{workspace_slug}"),
            &format!("/{workspace_slug}"),
            &self.config.ui.page_ready_workspace,
        )
        .await?;
        let projects = self.scrape_entity_links(2).await?;
        Ok((
            format!(
                "Found {} projects in workspace '{workspace_slug}'",
                projects.len()
            ),
            Some(json!({ "count": projects.len(), "projects": projects })),
        ))
    }
}
