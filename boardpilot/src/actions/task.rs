//! Task flows: create, status update through a portal-rendered dropdown,
//! delete, search, and status filtering via the REST collaborator.

use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::actions::{Session, StepOutcome};
use crate::element::Element;
use crate::engine::{KeyModifiers, SyntheticEvent};
use crate::errors::AutomationError;
use crate::events::{simulate_click, simulate_key_press, ClickOptions};
use crate::wait::wait_for;

/// Dropdown-opening attempts before giving up. Each attempt escalates the
/// stimulus (click, then raw mousedown/mouseup, then focus + Enter).
const DROPDOWN_ATTEMPTS: u32 = 3;

impl Session {
    #[instrument(skip(self, description))]
    pub(crate) async fn create_task(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        title: &str,
        description: Option<&str>,
    ) -> StepOutcome {
        if title.trim().is_empty() {
            return Err(AutomationError::InvalidArgument(
                "task title must not be empty".to_string(),
            ));
        }
        self.ensure_board(workspace_slug, project_slug).await?;

        let modal = self
            .open_modal(&self.config.ui.create_task_button, "Create Task button")
            .await?;
        self.fill_field(&modal, &self.config.ui.title_input, title, true)
            .await?;
        if let Some(description) = description {
            self.fill_field(&modal, &self.config.ui.description_input, description, false)
                .await?;
        }
        self.submit_modal(&modal, "Create").await?;
        self.wait_modal_closed().await?;
        let confirmation = self.check_submit_outcome().await?;

        let mut data = json!({
            "title": title,
            "workspace_slug": workspace_slug,
            "project_slug": project_slug,
        });
        if let Some(confirmation) = confirmation {
            data["confirmation"] = json!(confirmation);
        }
        Ok((
            format!("Task '{title}' created in '{workspace_slug}/{project_slug}'"),
            Some(data),
        ))
    }

    /// Move a task to another status column through its detail panel. The
    /// status menu may render into a portal detached from the panel subtree,
    /// and some implementations mount a single placeholder item before the
    /// real options arrive, so opening is retried until more than one option
    /// is observed.
    #[instrument(skip(self))]
    pub(crate) async fn update_task_status(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        task_title: &str,
        new_status: &str,
    ) -> StepOutcome {
        let status = self.resolve_status_label(new_status)?;
        self.ensure_board(workspace_slug, project_slug).await?;

        let card = self.find_task_card(task_title).await?;
        simulate_click(&card, ClickOptions::default()).await?;
        self.find_first(&self.config.ui.task_detail_panel, "task detail panel")
            .await?;
        self.settle().await;

        let trigger = self
            .find_first(&self.config.ui.status_dropdown_trigger, "status dropdown")
            .await?;
        let options = self.open_portal_dropdown(&trigger).await?;

        let mut chosen = None;
        for option in &options {
            let text = option.text().await?;
            if text.trim().eq_ignore_ascii_case(&status) {
                chosen = Some(option);
                break;
            }
        }
        let Some(chosen) = chosen else {
            let mut labels = Vec::with_capacity(options.len());
            for option in &options {
                labels.push(option.text().await?.trim().to_string());
            }
            return Err(AutomationError::ElementNotFound(format!(
                "status option '{status}' not found in dropdown (saw: {})",
                labels.join(", ")
            )));
        };
        simulate_click(chosen, ClickOptions::default()).await?;
        self.settle().await;
        self.check_error_toast().await?;

        Ok((
            format!("Task '{task_title}' moved to '{status}'"),
            Some(json!({ "title": task_title, "status": status })),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn delete_task(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        task_title: &str,
    ) -> StepOutcome {
        self.ensure_board(workspace_slug, project_slug).await?;

        let card = self.find_task_card(task_title).await?;
        simulate_click(&card, ClickOptions::default()).await?;
        let panel = self
            .find_first(&self.config.ui.task_detail_panel, "task detail panel")
            .await?;
        self.settle().await;

        let mut delete_button = None;
        for css in ["[data-testid='delete-task']", "button.danger", "button.delete"] {
            if let Some(found) = panel.query(css).await? {
                delete_button = Some(found);
                break;
            }
        }
        let delete_button = match delete_button {
            Some(button) => button,
            None => {
                let buttons = panel.query_all("button").await?;
                let mut by_text = None;
                for button in buttons {
                    if button.text().await?.to_lowercase().contains("delete") {
                        by_text = Some(button);
                        break;
                    }
                }
                by_text.ok_or_else(|| {
                    AutomationError::ElementNotFound(
                        "Delete button not found in task detail panel".to_string(),
                    )
                })?
            }
        };
        simulate_click(&delete_button, ClickOptions::default()).await?;
        self.settle().await;

        // A confirmation dialog may or may not follow.
        if let Some(modal) = self.try_find(&self.config.ui.modal).await? {
            self.submit_modal(&modal, "Delete").await?;
            self.wait_modal_closed().await?;
        }
        self.check_error_toast().await?;

        Ok((
            format!("Task '{task_title}' deleted"),
            Some(json!({ "title": task_title })),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn search_tasks(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        query: &str,
    ) -> StepOutcome {
        self.ensure_board(workspace_slug, project_slug).await?;

        let needle = query.to_lowercase();
        let cards = self.all_task_cards().await?;
        let mut tasks = Vec::new();
        for card in cards {
            let title = match self
                .extract_entity_text(&card, &self.config.ui.entity_name)
                .await?
            {
                Some(title) => title,
                None => card.text().await?.trim().to_string(),
            };
            if !needle.is_empty() && !title.to_lowercase().contains(&needle) {
                continue;
            }
            let mut entry = json!({ "title": title });
            if let Some(description) = self
                .extract_entity_text(&card, &self.config.ui.entity_description)
                .await?
            {
                entry["description"] = json!(description);
            }
            tasks.push(entry);
        }

        Ok((
            format!("Found {} tasks matching '{query}'", tasks.len()),
            Some(json!({ "count": tasks.len(), "tasks": tasks })),
        ))
    }

    /// Resolve a human status name to its internal identifier through the
    /// REST collaborator (no DOM affordance exposes it), then navigate to the
    /// board with the identifier as a query parameter.
    #[instrument(skip(self))]
    pub(crate) async fn filter_tasks_by_status(
        &self,
        org_id: &str,
        project_slug: &str,
        status_name: &str,
    ) -> StepOutcome {
        let projects = self.directory.list_projects(org_id).await?;
        let project = projects
            .iter()
            .find(|p| {
                p.slug.as_deref() == Some(project_slug)
                    || p.name
                        .as_deref()
                        .map(|n| n.eq_ignore_ascii_case(project_slug))
                        .unwrap_or(false)
            })
            .ok_or_else(|| {
                AutomationError::ApiError(format!(
                    "project '{project_slug}' not found among {} projects of organization '{org_id}'",
                    projects.len()
                ))
            })?;

        let statuses = self.directory.list_statuses(&project.id).await?;
        let status = statuses
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(status_name))
            .ok_or_else(|| {
                AutomationError::ApiError(format!(
                    "status '{status_name}' not defined for project '{project_slug}' (available: {})",
                    statuses
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;

        let target = format!("/{org_id}/{project_slug}?status={}", status.id);
        self.engine.navigate(&target).await?;
        self.find_first(&self.config.ui.page_ready_project, "board").await?;

        Ok((
            format!("Board filtered to status '{}'", status.name),
            Some(json!({
                "status_id": status.id,
                "status_name": status.name,
                "project_id": project.id,
            })),
        ))
    }

    async fn ensure_board(
        &self,
        workspace_slug: &str,
        project_slug: &str,
    ) -> Result<(), AutomationError> {
        self.ensure_route(
            &format!("/{workspace_slug}/{project_slug}"),
            &format!("/{workspace_slug}/{project_slug}"),
            &self.config.ui.page_ready_project,
        )
        .await
    }

    async fn all_task_cards(&self) -> Result<Vec<Element>, AutomationError> {
        for css in &self.config.ui.task_card {
            let cards = self.locator(css.as_str()).all().await?;
            if !cards.is_empty() {
                return Ok(cards);
            }
        }
        Ok(Vec::new())
    }

    async fn find_task_card(&self, title: &str) -> Result<Element, AutomationError> {
        let needle = title.to_lowercase();
        for card in self.all_task_cards().await? {
            if card.text().await?.to_lowercase().contains(&needle) {
                return Ok(card);
            }
        }
        Err(AutomationError::ElementNotFound(format!(
            "task card titled '{title}' not found on the board"
        )))
    }

    /// Case-insensitive match against the configured status whitelist,
    /// normalizing to the canonical casing.
    fn resolve_status_label(&self, requested: &str) -> Result<String, AutomationError> {
        self.config
            .status_labels
            .iter()
            .find(|label| label.eq_ignore_ascii_case(requested.trim()))
            .cloned()
            .ok_or_else(|| {
                AutomationError::InvalidArgument(format!(
                    "unrecognized status '{requested}' (configured: {})",
                    self.config.status_labels.join(", ")
                ))
            })
    }

    /// Open a dropdown whose menu renders into a portal. Each attempt
    /// escalates the stimulus, then re-scans the whole document with every
    /// known menu-item strategy. An attempt only counts as open once more
    /// than one option is present, because a lone item is usually a
    /// placeholder mounted before population.
    async fn open_portal_dropdown(
        &self,
        trigger: &Element,
    ) -> Result<Vec<Element>, AutomationError> {
        for attempt in 0..DROPDOWN_ATTEMPTS {
            match attempt {
                0 => simulate_click(trigger, ClickOptions::default()).await?,
                1 => {
                    let (x, y, w, h) = trigger.bounds().await?;
                    let (cx, cy) = (x + w / 2.0, y + h / 2.0);
                    trigger
                        .dispatch(&SyntheticEvent::MouseDown { x: cx, y: cy })
                        .await?;
                    trigger
                        .dispatch(&SyntheticEvent::MouseUp { x: cx, y: cy })
                        .await?;
                }
                _ => {
                    trigger.focus().await?;
                    simulate_key_press(trigger, "Enter", KeyModifiers::default()).await?;
                }
            }
            wait_for(self.config.settle_ms).await;

            for strategy in &self.config.ui.portal_menu_items {
                let options = self.locator(strategy.as_str()).all().await?;
                if options.len() > 1 {
                    debug!(attempt, strategy = %strategy, count = options.len(), "dropdown open");
                    return Ok(options);
                }
                if options.len() == 1 {
                    debug!(attempt, strategy = %strategy, "single option, likely a placeholder");
                }
            }
            warn!(attempt, "dropdown did not populate, escalating stimulus");
        }
        Err(AutomationError::ElementNotFound(format!(
            "status dropdown did not populate after {DROPDOWN_ATTEMPTS} attempts"
        )))
    }
}
