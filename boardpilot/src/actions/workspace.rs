//! Workspace flows: create, delete (typed confirmation), list, search.

use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::actions::{looks_like_real_name, slugify, Session, StepOutcome};
use crate::context::{GLOBAL_ROUTES, WORKSPACE_SUBROUTES};
use crate::element::Element;
use crate::errors::AutomationError;
use crate::events::{simulate_click, simulate_typing, ClickOptions, TypingOptions};

impl Session {
    #[instrument(skip(self, description))]
    pub(crate) async fn create_workspace(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> StepOutcome {
        if name.trim().is_empty() {
            return Err(AutomationError::InvalidArgument(
                "workspace name must not be empty".to_string(),
            ));
        }
        self.ensure_route(
            "/dashboard",
            "/dashboard",
            &self.config.ui.page_ready_dashboard,
        )
        .await?;

        let modal = self
            .open_modal(
                &self.config.ui.create_workspace_button,
                "Create Workspace button",
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
        let mut data = json!({ "name": name, "slug": slug });
        if let Some(confirmation) = confirmation {
            data["confirmation"] = json!(confirmation);
        }
        Ok((format!("Workspace '{name}' created"), Some(data)))
    }

    /// Typed-confirmation deletion. The destructive button stays disabled
    /// until the exact slug is typed; a button that is still disabled after
    /// typing is a distinct failure from the button being missing.
    #[instrument(skip(self))]
    pub(crate) async fn delete_workspace(&self, slug: &str) -> StepOutcome {
        self.ensure_route(
            &format!("/{slug}/settings"),
            &format!("/{slug}/settings"),
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

        // Some variants of the dialog present several delete options; pick
        // the one mentioning the workspace if distinguishable.
        if let Some(option) = self.pick_delete_option(&modal, "workspace").await? {
            simulate_click(&option, ClickOptions::default()).await?;
            self.settle().await;
        }

        let confirm_input = self
            .find_first(&self.config.ui.delete_confirm_input, "confirmation input")
            .await?;
        simulate_typing(&confirm_input, slug, TypingOptions { clear_first: true }).await?;
        self.settle().await;

        let confirm_button = self
            .find_first(
                &self.config.ui.delete_confirm_button,
                "Delete Workspace button",
            )
            .await?;
        if !confirm_button.is_enabled().await? {
            return Err(AutomationError::PreconditionFailed(format!(
                "delete button is still disabled after typing '{slug}' into the confirmation input"
            )));
        }
        simulate_click(&confirm_button, ClickOptions::default()).await?;
        self.wait_modal_closed().await?;
        self.check_error_toast().await?;

        Ok((
            format!("Workspace '{slug}' deleted"),
            Some(json!({ "slug": slug })),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn list_workspaces(&self) -> StepOutcome {
        self.ensure_route(
            "/dashboard",
            "/dashboard",
            &self.config.ui.page_ready_dashboard,
        )
        .await?;
        let workspaces = self.scrape_entity_links(1).await?;
        Ok((
            format!("Found {} workspaces", workspaces.len()),
            Some(json!({ "count": workspaces.len(), "workspaces": workspaces })),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn search_workspaces(&self, query: &str) -> StepOutcome {
        self.ensure_route(
            "/dashboard",
            "/dashboard",
            &self.config.ui.page_ready_dashboard,
        )
        .await?;
        let needle = query.to_lowercase();
        let all = self.scrape_entity_links(1).await?;
        let matches: Vec<_> = all
            .into_iter()
            .filter(|entry| {
                entry
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
                    || entry
                        .get("slug")
                        .and_then(|v| v.as_str())
                        .map(|s| s.contains(&needle))
                        .unwrap_or(false)
            })
            .collect();
        Ok((
            format!("Found {} workspaces matching '{query}'", matches.len()),
            Some(json!({ "count": matches.len(), "workspaces": matches })),
        ))
    }

    pub(crate) async fn pick_delete_option(
        &self,
        modal: &Element,
        entity: &str,
    ) -> Result<Option<Element>, AutomationError> {
        for css in &self.config.ui.delete_option {
            let options = match modal.query_all(css).await {
                Ok(options) => options,
                Err(_) => continue,
            };
            if options.is_empty() {
                continue;
            }
            let mut fallback = None;
            for option in options {
                let text = option.text().await?.to_lowercase();
                if text.contains(entity) {
                    return Ok(Some(option));
                }
                if fallback.is_none() {
                    fallback = Some(option);
                }
            }
            return Ok(fallback);
        }
        Ok(None)
    }

    /// Scrape entity cards/links from the current page. `depth` is the number
    /// of path segments an entity link should have (1 for workspaces, 2 for
    /// projects under a workspace).
    pub(crate) async fn scrape_entity_links(
        &self,
        depth: usize,
    ) -> Result<Vec<serde_json::Value>, AutomationError> {
        let root = match self.engine.query("main", None).await? {
            Some(node) => node,
            None => match self.engine.query("body", None).await? {
                Some(node) => node,
                None => return Ok(Vec::new()),
            },
        };
        let root = Element::new(self.engine.clone(), root);
        let links = root.query_all("a[href^='/']").await?;

        let mut seen = std::collections::HashSet::new();
        let mut entities = Vec::new();
        for link in links {
            let Some(href) = link.attribute("href").await? else {
                continue;
            };
            let path = href.split(['?', '#']).next().unwrap_or("");
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            if segments.len() != depth {
                continue;
            }
            // Navigation chrome, not an entity: a global route in first
            // position, or a workspace sub-page past the slug.
            if GLOBAL_ROUTES.contains(&segments[0]) {
                continue;
            }
            if segments.iter().skip(1).any(|s| WORKSPACE_SUBROUTES.contains(s)) {
                continue;
            }
            let slug = segments[depth - 1].to_string();
            if !seen.insert(slug.clone()) {
                continue;
            }

            let name = self.extract_entity_text(&link, &self.config.ui.entity_name).await?;
            let name = match name {
                Some(name) => name,
                None => {
                    let text = link.text().await?;
                    if looks_like_real_name(&text) {
                        text.trim().to_string()
                    } else {
                        debug!(%slug, "link text looks like an icon glyph, using slug");
                        slug.clone()
                    }
                }
            };
            let description = self
                .extract_entity_text(&link, &self.config.ui.entity_description)
                .await?;

            let mut entry = json!({ "slug": slug, "name": name });
            if let Some(description) = description {
                entry["description"] = json!(description);
            }
            entities.push(entry);
        }

        if entities.is_empty() {
            warn!(depth, "no entity links matched; the page may still be loading");
        }
        Ok(entities)
    }

    /// First non-glyph text produced by a cascade of selectors scoped to one
    /// entity card.
    pub(crate) async fn extract_entity_text(
        &self,
        card: &Element,
        cascade: &[String],
    ) -> Result<Option<String>, AutomationError> {
        for css in cascade {
            if let Ok(Some(node)) = card.query(css).await {
                let text = node.text().await?;
                if looks_like_real_name(&text) {
                    return Ok(Some(text.trim().to_string()));
                }
            }
        }
        Ok(None)
    }
}
