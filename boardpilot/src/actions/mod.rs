//! Domain action modules.
//!
//! Every operation follows the same shape: navigate to the expected route,
//! wait for a page readiness marker, locate the control through a fallback
//! chain, synthesize the interaction, wait for the modal/navigation to
//! settle, probe for an error toast, then re-query the DOM to build the
//! result payload. The shared pieces of that shape live here on `Session`;
//! the per-entity flows live in the sibling modules.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::context::{parse_context, PageContext};
use crate::element::Element;
use crate::engine::DomEngine;
use crate::errors::AutomationError;
use crate::events::{simulate_click, simulate_typing, ClickOptions, TypingOptions};
use crate::locator::Locator;
use crate::rest::ProjectDirectory;
use crate::selector::Selector;
use crate::ui_map::UiMap;
use crate::wait::{wait_for, wait_for_modal_close, wait_for_navigation};

/// What a domain flow hands back on success: a human-readable message and an
/// optional structured payload, later folded into the envelope.
pub(crate) type StepOutcome = Result<(String, Option<serde_json::Value>), AutomationError>;

pub mod auth;
pub mod member;
pub mod project;
pub mod sprint;
pub mod task;
pub mod workspace;

/// Shared state for one driver: the engine, the config, and the REST
/// collaborator. Holds no UI state — every operation re-derives its context
/// from the live page.
pub(crate) struct Session {
    pub(crate) engine: Arc<dyn DomEngine>,
    pub(crate) config: DriverConfig,
    pub(crate) directory: Arc<dyn ProjectDirectory>,
}

impl Session {
    pub(crate) fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.engine.clone(), selector.into())
            .with_timeout(self.config.default_timeout)
    }

    pub(crate) fn chain(&self, parts: &[String]) -> Locator {
        self.locator(Selector::from(UiMap::chain(parts).as_str()))
    }

    /// Wait for the first element matching a fallback chain.
    pub(crate) async fn find_first(
        &self,
        parts: &[String],
        what: &str,
    ) -> Result<Element, AutomationError> {
        self.chain(parts).wait(None).await.map_err(|_| {
            AutomationError::ElementNotFound(format!(
                "{what} not found (tried: {})",
                UiMap::chain(parts)
            ))
        })
    }

    /// Immediate lookup against a fallback chain, no waiting.
    pub(crate) async fn try_find(
        &self,
        parts: &[String],
    ) -> Result<Option<Element>, AutomationError> {
        self.chain(parts).find().await
    }

    pub(crate) async fn settle(&self) {
        wait_for(self.config.settle_ms).await;
    }

    pub(crate) async fn current_path(&self) -> Result<String, AutomationError> {
        self.engine.current_path().await
    }

    pub(crate) async fn context(&self) -> Result<PageContext, AutomationError> {
        Ok(parse_context(&self.current_path().await?))
    }

    /// Navigate to `path` unless the current path already contains
    /// `fragment`, then wait for a page readiness marker.
    pub(crate) async fn ensure_route(
        &self,
        path: &str,
        fragment: &str,
        ready_marker: &[String],
    ) -> Result<(), AutomationError> {
        let current = self.current_path().await?;
        if !current.contains(fragment) {
            debug!(from = %current, to = %path, "navigating");
            self.engine.navigate(path).await?;
            wait_for_navigation(&self.engine, fragment, self.config.default_timeout).await?;
        }
        self.find_first(ready_marker, "page readiness marker").await?;
        Ok(())
    }

    /// DOM-presence heuristic for authentication state. Deliberately not an
    /// authoritative token check; isolated here so one can be swapped in.
    pub(crate) async fn is_authenticated(&self) -> Result<bool, AutomationError> {
        Ok(self
            .try_find(&self.config.ui.authenticated_marker)
            .await?
            .is_some())
    }

    /// Probe the known error-toast selectors; if one is visible, hoist its
    /// text content verbatim into the error.
    pub(crate) async fn check_error_toast(&self) -> Result<(), AutomationError> {
        if let Some(toast) = self.try_find(&self.config.ui.error_toast).await? {
            if toast.is_visible().await? {
                let text = toast.text().await?;
                let message = if text.is_empty() {
                    "the page reported an unspecified error".to_string()
                } else {
                    text
                };
                return Err(AutomationError::PageError(message));
            }
        }
        Ok(())
    }

    /// Post-submit toast probe: an error toast fails the step with its text
    /// hoisted verbatim; a success toast's text is returned so the caller
    /// can surface the app's own confirmation.
    pub(crate) async fn check_submit_outcome(&self) -> Result<Option<String>, AutomationError> {
        self.check_error_toast().await?;
        if let Some(toast) = self.try_find(&self.config.ui.success_toast).await? {
            if toast.is_visible().await? {
                let text = toast.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    return Ok(Some(text.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Click a creation button and wait for the modal to appear.
    pub(crate) async fn open_modal(
        &self,
        button_chain: &[String],
        what: &str,
    ) -> Result<Element, AutomationError> {
        let button = self.find_first(button_chain, what).await?;
        simulate_click(&button, ClickOptions::default()).await?;
        let modal = self
            .find_first(&self.config.ui.modal, "creation modal")
            .await?;
        self.settle().await;
        Ok(modal)
    }

    /// Fill a named field inside a modal, preferring the modal-scoped match.
    /// `blur` additionally dispatches a blur to trigger field validation.
    pub(crate) async fn fill_field(
        &self,
        modal: &Element,
        field_chain: &[String],
        value: &str,
        blur: bool,
    ) -> Result<(), AutomationError> {
        let mut field = None;
        for css in field_chain {
            // Text/xpath entries in a field chain would be document-scoped;
            // field chains are CSS-only by construction.
            if let Some(found) = modal.query(css).await? {
                field = Some(found);
                break;
            }
        }
        let field = match field {
            Some(f) => f,
            None => self.find_first(field_chain, "form field").await?,
        };
        simulate_typing(&field, value, TypingOptions { clear_first: true }).await?;
        if blur {
            field.blur().await?;
        }
        self.settle().await;
        Ok(())
    }

    /// Locate the primary submit control for a modal: the form-actions
    /// container's last button first, then an exact/partial text match among
    /// the modal's own buttons (never a global query), then the structural
    /// chain. The click is attempted even if the button reports itself
    /// disabled, since disabled state can lag validation.
    pub(crate) async fn submit_modal(
        &self,
        modal: &Element,
        label: &str,
    ) -> Result<(), AutomationError> {
        let mut submit = None;

        for container_css in &self.config.ui.modal_form_actions {
            if let Some(container) = modal.query(container_css).await? {
                let buttons = container.query_all("button").await?;
                if let Some(last) = buttons.into_iter().last() {
                    submit = Some(last);
                    break;
                }
            }
        }

        if submit.is_none() {
            let buttons = modal.query_all("button").await?;
            let mut partial = None;
            for button in buttons {
                let text = button.text().await?;
                if text.trim().eq_ignore_ascii_case(label) {
                    submit = Some(button);
                    break;
                }
                if partial.is_none() && text.to_lowercase().contains(&label.to_lowercase()) {
                    partial = Some(button);
                }
            }
            if submit.is_none() {
                submit = partial;
            }
        }

        if submit.is_none() {
            for css in ["button[type='submit']", "button.primary", "form button"] {
                if let Some(found) = modal.query(css).await? {
                    submit = Some(found);
                    break;
                }
            }
        }

        let submit = submit.ok_or_else(|| {
            AutomationError::ElementNotFound(format!("`{label}` button not found in modal"))
        })?;

        if !submit.is_enabled().await? {
            warn!(label, "submit button reports disabled; attempting click anyway");
        }
        simulate_click(&submit, ClickOptions::default()).await
    }

    /// Open a simple dropdown and pick one option. Options are scanned
    /// document-wide because menus often render into portals. `by_value`
    /// matches the option's `value`/`data-value` attribute instead of its
    /// visible text.
    pub(crate) async fn select_dropdown_option(
        &self,
        trigger: &Element,
        option_text: &str,
        by_value: bool,
    ) -> Result<(), AutomationError> {
        simulate_click(trigger, ClickOptions::default()).await?;
        self.settle().await;

        for css in &self.config.ui.portal_menu_items {
            let options = self.locator(css.as_str()).all().await?;
            for option in options {
                let matched = if by_value {
                    let value = match option.attribute("value").await? {
                        Some(value) => Some(value),
                        None => option.attribute("data-value").await?,
                    };
                    value.as_deref() == Some(option_text)
                } else {
                    option
                        .text()
                        .await?
                        .trim()
                        .eq_ignore_ascii_case(option_text)
                };
                if matched {
                    simulate_click(&option, ClickOptions::default()).await?;
                    self.settle().await;
                    return Ok(());
                }
            }
        }
        Err(AutomationError::ElementNotFound(format!(
            "option '{option_text}' not found in dropdown"
        )))
    }

    pub(crate) async fn wait_modal_closed(&self) -> Result<(), AutomationError> {
        wait_for_modal_close(
            &self.engine,
            &self.config.ui.modal,
            self.config.default_timeout,
        )
        .await
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.config.default_timeout
    }
}

/// Derive a URL slug the way the host app does: lowercase, alphanumerics
/// kept, runs of anything else collapsed to single hyphens.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Heuristic filter for scraped entity names: single capital letters (and
/// anything equally short) are almost always icon glyphs, not names.
pub(crate) fn looks_like_real_name(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() > 1 && !trimmed.chars().all(|c| !c.is_alphanumeric())
}
