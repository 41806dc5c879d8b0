//! Membership flows: invite, list.

use serde_json::json;
use tracing::instrument;

use crate::actions::{looks_like_real_name, Session, StepOutcome};
use crate::engine::SyntheticEvent;
use crate::errors::AutomationError;
use crate::events::{simulate_click, simulate_typing, ClickOptions, TypingOptions};

const INVITER_ROLES: [&str; 2] = ["admin", "owner"];

impl Session {
    /// Invite a member to a workspace. Requires the invite affordance to be
    /// present, which the host app only renders for admin/owner roles; a
    /// missing button with a visible members page is reported as a privilege
    /// failure rather than a not-found.
    #[instrument(skip(self))]
    pub(crate) async fn invite_member(
        &self,
        workspace_slug: &str,
        email: &str,
        role: &str,
    ) -> StepOutcome {
        if !email.contains('@') {
            return Err(AutomationError::InvalidArgument(format!(
                "'{email}' is not a valid email address"
            )));
        }
        let role = role.trim().to_lowercase();

        self.ensure_route(
            &format!("/{workspace_slug}/members"),
            &format!("/{workspace_slug}/members"),
            &self.config.ui.page_ready_workspace,
        )
        .await?;

        let button = match self.try_find(&self.config.ui.invite_member_button).await? {
            Some(button) => button,
            None => {
                return Err(AutomationError::PreconditionFailed(format!(
                    "invite affordance not present; the current user likely lacks an inviter role ({})",
                    INVITER_ROLES.join("/")
                )))
            }
        };
        if !button.is_enabled().await? {
            return Err(AutomationError::PreconditionFailed(
                "invite button is disabled for the current user".to_string(),
            ));
        }

        simulate_click(&button, ClickOptions::default()).await?;
        let modal = self.find_first(&self.config.ui.modal, "invite modal").await?;
        self.settle().await;

        self.fill_field(&modal, &self.config.ui.email_input, email, true)
            .await?;

        // Role pickers vary; try a select first, then a text input, then a
        // custom combobox with portal-rendered options.
        if let Some(select) = modal.query("select[name='role']").await? {
            select.set_native_value(&role).await?;
            select.dispatch(&SyntheticEvent::Change).await?;
        } else if let Some(input) = modal.query("input[name='role']").await? {
            simulate_typing(&input, &role, TypingOptions { clear_first: true }).await?;
        } else {
            let picker = match modal.query("[role='combobox']").await? {
                Some(picker) => Some(picker),
                None => modal.query(".role-select").await?,
            };
            if let Some(picker) = picker {
                self.select_dropdown_option(&picker, &role, false).await?;
            }
        }

        self.submit_modal(&modal, "Invite").await?;
        self.wait_modal_closed().await?;
        self.check_error_toast().await?;

        Ok((
            format!("Invitation sent to {email} as {role}"),
            Some(json!({
                "email": email,
                "role": role,
                "workspace_slug": workspace_slug,
            })),
        ))
    }

    #[instrument(skip(self))]
    pub(crate) async fn list_members(&self, workspace_slug: &str) -> StepOutcome {
        self.ensure_route(
            &format!("/{workspace_slug}/members"),
            &format!("/{workspace_slug}/members"),
            &self.config.ui.page_ready_workspace,
        )
        .await?;

        let mut members = Vec::new();
        for css in ["[data-testid='member-row']", ".member-list li", "table.members tbody tr"] {
            let rows = self.locator(css).all().await?;
            if rows.is_empty() {
                continue;
            }
            for row in rows {
                let name = self
                    .extract_entity_text(&row, &self.config.ui.entity_name)
                    .await?;
                let text = row.text().await?;
                let email = text
                    .split_whitespace()
                    .find(|token| token.contains('@'))
                    .map(str::to_string);
                let name = name.or_else(|| {
                    let trimmed = text.trim();
                    looks_like_real_name(trimmed).then(|| trimmed.to_string())
                });
                let mut entry = json!({});
                if let Some(name) = name {
                    entry["name"] = json!(name);
                }
                if let Some(email) = email {
                    entry["email"] = json!(email);
                }
                members.push(entry);
            }
            break;
        }

        Ok((
            format!(
                "Found {} members in workspace '{workspace_slug}'",
                members.len()
            ),
            Some(json!({ "count": members.len(), "members": members })),
        ))
    }
}
