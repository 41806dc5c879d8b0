//! Authentication flows: login, logout, register.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument};

use crate::actions::{Session, StepOutcome};
use crate::errors::AutomationError;
use crate::events::{simulate_click, simulate_typing, ClickOptions, TypingOptions};
use crate::locator::POLL_INTERVAL;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub accept_terms: bool,
}

impl Session {
    /// Log in with email/password. Three redirect outcomes count as success:
    /// the dashboard, the organization picker, or any path away from /login.
    /// Still sitting on /login after the deadline is a hard failure.
    #[instrument(skip(self, password))]
    pub(crate) async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> StepOutcome {
        self.ensure_route("/login", "/login", &self.config.ui.login_email)
            .await
            .map_err(|_| {
                AutomationError::ElementNotFound("Login form inputs not found".to_string())
            })?;

        let email_input = self
            .find_first(&self.config.ui.login_email, "email input")
            .await?;
        let password_input = self
            .find_first(&self.config.ui.login_password, "password input")
            .await?;

        simulate_typing(&email_input, email, TypingOptions { clear_first: true }).await?;
        simulate_typing(&password_input, password, TypingOptions { clear_first: true }).await?;

        // Only toggle the checkbox when it isn't already in the asked state.
        if remember_me {
            if let Some(checkbox) = self.try_find(&self.config.ui.login_remember_me).await? {
                if !checkbox.is_checked().await? {
                    simulate_click(&checkbox, ClickOptions::default()).await?;
                }
            }
        }

        let submit = self
            .find_first(&self.config.ui.login_submit, "login submit button")
            .await?;
        simulate_click(&submit, ClickOptions::default()).await?;

        let redirected_to = self.await_login_redirect().await?;
        self.check_error_toast().await?;

        if !self.is_authenticated().await? {
            debug!("no authenticated marker found after redirect; accepting redirect as proxy");
        }

        Ok((
            format!("Logged in as {email}"),
            Some(json!({ "redirected_to": redirected_to })),
        ))
    }

    async fn await_login_redirect(&self) -> Result<String, AutomationError> {
        let deadline = Instant::now() + self.timeout();
        loop {
            let path = self.current_path().await?;
            if path.contains("/dashboard") || path.contains("/organizations") {
                return Ok(path);
            }
            if !path.contains("/login") {
                // Any other path away from the login page also counts.
                return Ok(path);
            }
            if Instant::now() >= deadline {
                self.check_error_toast().await?;
                return Err(AutomationError::AmbiguousOutcome(
                    "still on the login page after submit; credentials may be invalid".to_string(),
                ));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Log out via the profile menu. Already being logged out (by the same
    /// DOM heuristic login uses) is an immediate success, not an error.
    #[instrument(skip(self))]
    pub(crate) async fn logout(&self) -> StepOutcome {
        if !self.is_authenticated().await? {
            return Ok(("Already logged out".to_string(), None));
        }

        let menu = self
            .find_first(&self.config.ui.profile_menu, "profile menu")
            .await?;
        simulate_click(&menu, ClickOptions::default()).await?;
        self.settle().await;

        // The chain ends in a broad menu-item selector; filter those by text
        // manually, the `:contains` idiom.
        let mut logout_item = None;
        for selector in &self.config.ui.logout_item {
            let candidates = self.locator(selector.as_str()).all().await?;
            for candidate in candidates {
                let text = candidate.text().await?.to_lowercase();
                if text.contains("log out")
                    || text.contains("logout")
                    || text.contains("sign out")
                {
                    logout_item = Some(candidate);
                    break;
                }
            }
            if logout_item.is_some() {
                break;
            }
        }
        let logout_item = logout_item.ok_or_else(|| {
            AutomationError::ElementNotFound("Logout control not found in profile menu".to_string())
        })?;
        simulate_click(&logout_item, ClickOptions::default()).await?;

        // Either redirect target is acceptable.
        let deadline = Instant::now() + self.timeout();
        loop {
            let path = self.current_path().await?;
            if path.contains("/login") || path == "/" {
                return Ok((
                    "Logged out".to_string(),
                    Some(json!({ "redirected_to": path })),
                ));
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::AmbiguousOutcome(
                    "no redirect to login or home after logout".to_string(),
                ));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Register a new account. Optional fields are filled defensively (only
    /// if the input exists); any redirect away from /register is success.
    #[instrument(skip(self, details))]
    pub(crate) async fn register(&self, details: &RegisterDetails) -> StepOutcome {
        self.ensure_route("/register", "/register", &self.config.ui.register_submit)
            .await?;

        let values: [(usize, Option<&str>); 5] = [
            (0, details.first_name.as_deref()),
            (1, details.last_name.as_deref()),
            (2, Some(details.email.as_str())),
            (3, Some(details.password.as_str())),
            (4, details.confirm_password.as_deref()),
        ];
        for (index, value) in values {
            let Some(value) = value else { continue };
            let Some(selector) = self.config.ui.register_inputs.get(index) else {
                continue;
            };
            if let Some(input) = self.locator(selector.as_str()).find().await? {
                simulate_typing(&input, value, TypingOptions { clear_first: true }).await?;
            }
        }

        if details.accept_terms {
            if let Some(terms) = self.try_find(&self.config.ui.register_terms).await? {
                if !terms.is_checked().await? {
                    simulate_click(&terms, ClickOptions::default()).await?;
                }
            }
        }

        let submit = self
            .find_first(&self.config.ui.register_submit, "register submit button")
            .await?;
        simulate_click(&submit, ClickOptions::default()).await?;

        let deadline = Instant::now() + self.timeout();
        loop {
            let path = self.current_path().await?;
            if !path.contains("/register") {
                return Ok((
                    format!("Registered {}", details.email),
                    Some(json!({ "redirected_to": path })),
                ));
            }
            if Instant::now() >= deadline {
                self.check_error_toast().await?;
                return Err(AutomationError::AmbiguousOutcome(
                    "still on the registration page after submit".to_string(),
                ));
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
