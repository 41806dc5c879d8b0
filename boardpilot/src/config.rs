use std::time::Duration;

use crate::ui_map::UiMap;

/// Tunables for a [`crate::Driver`] instance.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Origin of the host app, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Origin for the REST collaborator endpoints; defaults to `base_url`.
    pub api_base_url: Option<String>,
    /// Default deadline for element/navigation waits.
    pub default_timeout: Duration,
    /// Settle delay between form-filling steps, in milliseconds.
    pub settle_ms: u64,
    /// Status labels recognized by `update_task_status`. Custom workflow
    /// status names must be added here to be matched.
    pub status_labels: Vec<String>,
    /// Selector fallback chains for the host app's affordances.
    pub ui: UiMap,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_base_url: None,
            default_timeout: Duration::from_secs(10),
            settle_ms: 300,
            status_labels: vec![
                "Backlog".to_string(),
                "To Do".to_string(),
                "In Progress".to_string(),
                "In Review".to_string(),
                "Done".to_string(),
                "Cancelled".to_string(),
            ],
            ui: UiMap::default(),
        }
    }
}

impl DriverConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(&self.base_url)
    }
}
