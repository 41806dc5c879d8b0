//! Browser automation for a workspace/project/task web app
//!
//! This crate drives a Kanban-style project-management UI programmatically,
//! inspired by Playwright's web automation model: a [`Driver`] facade over
//! selector-chain element discovery, synthetic-event input, and async
//! wait/poll primitives. Every public operation returns the same
//! [`AutomationResult`] envelope, for both success and failure, so callers
//! never need error handling around a call.
//!
//! ```no_run
//! use boardpilot::{Driver, DriverConfig};
//!
//! # async fn run() {
//! let driver = Driver::launch(DriverConfig::with_base_url("http://localhost:3000")).unwrap();
//! let result = driver.login("user@example.com", "secret", false).await;
//! assert!(result.success);
//! # }
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::json;
use tracing::instrument;

pub mod actions;
pub mod catalog;
pub mod config;
pub mod context;
pub mod element;
pub mod engine;
pub mod errors;
pub mod events;
pub mod locator;
pub mod rest;
pub mod result;
pub mod selector;
#[cfg(test)]
mod tests;
pub mod ui_map;
pub mod wait;
pub mod workflows;

pub use actions::auth::RegisterDetails;
pub use catalog::{OperationDescriptor, OPERATIONS};
pub use config::DriverConfig;
pub use context::{parse_context, PageContext};
pub use element::Element;
pub use engine::cdp::CdpEngine;
pub use engine::{DomEngine, DomNode, KeyModifiers, SyntheticEvent};
pub use errors::AutomationError;
pub use locator::Locator;
pub use rest::{ProjectDirectory, ProjectRecord, RestDirectory, StatusRecord};
pub use result::AutomationResult;
pub use selector::Selector;
pub use ui_map::UiMap;
pub use workflows::{TaskOperation, TaskSpec};

use actions::Session;

/// The orchestration facade: every domain operation plus the composite
/// workflows, each returning an [`AutomationResult`].
///
/// The page is one shared resource, so the driver serializes its own public
/// entry points through an internal guard; two concurrent calls on clones of
/// the same driver run one after the other rather than racing on the DOM.
pub struct Driver {
    session: Arc<Session>,
    guard: Arc<tokio::sync::Mutex<()>>,
}

impl Clone for Driver {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver").finish_non_exhaustive()
    }
}

static GLOBAL_DRIVER: OnceCell<Arc<Driver>> = OnceCell::new();

impl Driver {
    /// Build a driver over any engine. The REST collaborator defaults to the
    /// configured API origin.
    pub fn new(engine: Arc<dyn DomEngine>, config: DriverConfig) -> Self {
        let directory = Arc::new(RestDirectory::new(config.api_base()));
        Self::with_directory(engine, config, directory)
    }

    /// Build a driver with an explicit REST collaborator.
    pub fn with_directory(
        engine: Arc<dyn DomEngine>,
        config: DriverConfig,
        directory: Arc<dyn ProjectDirectory>,
    ) -> Self {
        Self {
            session: Arc::new(Session {
                engine,
                config,
                directory,
            }),
            guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Launch a fresh headless browser and attach to it.
    pub fn launch(config: DriverConfig) -> Result<Self, AutomationError> {
        let engine = Arc::new(CdpEngine::launch(&config.base_url)?);
        Ok(Self::new(engine, config))
    }

    /// Attach to an already-running browser's debugging endpoint.
    pub fn connect(debug_url: &str, config: DriverConfig) -> Result<Self, AutomationError> {
        let engine = Arc::new(CdpEngine::connect(debug_url, &config.base_url)?);
        Ok(Self::new(engine, config))
    }

    /// Register a driver as the process-wide default, for REPL and tool-host
    /// use. Idempotent: only the first registration wins, and the return
    /// value says whether this call was the one that registered.
    pub fn register_global(driver: Arc<Driver>) -> bool {
        GLOBAL_DRIVER.set(driver).is_ok()
    }

    /// The process-wide default driver, if one has been registered.
    pub fn global() -> Option<Arc<Driver>> {
        GLOBAL_DRIVER.get().cloned()
    }

    /// Metadata for every exposed operation, for external tool discovery.
    pub fn operations() -> &'static [OperationDescriptor] {
        OPERATIONS
    }

    /// Probe the attached page: asserts the engine answers at all, then
    /// reports the current path, the inferred context, and the
    /// authentication heuristic. The one operation whose failure means the
    /// whole session is unusable.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> AutomationResult {
        let _flight = self.guard.lock().await;
        let outcome = async {
            self.session.engine.ping().await?;
            let path = self.session.current_path().await?;
            let context = self.session.context().await?;
            let authenticated = self.session.is_authenticated().await?;
            Ok((
                format!("Attached to page at {path}"),
                Some(json!({
                    "path": path,
                    "context": context,
                    "authenticated": authenticated,
                })),
            ))
        }
        .await;
        AutomationResult::from_step("Initialize", outcome)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step("Login", self.session.login(email, password, remember_me).await)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step("Logout", self.session.logout().await)
    }

    #[instrument(skip(self, details))]
    pub async fn register(&self, details: &RegisterDetails) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step("Registration", self.session.register(details).await)
    }

    #[instrument(skip(self, description))]
    pub async fn create_workspace(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Create workspace",
            self.session.create_workspace(name, description).await,
        )
    }

    #[instrument(skip(self))]
    pub async fn delete_workspace(&self, slug: &str) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step("Delete workspace", self.session.delete_workspace(slug).await)
    }

    #[instrument(skip(self))]
    pub async fn list_workspaces(&self) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step("List workspaces", self.session.list_workspaces().await)
    }

    #[instrument(skip(self))]
    pub async fn search_workspaces(&self, query: &str) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Search workspaces",
            self.session.search_workspaces(query).await,
        )
    }

    #[instrument(skip(self, description))]
    pub async fn create_project(
        &self,
        workspace_slug: &str,
        name: &str,
        description: Option<&str>,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Create project",
            self.session
                .create_project(workspace_slug, name, description)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn delete_project(
        &self,
        workspace_slug: &str,
        project_slug: &str,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Delete project",
            self.session.delete_project(workspace_slug, project_slug).await,
        )
    }

    #[instrument(skip(self))]
    pub async fn list_projects(&self, workspace_slug: &str) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "List projects",
            self.session.list_projects(workspace_slug).await,
        )
    }

    #[instrument(skip(self, description))]
    pub async fn create_task(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        title: &str,
        description: Option<&str>,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Create task",
            self.session
                .create_task(workspace_slug, project_slug, title, description)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn update_task_status(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        task_title: &str,
        new_status: &str,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Update task status",
            self.session
                .update_task_status(workspace_slug, project_slug, task_title, new_status)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn delete_task(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        task_title: &str,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Delete task",
            self.session
                .delete_task(workspace_slug, project_slug, task_title)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn search_tasks(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        query: &str,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Search tasks",
            self.session
                .search_tasks(workspace_slug, project_slug, query)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn filter_tasks_by_status(
        &self,
        org_id: &str,
        project_slug: &str,
        status_name: &str,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Filter tasks by status",
            self.session
                .filter_tasks_by_status(org_id, project_slug, status_name)
                .await,
        )
    }

    #[instrument(skip(self, goal))]
    pub async fn create_sprint(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        name: &str,
        goal: Option<&str>,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Create sprint",
            self.session
                .create_sprint(workspace_slug, project_slug, name, goal)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn invite_member(
        &self,
        workspace_slug: &str,
        email: &str,
        role: &str,
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Invite member",
            self.session.invite_member(workspace_slug, email, role).await,
        )
    }

    #[instrument(skip(self))]
    pub async fn list_members(&self, workspace_slug: &str) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "List members",
            self.session.list_members(workspace_slug).await,
        )
    }

    /// Create a workspace, a project inside it, and a list of tasks, holding
    /// the single-flight guard for the whole run.
    #[instrument(skip_all, fields(workspace = workspace_name, project = project_name))]
    pub async fn complete_project_setup(
        &self,
        workspace_name: &str,
        workspace_description: Option<&str>,
        project_name: &str,
        project_description: Option<&str>,
        tasks: &[TaskSpec],
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Project setup",
            self.session
                .complete_project_setup(
                    workspace_name,
                    workspace_description,
                    project_name,
                    project_description,
                    tasks,
                )
                .await,
        )
    }

    /// Run a list of task operations in order, isolating per-step failures.
    #[instrument(skip(self, operations))]
    pub async fn bulk_task_operations(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        operations: &[TaskOperation],
    ) -> AutomationResult {
        let _flight = self.guard.lock().await;
        AutomationResult::from_step(
            "Bulk task operations",
            self.session
                .bulk_task_operations(workspace_slug, project_slug, operations)
                .await,
        )
    }
}
