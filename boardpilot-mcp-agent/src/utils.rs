use anyhow::Result;
use boardpilot::{Driver, DriverConfig, RegisterDetails, TaskSpec};
use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Serialize, Deserialize, JsonSchema)]
pub struct EmptyArgs {}

#[derive(Clone)]
pub struct DriverWrapper {
    pub driver: Arc<Driver>,
    pub tool_router: rmcp::handler::server::tool::ToolRouter<Self>,
}

/// Build the driver from the environment: `BOARDPILOT_BASE_URL` for the app
/// origin, and `BOARDPILOT_CDP_WS` to attach to a running browser instead of
/// launching a fresh one.
pub fn driver_from_env() -> Result<Driver, boardpilot::AutomationError> {
    let base_url =
        env::var("BOARDPILOT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let config = DriverConfig::with_base_url(&base_url);
    match env::var("BOARDPILOT_CDP_WS") {
        Ok(ws) => Driver::connect(&ws, config),
        Err(_) => Driver::launch(config),
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoginArgs {
    #[schemars(description = "Account email address")]
    pub email: String,
    #[schemars(description = "Account password")]
    pub password: String,
    #[schemars(description = "Tick the remember-me checkbox. Defaults to false.")]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RegisterArgs {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    #[schemars(description = "Tick the terms-of-service checkbox. Defaults to false.")]
    pub accept_terms: Option<bool>,
}

impl From<RegisterArgs> for RegisterDetails {
    fn from(args: RegisterArgs) -> Self {
        RegisterDetails {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
            accept_terms: args.accept_terms.unwrap_or(false),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateWorkspaceArgs {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteWorkspaceArgs {
    #[schemars(description = "URL slug of the workspace, typed into the confirmation input")]
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchWorkspacesArgs {
    #[schemars(description = "Substring matched against workspace names and slugs")]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateProjectArgs {
    pub workspace_slug: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteProjectArgs {
    pub workspace_slug: String,
    pub project_slug: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListProjectsArgs {
    pub workspace_slug: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTaskArgs {
    pub workspace_slug: String,
    pub project_slug: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTaskStatusArgs {
    pub workspace_slug: String,
    pub project_slug: String,
    #[schemars(description = "Visible title of the task card to update")]
    pub task_title: String,
    #[schemars(description = "Target status label, e.g. 'In Progress' (case-insensitive)")]
    pub new_status: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTaskArgs {
    pub workspace_slug: String,
    pub project_slug: String,
    pub task_title: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchTasksArgs {
    pub workspace_slug: String,
    pub project_slug: String,
    #[schemars(description = "Substring matched against task titles; empty lists everything")]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FilterTasksByStatusArgs {
    #[schemars(description = "Organization/workspace identifier for the project listing API")]
    pub org_id: String,
    pub project_slug: String,
    pub status_name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateSprintArgs {
    pub workspace_slug: String,
    pub project_slug: String,
    pub name: String,
    pub goal: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InviteMemberArgs {
    pub workspace_slug: String,
    pub email: String,
    #[schemars(description = "Role granted to the invitee, e.g. 'member' or 'admin'")]
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListMembersArgs {
    pub workspace_slug: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TaskSpecArg {
    pub title: String,
    pub description: Option<String>,
}

impl From<TaskSpecArg> for TaskSpec {
    fn from(spec: TaskSpecArg) -> Self {
        TaskSpec {
            title: spec.title,
            description: spec.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompleteProjectSetupArgs {
    pub workspace_name: String,
    pub workspace_description: Option<String>,
    pub project_name: String,
    pub project_description: Option<String>,
    #[schemars(description = "Tasks to create on the new project's board")]
    pub tasks: Vec<TaskSpecArg>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BulkTaskOperationsArgs {
    pub workspace_slug: String,
    pub project_slug: String,
    #[schemars(
        description = "Operations in execution order, each `{\"type\": \"create\"|\"update\"|\"delete\", ...}` with `title`, and `status`/`description` where applicable"
    )]
    pub operations: Vec<serde_json::Value>,
}

pub fn init_logging() -> Result<()> {
    let log_level = env::var("LOG_LEVEL")
        .map(|level| match level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    Ok(())
}
