pub use crate::utils::DriverWrapper;
use crate::utils::{
    driver_from_env, BulkTaskOperationsArgs, CompleteProjectSetupArgs, CreateProjectArgs,
    CreateSprintArgs, CreateTaskArgs, CreateWorkspaceArgs, DeleteProjectArgs, DeleteTaskArgs,
    DeleteWorkspaceArgs, EmptyArgs, FilterTasksByStatusArgs, InviteMemberArgs, ListMembersArgs,
    ListProjectsArgs, LoginArgs, RegisterArgs, SearchTasksArgs, SearchWorkspacesArgs,
    UpdateTaskStatusArgs,
};
use boardpilot::{AutomationResult, TaskOperation, TaskSpec, OPERATIONS};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, Error as McpError, ServerHandler};
use rmcp::{tool_handler, tool_router};
use serde_json::json;
use std::sync::Arc;

/// Turn a result envelope into tool output. Failure envelopes are still
/// successful tool calls; the envelope carries the outcome.
fn envelope(result: AutomationResult) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::json(result)?]))
}

#[tool_router]
impl DriverWrapper {
    pub async fn new() -> Result<Self, McpError> {
        let driver = driver_from_env().map_err(|e| {
            McpError::internal_error(
                "Failed to initialize the browser driver",
                serde_json::to_value(e.to_string()).ok(),
            )
        })?;
        Ok(Self {
            driver: Arc::new(driver),
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        description = "Probe the attached page and report its path, URL context, and authentication state. Run this first. This is a read-only operation."
    )]
    pub async fn initialize(
        &self,
        Parameters(_args): Parameters<EmptyArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.initialize().await)
    }

    #[tool(
        description = "List every available operation with its parameters and return shape. This is a read-only operation."
    )]
    pub async fn list_operations(
        &self,
        Parameters(_args): Parameters<EmptyArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::json(
            json!({ "operations": OPERATIONS }),
        )?]))
    }

    #[tool(description = "Log in with email and password.")]
    pub async fn login(
        &self,
        Parameters(args): Parameters<LoginArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .login(&args.email, &args.password, args.remember_me.unwrap_or(false))
                .await,
        )
    }

    #[tool(description = "Log out via the profile menu. Already being logged out is a success.")]
    pub async fn logout(
        &self,
        Parameters(_args): Parameters<EmptyArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.logout().await)
    }

    #[tool(description = "Register a new account.")]
    pub async fn register(
        &self,
        Parameters(args): Parameters<RegisterArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.register(&args.into()).await)
    }

    #[tool(description = "Create a workspace from the dashboard.")]
    pub async fn create_workspace(
        &self,
        Parameters(args): Parameters<CreateWorkspaceArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .create_workspace(&args.name, args.description.as_deref())
                .await,
        )
    }

    #[tool(
        description = "Delete a workspace. Goes through the danger-zone dialog and types the slug into the confirmation input; fails distinctly if the destructive button stays disabled."
    )]
    pub async fn delete_workspace(
        &self,
        Parameters(args): Parameters<DeleteWorkspaceArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.delete_workspace(&args.slug).await)
    }

    #[tool(description = "List the workspaces visible on the dashboard. This is a read-only operation.")]
    pub async fn list_workspaces(
        &self,
        Parameters(_args): Parameters<EmptyArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.list_workspaces().await)
    }

    #[tool(description = "Search workspaces by name or slug substring. This is a read-only operation.")]
    pub async fn search_workspaces(
        &self,
        Parameters(args): Parameters<SearchWorkspacesArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.search_workspaces(&args.query).await)
    }

    #[tool(description = "Create a project inside a workspace.")]
    pub async fn create_project(
        &self,
        Parameters(args): Parameters<CreateProjectArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .create_project(&args.workspace_slug, &args.name, args.description.as_deref())
                .await,
        )
    }

    #[tool(description = "Delete a project through the typed-confirmation danger-zone flow.")]
    pub async fn delete_project(
        &self,
        Parameters(args): Parameters<DeleteProjectArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .delete_project(&args.workspace_slug, &args.project_slug)
                .await,
        )
    }

    #[tool(description = "List the projects of a workspace. This is a read-only operation.")]
    pub async fn list_projects(
        &self,
        Parameters(args): Parameters<ListProjectsArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.list_projects(&args.workspace_slug).await)
    }

    #[tool(description = "Create a task on a project board.")]
    pub async fn create_task(
        &self,
        Parameters(args): Parameters<CreateTaskArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .create_task(
                    &args.workspace_slug,
                    &args.project_slug,
                    &args.title,
                    args.description.as_deref(),
                )
                .await,
        )
    }

    #[tool(
        description = "Move a task to another status. Opens the task's detail panel and drives its status dropdown, retrying while the menu populates."
    )]
    pub async fn update_task_status(
        &self,
        Parameters(args): Parameters<UpdateTaskStatusArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .update_task_status(
                    &args.workspace_slug,
                    &args.project_slug,
                    &args.task_title,
                    &args.new_status,
                )
                .await,
        )
    }

    #[tool(description = "Delete a task from its detail panel.")]
    pub async fn delete_task(
        &self,
        Parameters(args): Parameters<DeleteTaskArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .delete_task(&args.workspace_slug, &args.project_slug, &args.task_title)
                .await,
        )
    }

    #[tool(description = "Search the board for tasks whose title contains a substring. This is a read-only operation.")]
    pub async fn search_tasks(
        &self,
        Parameters(args): Parameters<SearchTasksArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .search_tasks(&args.workspace_slug, &args.project_slug, &args.query)
                .await,
        )
    }

    #[tool(
        description = "Filter the board by status. Resolves the status name to its internal id through the listing APIs, then navigates with the id as a query parameter."
    )]
    pub async fn filter_tasks_by_status(
        &self,
        Parameters(args): Parameters<FilterTasksByStatusArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .filter_tasks_by_status(&args.org_id, &args.project_slug, &args.status_name)
                .await,
        )
    }

    #[tool(description = "Create a sprint on a project board.")]
    pub async fn create_sprint(
        &self,
        Parameters(args): Parameters<CreateSprintArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .create_sprint(
                    &args.workspace_slug,
                    &args.project_slug,
                    &args.name,
                    args.goal.as_deref(),
                )
                .await,
        )
    }

    #[tool(description = "Invite a member to a workspace. Requires an inviter role.")]
    pub async fn invite_member(
        &self,
        Parameters(args): Parameters<InviteMemberArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(
            self.driver
                .invite_member(&args.workspace_slug, &args.email, &args.role)
                .await,
        )
    }

    #[tool(description = "List the members of a workspace. This is a read-only operation.")]
    pub async fn list_members(
        &self,
        Parameters(args): Parameters<ListMembersArgs>,
    ) -> Result<CallToolResult, McpError> {
        envelope(self.driver.list_members(&args.workspace_slug).await)
    }

    #[tool(
        description = "Create a workspace, a project inside it, and a list of tasks in one run. Workspace/project failures abort; per-task failures are tallied."
    )]
    pub async fn complete_project_setup(
        &self,
        Parameters(args): Parameters<CompleteProjectSetupArgs>,
    ) -> Result<CallToolResult, McpError> {
        let tasks: Vec<TaskSpec> = args.tasks.into_iter().map(Into::into).collect();
        envelope(
            self.driver
                .complete_project_setup(
                    &args.workspace_name,
                    args.workspace_description.as_deref(),
                    &args.project_name,
                    args.project_description.as_deref(),
                    &tasks,
                )
                .await,
        )
    }

    #[tool(
        description = "Run a list of task operations in order. Each operation's result is reported independently; one failure never aborts the rest."
    )]
    pub async fn bulk_task_operations(
        &self,
        Parameters(args): Parameters<BulkTaskOperationsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let operations: Vec<TaskOperation> =
            serde_json::from_value(serde_json::Value::Array(args.operations)).map_err(|e| {
                McpError::invalid_params(
                    "Malformed operation descriptor",
                    serde_json::to_value(e.to_string()).ok(),
                )
            })?;
        envelope(
            self.driver
                .bulk_task_operations(&args.workspace_slug, &args.project_slug, &operations)
                .await,
        )
    }
}

#[tool_handler]
impl ServerHandler for DriverWrapper {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(get_server_instructions().to_string()),
        }
    }
}

fn get_server_instructions() -> &'static str {
    "\
You drive a Kanban-style project-management web app through its rendered UI.

Every tool returns the same envelope: {success, message, data?, error?}. A \
tool call only errors at the protocol level for malformed input; operational \
failures (element not found, timeout, the page showing an error toast) come \
back as success=false with the reason in `error`. Inspect the envelope, not \
just the call status.

Start with `initialize` to confirm a page is attached and see whether a user \
is logged in. Most operations require authentication; call `login` first. \
Operations re-derive all state from the live page, so there is no session \
object to manage, and calls are serialized internally - issue one at a time.

Entity hierarchy: workspaces contain projects, projects contain tasks on a \
board. Slugs are lowercase-hyphenated forms of names ('Acme Inc' -> 'acme-inc') \
and appear in URL paths as /{workspace}/{project}. Deletions go through a \
typed-confirmation dialog and fail distinctly if the confirmation is not \
accepted. For multi-step jobs prefer `complete_project_setup` and \
`bulk_task_operations`, which aggregate per-step outcomes instead of \
stopping at the first failure."
}
