//! Static operation metadata, so external tool-calling systems can discover
//! the surface without introspecting code.

use serde::Serialize;

/// One exposed operation: its name, what it does, the parameter names it
/// takes, and the shape it returns.
#[derive(Debug, Clone, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
    pub returns: &'static str,
}

pub const OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "initialize",
        description: "Probe the attached page and report path, context, and authentication state",
        parameters: &[],
        returns: "AutomationResult { path, context, authenticated }",
    },
    OperationDescriptor {
        name: "login",
        description: "Log in with email and password, optionally ticking remember-me",
        parameters: &["email", "password", "remember_me"],
        returns: "AutomationResult { redirected_to }",
    },
    OperationDescriptor {
        name: "logout",
        description: "Log out via the profile menu; already logged out is a success",
        parameters: &[],
        returns: "AutomationResult { redirected_to }",
    },
    OperationDescriptor {
        name: "register",
        description: "Register a new account, filling whichever optional fields exist",
        parameters: &["details"],
        returns: "AutomationResult { redirected_to }",
    },
    OperationDescriptor {
        name: "create_workspace",
        description: "Create a workspace from the dashboard",
        parameters: &["name", "description"],
        returns: "AutomationResult { name, slug }",
    },
    OperationDescriptor {
        name: "delete_workspace",
        description: "Delete a workspace through the typed-confirmation danger-zone flow",
        parameters: &["slug"],
        returns: "AutomationResult { slug }",
    },
    OperationDescriptor {
        name: "list_workspaces",
        description: "Scrape the dashboard for workspace cards",
        parameters: &[],
        returns: "AutomationResult { count, workspaces[] }",
    },
    OperationDescriptor {
        name: "search_workspaces",
        description: "List workspaces filtered by a name/slug substring",
        parameters: &["query"],
        returns: "AutomationResult { count, workspaces[] }",
    },
    OperationDescriptor {
        name: "create_project",
        description: "Create a project inside a workspace",
        parameters: &["workspace_slug", "name", "description"],
        returns: "AutomationResult { name, slug, workspace_slug }",
    },
    OperationDescriptor {
        name: "delete_project",
        description: "Delete a project through the typed-confirmation danger-zone flow",
        parameters: &["workspace_slug", "project_slug"],
        returns: "AutomationResult { slug, workspace_slug }",
    },
    OperationDescriptor {
        name: "list_projects",
        description: "Scrape a workspace page for project cards",
        parameters: &["workspace_slug"],
        returns: "AutomationResult { count, projects[] }",
    },
    OperationDescriptor {
        name: "create_task",
        description: "Create a task on a project board",
        parameters: &["workspace_slug", "project_slug", "title", "description"],
        returns: "AutomationResult { title }",
    },
    OperationDescriptor {
        name: "update_task_status",
        description: "Move a task to another status via its detail panel dropdown",
        parameters: &["workspace_slug", "project_slug", "task_title", "new_status"],
        returns: "AutomationResult { title, status }",
    },
    OperationDescriptor {
        name: "delete_task",
        description: "Delete a task from its detail panel",
        parameters: &["workspace_slug", "project_slug", "task_title"],
        returns: "AutomationResult { title }",
    },
    OperationDescriptor {
        name: "search_tasks",
        description: "Scrape board cards whose title contains a substring",
        parameters: &["workspace_slug", "project_slug", "query"],
        returns: "AutomationResult { count, tasks[] }",
    },
    OperationDescriptor {
        name: "filter_tasks_by_status",
        description: "Resolve a status name to its id via the REST directory and filter the board",
        parameters: &["org_id", "project_slug", "status_name"],
        returns: "AutomationResult { status_id, status_name, project_id }",
    },
    OperationDescriptor {
        name: "create_sprint",
        description: "Create a sprint on a project board",
        parameters: &["workspace_slug", "project_slug", "name", "goal"],
        returns: "AutomationResult { name }",
    },
    OperationDescriptor {
        name: "invite_member",
        description: "Invite a member to a workspace by email and role",
        parameters: &["workspace_slug", "email", "role"],
        returns: "AutomationResult { email, role }",
    },
    OperationDescriptor {
        name: "list_members",
        description: "Scrape a workspace's members page",
        parameters: &["workspace_slug"],
        returns: "AutomationResult { count, members[] }",
    },
    OperationDescriptor {
        name: "complete_project_setup",
        description: "Create a workspace, a project, and a list of tasks as one run",
        parameters: &[
            "workspace_name",
            "workspace_description",
            "project_name",
            "project_description",
            "tasks",
        ],
        returns: "AutomationResult { workspace_slug, project_slug, tasks: { total, successful, failed, failures[] } }",
    },
    OperationDescriptor {
        name: "bulk_task_operations",
        description: "Run a list of create/update/delete task operations, isolating failures",
        parameters: &["workspace_slug", "project_slug", "operations"],
        returns: "AutomationResult { total, successful, failed, results[] }",
    },
];
