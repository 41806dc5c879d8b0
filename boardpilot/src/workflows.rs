//! Composite workflows: multi-step sequences that aggregate per-step
//! envelopes into one summary instead of stopping at the first failure.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::actions::{slugify, Session, StepOutcome};
use crate::result::AutomationResult;

/// Delay between consecutive task creations, giving the board time to
/// re-render between modals.
const INTER_TASK_DELAY_MS: u64 = 500;

/// One task to create during project setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One step of a bulk task run. Deserialized from the same descriptor shape
/// external tools send: `{"type": "create", "title": "...", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskOperation {
    Create {
        #[serde(default)]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Update {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        status: Option<String>,
    },
    Delete {
        #[serde(default)]
        title: Option<String>,
    },
}

impl Session {
    /// Create a workspace, a project inside it, and a list of tasks.
    ///
    /// Workspace and project creation are structural prerequisites and fail
    /// the whole workflow. The tasks are independent: every one is attempted
    /// and the summary reports how many succeeded, with per-task failure
    /// details.
    #[instrument(skip(self, workspace_description, project_description, tasks))]
    pub(crate) async fn complete_project_setup(
        &self,
        workspace_name: &str,
        workspace_description: Option<&str>,
        project_name: &str,
        project_description: Option<&str>,
        tasks: &[TaskSpec],
    ) -> StepOutcome {
        self.create_workspace(workspace_name, workspace_description)
            .await?;
        let workspace_slug = slugify(workspace_name);

        self.create_project(&workspace_slug, project_name, project_description)
            .await?;
        let project_slug = slugify(project_name);

        let mut successful = 0usize;
        let mut failures = Vec::new();
        for (index, task) in tasks.iter().enumerate() {
            if index > 0 {
                crate::wait::wait_for(INTER_TASK_DELAY_MS).await;
            }
            match self
                .create_task(
                    &workspace_slug,
                    &project_slug,
                    &task.title,
                    task.description.as_deref(),
                )
                .await
            {
                Ok(_) => successful += 1,
                Err(e) => {
                    warn!(title = %task.title, error = %e, "task creation failed, continuing");
                    failures.push(json!({ "title": task.title, "error": e.to_string() }));
                }
            }
        }

        let failed = failures.len();
        info!(total = tasks.len(), successful, failed, "project setup finished");
        Ok((
            format!(
                "Set up '{workspace_name}' / '{project_name}' with {successful}/{} tasks",
                tasks.len()
            ),
            Some(json!({
                "workspace_slug": workspace_slug,
                "project_slug": project_slug,
                "tasks": {
                    "total": tasks.len(),
                    "successful": successful,
                    "failed": failed,
                    "failures": failures,
                },
            })),
        ))
    }

    /// Run a list of task operations in order. A missing required field
    /// yields a synthetic failure envelope for that step; no step's failure
    /// stops the rest, and every result is preserved in order.
    #[instrument(skip(self, operations))]
    pub(crate) async fn bulk_task_operations(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        operations: &[TaskOperation],
    ) -> StepOutcome {
        let mut results = Vec::with_capacity(operations.len());
        let mut successful = 0usize;

        for operation in operations {
            let result = self
                .run_task_operation(workspace_slug, project_slug, operation)
                .await;
            if result.success {
                successful += 1;
            }
            results.push(serde_json::to_value(&result)?);
        }

        let total = operations.len();
        let failed = total - successful;
        Ok((
            format!("Bulk run finished: {successful}/{total} operations succeeded"),
            Some(json!({
                "total": total,
                "successful": successful,
                "failed": failed,
                "results": results,
            })),
        ))
    }

    async fn run_task_operation(
        &self,
        workspace_slug: &str,
        project_slug: &str,
        operation: &TaskOperation,
    ) -> AutomationResult {
        match operation {
            TaskOperation::Create { title, description } => {
                let Some(title) = non_empty(title) else {
                    return AutomationResult::failed(
                        "Cannot create task",
                        "Task title required for create operations",
                    );
                };
                AutomationResult::from_step(
                    "create task",
                    self.create_task(workspace_slug, project_slug, title, description.as_deref())
                        .await,
                )
            }
            TaskOperation::Update { title, status } => {
                let Some(title) = non_empty(title) else {
                    return AutomationResult::failed(
                        "Cannot update task",
                        "Task title required for update operations",
                    );
                };
                let Some(status) = non_empty(status) else {
                    return AutomationResult::failed(
                        "Cannot update task",
                        "New status required for update operations",
                    );
                };
                AutomationResult::from_step(
                    "update task status",
                    self.update_task_status(workspace_slug, project_slug, title, status)
                        .await,
                )
            }
            TaskOperation::Delete { title } => {
                let Some(title) = non_empty(title) else {
                    return AutomationResult::failed(
                        "Cannot delete task",
                        "Task title required for delete operations",
                    );
                };
                AutomationResult::from_step(
                    "delete task",
                    self.delete_task(workspace_slug, project_slug, title).await,
                )
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn operation_descriptor_parses_tagged_json() {
        let raw = r#"[
            {"type": "create", "title": "Write docs"},
            {"type": "update", "title": "Write docs", "status": "Done"},
            {"type": "delete", "title": "Old task"}
        ]"#;
        let ops: Vec<TaskOperation> = serde_json::from_str(raw).unwrap();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], TaskOperation::Create { title: Some(t), .. } if t == "Write docs"));
        assert!(matches!(&ops[1], TaskOperation::Update { status: Some(s), .. } if s == "Done"));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let op: TaskOperation = serde_json::from_str(r#"{"type": "create"}"#).unwrap();
        assert!(matches!(op, TaskOperation::Create { title: None, .. }));
    }
}
