//! Data-driven selector fallback chains for the host app's UI affordances.
//!
//! The host UI's class names and structure are not a stable contract, so
//! every affordance is located through an ordered chain of candidates;
//! markup drift is handled by editing this map, not the action code.
//! Strings use the selector grammar of [`crate::Selector`] (`text:`,
//! `text=`, `xpath:`, `||`).

use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiMap {
    /// Login form controls.
    pub login_email: Vec<String>,
    pub login_password: Vec<String>,
    pub login_remember_me: Vec<String>,
    pub login_submit: Vec<String>,

    /// Registration form controls; fields are filled only if present.
    pub register_inputs: Vec<String>,
    pub register_terms: Vec<String>,
    pub register_submit: Vec<String>,

    /// DOM-presence heuristic for "a user is logged in".
    pub authenticated_marker: Vec<String>,
    pub profile_menu: Vec<String>,
    pub logout_item: Vec<String>,

    /// Creation affordances, per entity.
    pub create_workspace_button: Vec<String>,
    pub create_project_button: Vec<String>,
    pub create_task_button: Vec<String>,
    pub create_sprint_button: Vec<String>,
    pub invite_member_button: Vec<String>,

    /// Modal/dialog roots and their form-action containers.
    pub modal: Vec<String>,
    pub modal_form_actions: Vec<String>,

    /// Common named fields inside creation modals.
    pub name_input: Vec<String>,
    pub description_input: Vec<String>,
    pub title_input: Vec<String>,
    pub email_input: Vec<String>,

    /// Danger-zone / typed-confirmation delete flow.
    pub danger_zone_button: Vec<String>,
    pub delete_option: Vec<String>,
    pub delete_confirm_input: Vec<String>,
    pub delete_confirm_button: Vec<String>,

    /// Task board specifics.
    pub task_card: Vec<String>,
    pub task_detail_panel: Vec<String>,
    pub status_dropdown_trigger: Vec<String>,
    /// Expanding list of strategies for portal-rendered menu items; scanned
    /// document-wide because portals detach from the triggering subtree.
    pub portal_menu_items: Vec<String>,

    /// Toast/alert indicators probed after submits.
    pub error_toast: Vec<String>,
    pub success_toast: Vec<String>,

    /// Entity-card text extraction cascade for list/search scraping.
    pub entity_name: Vec<String>,
    pub entity_description: Vec<String>,

    /// Page readiness markers.
    pub page_ready_dashboard: Vec<String>,
    pub page_ready_workspace: Vec<String>,
    pub page_ready_project: Vec<String>,
}

impl Default for UiMap {
    fn default() -> Self {
        Self {
            login_email: strings(&[
                "input[type='email']",
                "input[name='email']",
                "#email",
            ]),
            login_password: strings(&[
                "input[type='password']",
                "input[name='password']",
                "#password",
            ]),
            login_remember_me: strings(&[
                "input[name='rememberMe']",
                "input[type='checkbox']#remember",
                "label.remember input[type='checkbox']",
            ]),
            login_submit: strings(&[
                "form button[type='submit']",
                "text=Log in",
                "text=Sign in",
                "button.login-submit",
            ]),
            register_inputs: strings(&[
                "input[name='firstName']",
                "input[name='lastName']",
                "input[name='email']",
                "input[name='password']",
                "input[name='confirmPassword']",
            ]),
            register_terms: strings(&[
                "input[name='acceptTerms']",
                "input[type='checkbox']#terms",
            ]),
            register_submit: strings(&[
                "form button[type='submit']",
                "text=Sign up",
                "text=Create account",
            ]),
            authenticated_marker: strings(&[
                "[data-testid='user-menu']",
                "nav .avatar",
                "header .profile-menu",
            ]),
            profile_menu: strings(&[
                "[data-testid='user-menu']",
                "nav .avatar",
                "header button.profile",
            ]),
            logout_item: strings(&[
                "[data-testid='logout']",
                "text:Log out",
                "text:Sign out",
                "[role='menuitem']",
            ]),
            create_workspace_button: strings(&[
                "[data-testid='create-workspace']",
                "text:Create Workspace",
                "text:New Workspace",
                "button.create-workspace",
            ]),
            create_project_button: strings(&[
                "[data-testid='create-project']",
                "text:Create Project",
                "text:New Project",
                "button.create-project",
            ]),
            create_task_button: strings(&[
                "[data-testid='create-task']",
                "text:Create Task",
                "text:New Task",
                "text:Add Task",
                "button.create-task",
            ]),
            create_sprint_button: strings(&[
                "[data-testid='create-sprint']",
                "text:Create Sprint",
                "text:New Sprint",
            ]),
            invite_member_button: strings(&[
                "[data-testid='invite-member']",
                "text:Invite Member",
                "text:Invite",
            ]),
            modal: strings(&[
                "[role='dialog']",
                ".modal",
                "[data-testid='modal']",
                ".dialog-overlay .dialog",
            ]),
            modal_form_actions: strings(&[
                ".form-actions",
                ".modal-footer",
                "[data-testid='form-actions']",
            ]),
            name_input: strings(&[
                "input[name='name']",
                "#name",
                "input[placeholder*='name' i]",
            ]),
            description_input: strings(&[
                "textarea[name='description']",
                "input[name='description']",
                "#description",
            ]),
            title_input: strings(&[
                "input[name='title']",
                "#title",
                "input[placeholder*='title' i]",
            ]),
            email_input: strings(&[
                "input[type='email']",
                "input[name='email']",
            ]),
            danger_zone_button: strings(&[
                "[data-testid='danger-zone'] button",
                ".danger-zone button",
                "text:Delete Workspace",
                "text:Delete Project",
            ]),
            delete_option: strings(&[
                "[data-testid='delete-option']",
                "[role='dialog'] [role='radio']",
                ".delete-options li",
            ]),
            delete_confirm_input: strings(&[
                "[role='dialog'] input[name='confirm']",
                "[role='dialog'] input[type='text']",
                ".modal input[type='text']",
            ]),
            delete_confirm_button: strings(&[
                "[role='dialog'] button.danger",
                "[role='dialog'] button[type='submit']",
                "text=Delete",
            ]),
            task_card: strings(&[
                "[data-testid='task-card']",
                ".task-card",
                ".board-card",
            ]),
            task_detail_panel: strings(&[
                "[data-testid='task-detail']",
                ".task-detail-panel",
                "[role='complementary'].task",
            ]),
            status_dropdown_trigger: strings(&[
                "[data-testid='status-select']",
                ".task-detail-panel [role='combobox']",
                "button.status-trigger",
            ]),
            portal_menu_items: strings(&[
                "[role='listbox'] [role='option']",
                "[role='menu'] [role='menuitem']",
                "[data-radix-popper-content-wrapper] [role='option']",
                "body > div[data-portal] li",
                ".select-dropdown .select-option",
            ]),
            error_toast: strings(&[
                "[data-testid='toast-error']",
                ".toast.toast-error",
                "[role='alert'].error",
                ".notification.is-danger",
            ]),
            success_toast: strings(&[
                "[data-testid='toast-success']",
                ".toast.toast-success",
                "[role='status'].success",
            ]),
            entity_name: strings(&[
                "[data-testid='entity-name']",
                "h3",
                ".card-title",
                ".name",
            ]),
            entity_description: strings(&[
                "[data-testid='entity-description']",
                ".card-description",
                "p.description",
            ]),
            page_ready_dashboard: strings(&[
                "[data-testid='dashboard']",
                ".dashboard-grid",
                "main .workspace-list",
            ]),
            page_ready_workspace: strings(&[
                "[data-testid='workspace-view']",
                ".project-list",
                "main .workspace-header",
            ]),
            page_ready_project: strings(&[
                "[data-testid='board']",
                ".kanban-board",
                ".board-columns",
            ]),
        }
    }
}

impl UiMap {
    /// Join a chain into one fallback selector string.
    pub fn chain(parts: &[String]) -> String {
        parts.join(" || ")
    }
}
