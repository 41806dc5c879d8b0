//! Context inference from the current URL path.
//!
//! The path is the sole source of truth for "where the user is"; no session
//! object is kept between calls. Workspace and project slugs are positional:
//! `/:workspaceSlug/:projectSlug/...`, except that known global first
//! segments mean no workspace at all, and known workspace-level second
//! segments (settings, members, ...) mean the second segment is a sub-page,
//! not a project slug.

use serde::{Deserialize, Serialize};

/// First path segments that are app-global routes, not workspace slugs.
pub const GLOBAL_ROUTES: &[&str] = &[
    "login",
    "register",
    "dashboard",
    "organizations",
    "profile",
    "settings",
    "invitations",
    "onboarding",
    "404",
];

/// Second path segments that are workspace sub-pages, not project slugs.
pub const WORKSPACE_SUBROUTES: &[&str] = &[
    "settings",
    "members",
    "projects",
    "billing",
    "integrations",
    "labels",
    "activity",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageContext {
    Global,
    Workspace {
        workspace_slug: String,
    },
    Project {
        workspace_slug: String,
        project_slug: String,
    },
}

impl PageContext {
    pub fn workspace_slug(&self) -> Option<&str> {
        match self {
            PageContext::Global => None,
            PageContext::Workspace { workspace_slug }
            | PageContext::Project { workspace_slug, .. } => Some(workspace_slug),
        }
    }

    pub fn project_slug(&self) -> Option<&str> {
        match self {
            PageContext::Project { project_slug, .. } => Some(project_slug),
            _ => None,
        }
    }
}

/// Derive the context from a URL path. Query strings are ignored.
pub fn parse_context(path: &str) -> PageContext {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let Some(first) = segments.first() else {
        return PageContext::Global;
    };
    if GLOBAL_ROUTES.contains(first) {
        return PageContext::Global;
    }

    let workspace_slug = (*first).to_string();
    // A sub-route segment anywhere past the slug (second or deeper, e.g.
    // /acme/settings or /acme/website-redesign/settings) marks a workspace
    // sub-page rather than a project view.
    if segments.iter().skip(1).any(|s| WORKSPACE_SUBROUTES.contains(s)) {
        return PageContext::Workspace { workspace_slug };
    }
    match segments.get(1) {
        None => PageContext::Workspace { workspace_slug },
        Some(second) => PageContext::Project {
            workspace_slug,
            project_slug: (*second).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_global_routes_are_global() {
        assert_eq!(parse_context("/"), PageContext::Global);
        assert_eq!(parse_context("/dashboard"), PageContext::Global);
        assert_eq!(parse_context("/login"), PageContext::Global);
    }

    #[test]
    fn workspace_subroute_is_workspace_scope() {
        assert_eq!(
            parse_context("/acme/settings"),
            PageContext::Workspace {
                workspace_slug: "acme".to_string()
            }
        );
        assert_eq!(
            parse_context("/acme/members"),
            PageContext::Workspace {
                workspace_slug: "acme".to_string()
            }
        );
    }

    #[test]
    fn second_segment_is_project_slug_otherwise() {
        assert_eq!(
            parse_context("/acme/website-redesign"),
            PageContext::Project {
                workspace_slug: "acme".to_string(),
                project_slug: "website-redesign".to_string(),
            }
        );
    }

    #[test]
    fn project_subpage_keeps_project_scope() {
        assert_eq!(
            parse_context("/acme/website-redesign/tasks?status=123"),
            PageContext::Project {
                workspace_slug: "acme".to_string(),
                project_slug: "website-redesign".to_string(),
            }
        );
    }

    #[test]
    fn trailing_subroute_demotes_to_workspace_scope() {
        assert_eq!(
            parse_context("/acme/website-redesign/settings"),
            PageContext::Workspace {
                workspace_slug: "acme".to_string()
            }
        );
    }
}
