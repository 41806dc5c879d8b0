use std::sync::Arc;

use crate::tests::fake_dom::{FakeDom, Node};
use crate::tests::test_driver;

/// A workspace view with one real project card and the usual tab/nav links.
fn workspace_view() -> Arc<FakeDom> {
    let dom = Arc::new(FakeDom::new("/acme"));
    let main = dom.add(Node::new("main").sel("main"));
    dom.add(
        Node::new("div")
            .sel("[data-testid='workspace-view']")
            .parent(main),
    );
    dom.add(
        Node::new("a")
            .sel("a[href^='/']")
            .attr("href", "/acme/website-redesign")
            .text("Website Redesign")
            .parent(main),
    );
    // Workspace tabs share the entity-link shape but are not projects.
    dom.add(
        Node::new("a")
            .sel("a[href^='/']")
            .attr("href", "/acme/members")
            .text("Members")
            .parent(main),
    );
    dom.add(
        Node::new("a")
            .sel("a[href^='/']")
            .attr("href", "/acme/settings")
            .text("Settings")
            .parent(main),
    );
    dom.add(
        Node::new("a")
            .sel("a[href^='/']")
            .attr("href", "/dashboard")
            .text("Home")
            .parent(main),
    );
    dom
}

#[tokio::test]
async fn list_projects_filters_workspace_subpages() {
    let driver = test_driver(workspace_view());

    let result = driver.list_projects("acme").await;
    assert!(result.success, "{:?}", result.error);
    let data = result.data.unwrap();
    assert_eq!(data["count"], 1, "got projects: {}", data["projects"]);
    assert_eq!(data["projects"][0]["slug"], "website-redesign");
    assert_eq!(data["projects"][0]["name"], "Website Redesign");
}
