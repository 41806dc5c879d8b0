use std::sync::Arc;

use crate::tests::fake_dom::{Action, FakeDom, Node, Trigger};
use crate::tests::test_driver;

/// A dashboard with two workspace cards and assorted chrome links that must
/// be filtered out of listings.
fn dashboard() -> Arc<FakeDom> {
    let dom = Arc::new(FakeDom::new("/dashboard"));
    let main = dom.add(Node::new("main").sel("main"));
    dom.add(Node::new("div").sel("[data-testid='dashboard']").parent(main));
    dom.add(
        Node::new("a")
            .sel("a[href^='/']")
            .attr("href", "/acme")
            .text("Acme Inc")
            .parent(main),
    );
    dom.add(
        Node::new("a")
            .sel("a[href^='/']")
            .attr("href", "/beta-corp")
            .text("Beta Corp")
            .parent(main),
    );
    // Chrome links: wrong depth, global routes, or workspace sub-pages.
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
            .attr("href", "/login")
            .text("Log in")
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
async fn list_workspaces_filters_chrome_links() {
    let driver = test_driver(dashboard());

    let result = driver.list_workspaces().await;
    assert!(result.success, "{:?}", result.error);
    let data = result.data.unwrap();
    assert_eq!(data["count"], 2);
    let slugs: Vec<&str> = data["workspaces"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["slug"].as_str().unwrap())
        .collect();
    assert!(slugs.contains(&"acme"));
    assert!(slugs.contains(&"beta-corp"));
    // A global route at depth 1 must never read as a workspace.
    assert!(!slugs.contains(&"dashboard"));
}

#[tokio::test]
async fn list_workspaces_is_idempotent_on_an_unchanged_dom() {
    let driver = test_driver(dashboard());

    let first = driver.list_workspaces().await.data.unwrap();
    let second = driver.list_workspaces().await.data.unwrap();

    assert_eq!(first["count"], second["count"]);
    let slugs = |data: &serde_json::Value| {
        let mut s: Vec<String> = data["workspaces"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["slug"].as_str().unwrap().to_string())
            .collect();
        s.sort();
        s
    };
    assert_eq!(slugs(&first), slugs(&second));
}

#[tokio::test]
async fn search_workspaces_matches_name_and_slug() {
    let driver = test_driver(dashboard());

    let by_name = driver.search_workspaces("acme").await.data.unwrap();
    assert_eq!(by_name["count"], 1);

    let by_partial = driver.search_workspaces("corp").await.data.unwrap();
    assert_eq!(by_partial["count"], 1);

    let none = driver.search_workspaces("zzz").await.data.unwrap();
    assert_eq!(none["count"], 0);
}

#[tokio::test]
async fn create_workspace_fills_the_modal_and_reports_the_slug() {
    let dom = dashboard();
    let modal = dom.add(Node::new("div").sel("[role='dialog']").absent());
    let name = dom.add(
        Node::new("input")
            .sel("input[name='name']")
            .parent(modal)
            .absent(),
    );
    let actions = dom.add(Node::new("div").sel(".form-actions").parent(modal).absent());
    let submit = dom.add(
        Node::new("button")
            .sel("button")
            .text("Create")
            .parent(actions)
            .absent()
            .on(Trigger::Click, Action::Remove(modal)),
    );
    dom.add(
        Node::new("button")
            .sel("[data-testid='create-workspace']")
            .on(Trigger::Click, Action::RevealMany(vec![modal, name, actions, submit])),
    );
    let driver = test_driver(dom.clone());

    let result = driver.create_workspace("Acme Rockets!", None).await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data.unwrap()["slug"], "acme-rockets");
    assert_eq!(dom.value_of(name), "Acme Rockets!");
}

#[tokio::test]
async fn create_workspace_surfaces_the_apps_success_toast() {
    let dom = dashboard();
    let modal = dom.add(Node::new("div").sel("[role='dialog']").absent());
    let name = dom.add(
        Node::new("input")
            .sel("input[name='name']")
            .parent(modal)
            .absent(),
    );
    let actions = dom.add(Node::new("div").sel(".form-actions").parent(modal).absent());
    let toast = dom.add(
        Node::new("div")
            .sel("[data-testid='toast-success']")
            .text("Workspace created")
            .absent(),
    );
    let submit = dom.add(
        Node::new("button")
            .sel("button")
            .text("Create")
            .parent(actions)
            .absent()
            .on(Trigger::Click, Action::Remove(modal))
            .on(Trigger::Click, Action::Reveal(toast)),
    );
    dom.add(
        Node::new("button")
            .sel("[data-testid='create-workspace']")
            .on(Trigger::Click, Action::RevealMany(vec![modal, name, actions, submit])),
    );
    let driver = test_driver(dom);

    let result = driver.create_workspace("Acme", None).await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data.unwrap()["confirmation"], "Workspace created");
}

#[tokio::test]
async fn delete_workspace_fails_distinctly_while_the_button_stays_disabled() {
    let dom = Arc::new(FakeDom::new("/acme/settings"));
    dom.add(Node::new("div").sel("[data-testid='workspace-view']"));
    let modal = dom.add(Node::new("div").sel("[role='dialog']").absent());
    let confirm = dom.add(
        Node::new("input")
            .sel("[role='dialog'] input[name='confirm']")
            .parent(modal)
            .absent(),
    );
    // The app demands the display name, so typing the slug never enables it.
    let button = dom.add(
        Node::new("button")
            .sel("[role='dialog'] button.danger")
            .parent(modal)
            .absent()
            .gate(confirm, "Acme Inc"),
    );
    dom.add(
        Node::new("button")
            .sel("[data-testid='danger-zone'] button")
            .on(Trigger::Click, Action::RevealMany(vec![modal, confirm, button])),
    );
    let driver = test_driver(dom);

    let result = driver.delete_workspace("acme").await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("disabled"));
}

#[tokio::test]
async fn delete_workspace_succeeds_once_the_confirmation_matches() {
    let dom = Arc::new(FakeDom::new("/acme/settings"));
    dom.add(Node::new("div").sel("[data-testid='workspace-view']"));
    let modal = dom.add(Node::new("div").sel("[role='dialog']").absent());
    let confirm = dom.add(
        Node::new("input")
            .sel("[role='dialog'] input[name='confirm']")
            .parent(modal)
            .absent(),
    );
    let button = dom.add(
        Node::new("button")
            .sel("[role='dialog'] button.danger")
            .parent(modal)
            .absent()
            .gate(confirm, "acme")
            .on(Trigger::Click, Action::Remove(modal)),
    );
    dom.add(
        Node::new("button")
            .sel("[data-testid='danger-zone'] button")
            .on(Trigger::Click, Action::RevealMany(vec![modal, confirm, button])),
    );
    let driver = test_driver(dom);

    let result = driver.delete_workspace("acme").await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data.unwrap()["slug"], "acme");
}
