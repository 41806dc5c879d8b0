use std::sync::Arc;

use crate::tests::fake_dom::{Action, FakeDom, Node, Trigger};
use crate::tests::test_driver;

/// A login page whose submit navigates to `/dashboard`, like the host app's
/// happy path.
fn login_page() -> Arc<FakeDom> {
    let dom = Arc::new(FakeDom::new("/login"));
    dom.add(Node::new("input").sel("input[type='email']"));
    dom.add(Node::new("input").sel("input[type='password']"));
    dom.add(
        Node::new("button")
            .sel("form button[type='submit']")
            .on(Trigger::Click, Action::Navigate("/dashboard".to_string())),
    );
    dom
}

#[tokio::test]
async fn login_reports_the_dashboard_redirect() {
    let dom = login_page();
    let driver = test_driver(dom.clone());

    let result = driver.login("user@example.com", "secret", false).await;

    assert!(result.success, "login failed: {:?}", result.error);
    assert!(result.error.is_none());
    let data = result.data.unwrap();
    assert_eq!(data["redirected_to"], "/dashboard");
}

#[tokio::test]
async fn login_types_through_the_native_setter() {
    let dom = Arc::new(FakeDom::new("/login"));
    let email = dom.add(Node::new("input").sel("input[type='email']"));
    let password = dom.add(Node::new("input").sel("input[type='password']"));
    dom.add(
        Node::new("button")
            .sel("form button[type='submit']")
            .on(Trigger::Click, Action::Navigate("/dashboard".to_string())),
    );
    let driver = test_driver(dom.clone());

    let result = driver.login("user@example.com", "secret", false).await;
    assert!(result.success);
    assert_eq!(dom.value_of(email), "user@example.com");
    assert_eq!(dom.value_of(password), "secret");

    // The field must see an input event after the value assignment.
    let events = dom.events();
    assert!(events.iter().any(|(id, name)| *id == email && name == "input"));
    assert!(events.iter().any(|(id, name)| *id == email && name == "change"));
}

#[tokio::test]
async fn login_ticks_remember_me_only_when_unchecked() {
    let dom = login_page();
    let checkbox = dom.add(
        Node::new("input")
            .sel("input[name='rememberMe']")
            .attr("type", "checkbox"),
    );
    let driver = test_driver(dom.clone());

    let result = driver.login("user@example.com", "secret", true).await;
    assert!(result.success);
    let clicks = dom
        .events()
        .iter()
        .filter(|(id, name)| *id == checkbox && name == "click")
        .count();
    assert_eq!(clicks, 1);
}

#[tokio::test]
async fn failed_login_yields_a_failure_envelope_not_a_panic() {
    // No form at all: the driver must come back with success=false and a
    // populated error, never an Err or a panic.
    let dom = Arc::new(FakeDom::new("/"));
    let driver = test_driver(dom);

    let result = driver.login("user@example.com", "secret", false).await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(!result.message.is_empty());
    assert!(result.data.is_none());
}

#[tokio::test]
async fn stuck_on_login_page_is_a_hard_failure() {
    let dom = Arc::new(FakeDom::new("/login"));
    dom.add(Node::new("input").sel("input[type='email']"));
    dom.add(Node::new("input").sel("input[type='password']"));
    // Submit goes nowhere.
    dom.add(Node::new("button").sel("form button[type='submit']"));
    let driver = test_driver(dom);

    let result = driver.login("user@example.com", "wrong", false).await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("login page"));
}

#[tokio::test]
async fn login_hoists_error_toast_text_verbatim() {
    let dom = Arc::new(FakeDom::new("/login"));
    dom.add(Node::new("input").sel("input[type='email']"));
    dom.add(Node::new("input").sel("input[type='password']"));
    let toast = dom.add(
        Node::new("div")
            .sel("[data-testid='toast-error']")
            .text("Invalid credentials")
            .absent(),
    );
    dom.add(
        Node::new("button")
            .sel("form button[type='submit']")
            .on(Trigger::Click, Action::Reveal(toast)),
    );
    let driver = test_driver(dom);

    let result = driver.login("user@example.com", "wrong", false).await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Invalid credentials"));
}

#[tokio::test]
async fn logout_when_already_logged_out_is_a_success() {
    let dom = Arc::new(FakeDom::new("/login"));
    let driver = test_driver(dom);

    let result = driver.logout().await;
    assert!(result.success);
    assert!(result.message.contains("Already logged out"));
}

#[tokio::test]
async fn logout_finds_the_menu_item_by_text() {
    let dom = Arc::new(FakeDom::new("/dashboard"));
    let menu = dom.add(Node::new("button").sel("[data-testid='user-menu']"));
    let settings = dom.add(Node::new("div").sel("[role='menuitem']").text("Settings").absent());
    let logout = dom.add(
        Node::new("div")
            .sel("[role='menuitem']")
            .text("Log out")
            .absent()
            .on(Trigger::Click, Action::Navigate("/login".to_string())),
    );
    dom.update(menu, |n| {
        *n = Node::new("button")
            .sel("[data-testid='user-menu']")
            .on(Trigger::Click, Action::RevealMany(vec![settings, logout]));
    });
    let driver = test_driver(dom);

    let result = driver.logout().await;
    assert!(result.success, "logout failed: {:?}", result.error);
    assert_eq!(result.data.unwrap()["redirected_to"], "/login");
}

#[tokio::test]
async fn initialize_reports_path_context_and_auth() {
    let dom = Arc::new(FakeDom::new("/acme/website-redesign"));
    dom.add(Node::new("div").sel("[data-testid='user-menu']"));
    let driver = test_driver(dom);

    let result = driver.initialize().await;
    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data["path"], "/acme/website-redesign");
    assert_eq!(data["context"]["type"], "project");
    assert_eq!(data["context"]["workspace_slug"], "acme");
    assert_eq!(data["authenticated"], true);
}

#[tokio::test]
async fn global_registration_is_idempotent() {
    let dom = Arc::new(FakeDom::new("/"));
    let first = Arc::new(test_driver(dom.clone()));
    let second = Arc::new(test_driver(dom));

    let registered_first = crate::Driver::register_global(first);
    let registered_second = crate::Driver::register_global(second);

    // Only the first registration wins, and a driver is reachable afterwards.
    assert!(registered_first);
    assert!(!registered_second);
    assert!(crate::Driver::global().is_some());
}
