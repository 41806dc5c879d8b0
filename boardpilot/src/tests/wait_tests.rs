use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::DomEngine;
use crate::errors::AutomationError;
use crate::tests::fake_dom::{FakeDom, Node};
use crate::wait::{retry_with_backoff, wait_for_element, wait_for_elements};

fn engine(dom: FakeDom) -> Arc<dyn DomEngine> {
    Arc::new(dom)
}

#[tokio::test]
async fn wait_for_element_times_out_no_earlier_than_deadline() {
    let dom = engine(FakeDom::new("/"));
    let started = Instant::now();
    let result = wait_for_element(&dom, "#never-exists", Duration::from_millis(500)).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(AutomationError::Timeout(_))));
    assert!(elapsed >= Duration::from_millis(500), "rejected early: {elapsed:?}");
    // No later than the deadline plus one polling interval, with scheduling slack.
    assert!(elapsed < Duration::from_millis(750), "rejected late: {elapsed:?}");
}

#[tokio::test]
async fn wait_for_element_resolves_once_node_appears() {
    let dom = FakeDom::new("/");
    dom.add(Node::new("div").sel("#target"));
    let dom = engine(dom);
    let found = wait_for_element(&dom, "#target", Duration::from_millis(200)).await;
    assert!(found.is_ok());
}

#[tokio::test]
async fn wait_for_elements_fails_when_any_selector_is_missing() {
    let dom = FakeDom::new("/");
    dom.add(Node::new("div").sel("#a"));
    let dom = engine(dom);

    let both = wait_for_elements(&dom, &["#a"], Duration::from_millis(200)).await;
    assert_eq!(both.unwrap().len(), 1);

    let partial = wait_for_elements(&dom, &["#a", "#missing"], Duration::from_millis(200)).await;
    assert!(partial.is_err());
}

#[tokio::test]
async fn retry_backoff_invokes_exactly_max_retries_and_waits_geometrically() {
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), _> = retry_with_backoff(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AutomationError::Timeout("still failing".to_string())) }
        },
        3,
        Duration::from_millis(100),
    )
    .await;
    let elapsed = started.elapsed();

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Delays before attempts 2 and 3: 100 ms + 200 ms.
    assert!(elapsed >= Duration::from_millis(300), "backoff too short: {elapsed:?}");
}

#[tokio::test]
async fn retry_backoff_stops_on_first_success() {
    let calls = AtomicU32::new(0);
    let result = retry_with_backoff(
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 1 {
                    Err(AutomationError::Timeout("first try fails".to_string()))
                } else {
                    Ok(n)
                }
            }
        },
        5,
        Duration::from_millis(10),
    )
    .await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
