//! Low-level wait/poll primitives.
//!
//! Each primitive is a single-shot future: it settles by resolving or by a
//! timeout rejection, and cannot be cancelled mid-flight by the caller. All
//! polling is sleep-based, so there are no observers or intervals to clean up
//! on either path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::element::Element;
use crate::engine::DomEngine;
use crate::errors::AutomationError;
use crate::locator::{Locator, POLL_INTERVAL};
use crate::selector::Selector;

/// Wait for the first element matching `selector` to appear.
pub async fn wait_for_element(
    engine: &Arc<dyn DomEngine>,
    selector: impl Into<Selector>,
    timeout: Duration,
) -> Result<Element, AutomationError> {
    Locator::new(engine.clone(), selector.into())
        .wait(Some(timeout))
        .await
}

/// Wait concurrently for every selector; fails as soon as any one fails.
pub async fn wait_for_elements(
    engine: &Arc<dyn DomEngine>,
    selectors: &[&str],
    timeout: Duration,
) -> Result<Vec<Element>, AutomationError> {
    let waits = selectors
        .iter()
        .map(|s| wait_for_element(engine, *s, timeout));
    try_join_all(waits).await
}

/// Wait for the element to exist, be visible, and be enabled.
pub async fn wait_for_element_ready(
    engine: &Arc<dyn DomEngine>,
    selector: impl Into<Selector>,
    timeout: Duration,
) -> Result<Element, AutomationError> {
    Locator::new(engine.clone(), selector.into())
        .wait_ready(Some(timeout))
        .await
}

/// Poll the current path until it contains `fragment`.
pub async fn wait_for_navigation(
    engine: &Arc<dyn DomEngine>,
    fragment: &str,
    timeout: Duration,
) -> Result<String, AutomationError> {
    let deadline = Instant::now() + timeout;
    loop {
        let path = engine.current_path().await?;
        if path.contains(fragment) {
            return Ok(path);
        }
        if Instant::now() >= deadline {
            return Err(AutomationError::Timeout(format!(
                "navigation to a path containing `{fragment}` did not happen within {timeout:?} (still at `{path}`)"
            )));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Poll until none of the given modal/dialog selectors is visible.
pub async fn wait_for_modal_close(
    engine: &Arc<dyn DomEngine>,
    modal_selectors: &[String],
    timeout: Duration,
) -> Result<(), AutomationError> {
    let deadline = Instant::now() + timeout;
    loop {
        let mut any_open = false;
        for selector in modal_selectors {
            if let Some(node) = engine.query(selector, None).await? {
                if engine.is_visible(&node).await? {
                    any_open = true;
                    break;
                }
            }
        }
        if !any_open {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(AutomationError::Timeout(format!(
                "a modal dialog was still open after {timeout:?}"
            )));
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Fixed delay.
pub async fn wait_for(ms: u64) {
    sleep(Duration::from_millis(ms)).await;
}

/// Run `operation`, retrying on failure with exponential backoff.
///
/// `operation` is invoked up to `max_retries` times in total; the delay
/// before attempt `n` (zero-based) is `base_delay * 2^(n-1)`. The last error
/// is returned once attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    mut operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, AutomationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AutomationError>>,
{
    let mut last_error = None;
    for attempt in 0..max_retries {
        if attempt > 0 {
            let delay = base_delay * 2u32.pow(attempt - 1);
            debug!(attempt, ?delay, "retrying after backoff");
            sleep(delay).await;
        }
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error
        .unwrap_or_else(|| AutomationError::InvalidArgument("max_retries was zero".to_string())))
}
