use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, instrument};

use crate::element::Element;
use crate::engine::{DomEngine, DomNode};
use crate::errors::AutomationError;
use crate::selector::Selector;

/// Default deadline when no timeout is given, matching the JS driver's 10 s.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Fixed poll interval for every waiting primitive.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A high-level handle for finding and waiting on elements.
///
/// Resolution is a poll loop: an immediate check, then a re-query every
/// [`POLL_INTERVAL`] until the deadline. Fallback chains are resolved within
/// each round so a later candidate appearing early still wins its round.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn DomEngine>,
    selector: Selector,
    root: Option<DomNode>,
    timeout: Duration,
}

impl Locator {
    pub(crate) fn new(engine: Arc<dyn DomEngine>, selector: Selector) -> Self {
        Self {
            engine,
            selector,
            root: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Scope queries under an already-located element (e.g. a modal subtree).
    pub fn within(mut self, root: &Element) -> Self {
        self.root = Some(*root.node());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Single immediate resolution attempt, no waiting.
    pub async fn find(&self) -> Result<Option<Element>, AutomationError> {
        Ok(self
            .resolve(&self.selector)
            .await?
            .map(|n| Element::new(self.engine.clone(), n)))
    }

    /// All current matches, no waiting. For fallback chains this returns the
    /// matches of the first candidate that has any.
    pub async fn all(&self) -> Result<Vec<Element>, AutomationError> {
        let nodes = self.resolve_all(&self.selector).await?;
        Ok(nodes
            .into_iter()
            .map(|n| Element::new(self.engine.clone(), n))
            .collect())
    }

    /// Wait for the first match, up to the timeout.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<Element, AutomationError> {
        let deadline = Instant::now() + timeout.unwrap_or(self.timeout);
        loop {
            if let Some(node) = self.resolve(&self.selector).await? {
                return Ok(Element::new(self.engine.clone(), node));
            }
            if Instant::now() >= deadline {
                debug!(selector = %self.selector, "element wait timed out");
                return Err(AutomationError::Timeout(format!(
                    "element matching `{}` did not appear within {:?}",
                    self.selector,
                    timeout.unwrap_or(self.timeout)
                )));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until the element exists *and* is visible and enabled.
    pub async fn wait_ready(&self, timeout: Option<Duration>) -> Result<Element, AutomationError> {
        let effective = timeout.unwrap_or(self.timeout);
        let deadline = Instant::now() + effective;
        let element = self.wait(Some(effective)).await?;
        loop {
            if element.is_visible().await? && element.is_enabled().await? {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::Timeout(format!(
                    "element matching `{}` never became ready within {effective:?}",
                    self.selector
                )));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// One resolution round for a selector, honoring fallback order.
    async fn resolve(&self, selector: &Selector) -> Result<Option<DomNode>, AutomationError> {
        match selector {
            Selector::Css(css) => self.engine.query(css, self.root.as_ref()).await,
            Selector::Text { text, tag, exact } => {
                let expr = Selector::text_xpath(text, tag.as_deref(), *exact);
                Ok(self.engine.query_xpath(&expr).await?.into_iter().next())
            }
            Selector::XPath(expr) => {
                Ok(self.engine.query_xpath(expr).await?.into_iter().next())
            }
            Selector::Fallback(candidates) => {
                for candidate in candidates {
                    if let Some(node) = Box::pin(self.resolve(candidate)).await? {
                        return Ok(Some(node));
                    }
                }
                Ok(None)
            }
            Selector::Invalid(reason) => {
                Err(AutomationError::InvalidSelector(reason.clone()))
            }
        }
    }

    async fn resolve_all(&self, selector: &Selector) -> Result<Vec<DomNode>, AutomationError> {
        match selector {
            Selector::Css(css) => self.engine.query_all(css, self.root.as_ref()).await,
            Selector::Text { text, tag, exact } => {
                let expr = Selector::text_xpath(text, tag.as_deref(), *exact);
                self.engine.query_xpath(&expr).await
            }
            Selector::XPath(expr) => self.engine.query_xpath(expr).await,
            Selector::Fallback(candidates) => {
                for candidate in candidates {
                    let nodes = Box::pin(self.resolve_all(candidate)).await?;
                    if !nodes.is_empty() {
                        return Ok(nodes);
                    }
                }
                Ok(Vec::new())
            }
            Selector::Invalid(reason) => {
                Err(AutomationError::InvalidSelector(reason.clone()))
            }
        }
    }
}
