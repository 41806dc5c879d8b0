use std::sync::Arc;

use crate::engine::{DomEngine, DomNode, SyntheticEvent};
use crate::errors::AutomationError;

/// A located UI control: a node handle bound to the engine that found it.
///
/// Elements are discovered fresh on every operation and never cached across
/// calls; the discovering function is the only party that mutates one, and
/// the handle is dropped when it returns.
#[derive(Clone)]
pub struct Element {
    engine: Arc<dyn DomEngine>,
    node: DomNode,
}

impl Element {
    pub(crate) fn new(engine: Arc<dyn DomEngine>, node: DomNode) -> Self {
        Self { engine, node }
    }

    pub fn node(&self) -> &DomNode {
        &self.node
    }

    pub async fn tag_name(&self) -> Result<String, AutomationError> {
        self.engine.tag_name(&self.node).await
    }

    pub async fn text(&self) -> Result<String, AutomationError> {
        self.engine.text_content(&self.node).await
    }

    pub async fn value(&self) -> Result<String, AutomationError> {
        self.engine.value(&self.node).await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        self.engine.attribute(&self.node, name).await
    }

    pub async fn is_visible(&self) -> Result<bool, AutomationError> {
        self.engine.is_visible(&self.node).await
    }

    pub async fn is_enabled(&self) -> Result<bool, AutomationError> {
        self.engine.is_enabled(&self.node).await
    }

    pub async fn is_checked(&self) -> Result<bool, AutomationError> {
        self.engine.is_checked(&self.node).await
    }

    pub async fn bounds(&self) -> Result<(f64, f64, f64, f64), AutomationError> {
        self.engine.bounds(&self.node).await
    }

    pub async fn focus(&self) -> Result<(), AutomationError> {
        self.engine.focus(&self.node).await
    }

    pub async fn blur(&self) -> Result<(), AutomationError> {
        self.engine.blur(&self.node).await
    }

    pub async fn scroll_into_view(&self) -> Result<(), AutomationError> {
        self.engine.scroll_into_view(&self.node).await
    }

    pub async fn set_native_value(&self, value: &str) -> Result<(), AutomationError> {
        self.engine.set_native_value(&self.node, value).await
    }

    pub async fn dispatch(&self, event: &SyntheticEvent) -> Result<(), AutomationError> {
        self.engine.dispatch(&self.node, event).await
    }

    pub async fn invoke_framework_change(&self, value: &str) -> Result<bool, AutomationError> {
        self.engine.invoke_framework_change(&self.node, value).await
    }

    /// First CSS match scoped under this element.
    pub async fn query(&self, css: &str) -> Result<Option<Element>, AutomationError> {
        Ok(self
            .engine
            .query(css, Some(&self.node))
            .await?
            .map(|n| Element::new(self.engine.clone(), n)))
    }

    /// All CSS matches scoped under this element.
    pub async fn query_all(&self, css: &str) -> Result<Vec<Element>, AutomationError> {
        Ok(self
            .engine
            .query_all(css, Some(&self.node))
            .await?
            .into_iter()
            .map(|n| Element::new(self.engine.clone(), n))
            .collect())
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element").field("node", &self.node).finish()
    }
}
