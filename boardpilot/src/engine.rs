//! The seam between the automation core and the live page.
//!
//! Everything above this trait reasons about "the DOM" abstractly; the concrete
//! implementation ([`cdp::CdpEngine`]) talks to a real browser tab over the
//! Chrome DevTools Protocol. Tests substitute an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AutomationError;

pub mod cdp;

/// Opaque handle to a located DOM node.
///
/// Handles are discovered fresh on every operation and discarded when it
/// returns; they are never cached across operations. A handle may go stale
/// after navigation, in which case engine calls report `ElementNotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomNode(pub u64);

/// Keyboard modifier flags for synthesized key events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// A synthetic DOM event, dispatched through the engine at a specific node.
///
/// The variants mirror the native event constructors the host framework
/// listens for; the *order* in which they are dispatched is owned by
/// [`crate::events`], not by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyntheticEvent {
    /// `InputEvent` with `inputType: insertText`; `data` carries the text,
    /// or `None` for a deletion (clearing a field).
    Input { data: Option<String> },
    Change,
    Focus,
    Blur,
    MouseDown { x: f64, y: f64 },
    MouseUp { x: f64, y: f64 },
    Click { x: f64, y: f64 },
    DblClick { x: f64, y: f64 },
    KeyDown { key: String, modifiers: KeyModifiers },
    KeyUp { key: String, modifiers: KeyModifiers },
}

/// Live-DOM access and navigation, as consumed by the automation core.
///
/// The page is an external, uncontrolled environment: implementations must
/// treat every query as a fresh look at current state and must not cache
/// node lookups on behalf of callers.
#[async_trait]
pub trait DomEngine: Send + Sync {
    /// First match for a CSS selector, optionally scoped under `root`.
    async fn query(
        &self,
        css: &str,
        root: Option<&DomNode>,
    ) -> Result<Option<DomNode>, AutomationError>;

    /// All matches for a CSS selector, optionally scoped under `root`.
    async fn query_all(
        &self,
        css: &str,
        root: Option<&DomNode>,
    ) -> Result<Vec<DomNode>, AutomationError>;

    /// Document-ordered matches for an XPath expression (document scope).
    async fn query_xpath(&self, expr: &str) -> Result<Vec<DomNode>, AutomationError>;

    async fn tag_name(&self, node: &DomNode) -> Result<String, AutomationError>;
    async fn text_content(&self, node: &DomNode) -> Result<String, AutomationError>;
    /// Current `value` property for form controls; empty string otherwise.
    async fn value(&self, node: &DomNode) -> Result<String, AutomationError>;
    async fn attribute(
        &self,
        node: &DomNode,
        name: &str,
    ) -> Result<Option<String>, AutomationError>;

    async fn is_visible(&self, node: &DomNode) -> Result<bool, AutomationError>;
    async fn is_enabled(&self, node: &DomNode) -> Result<bool, AutomationError>;
    async fn is_checked(&self, node: &DomNode) -> Result<bool, AutomationError>;
    /// Bounding box as (x, y, width, height) in viewport coordinates.
    async fn bounds(&self, node: &DomNode) -> Result<(f64, f64, f64, f64), AutomationError>;

    async fn focus(&self, node: &DomNode) -> Result<(), AutomationError>;
    async fn blur(&self, node: &DomNode) -> Result<(), AutomationError>;
    async fn scroll_into_view(&self, node: &DomNode) -> Result<(), AutomationError>;

    /// Assign `value` through the element's *prototype-level* value setter,
    /// bypassing any per-instance accessor the rendering framework installed.
    /// Does not dispatch any event; see [`crate::events::set_controlled_value`].
    async fn set_native_value(&self, node: &DomNode, value: &str)
        -> Result<(), AutomationError>;

    /// Dispatch one synthetic event at the node.
    async fn dispatch(
        &self,
        node: &DomNode,
        event: &SyntheticEvent,
    ) -> Result<(), AutomationError>;

    /// Invoke the framework-injected `onChange` prop directly, if the node
    /// carries one. Returns whether a handler was found and called.
    async fn invoke_framework_change(
        &self,
        node: &DomNode,
        value: &str,
    ) -> Result<bool, AutomationError>;

    /// Current `location.pathname` (plus query string, if any).
    async fn current_path(&self) -> Result<String, AutomationError>;

    /// Navigate to an app-relative path, preferring a host-framework router
    /// object on the global if present, falling back to a hard location
    /// assignment.
    async fn navigate(&self, path: &str) -> Result<(), AutomationError>;

    /// Cheap liveness probe; used by `Driver::initialize`.
    async fn ping(&self) -> Result<(), AutomationError>;
}
