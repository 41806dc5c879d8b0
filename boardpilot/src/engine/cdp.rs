//! Chrome DevTools Protocol implementation of [`DomEngine`].
//!
//! Every primitive is a small JavaScript evaluation against the live page. A
//! page-side registry (`window.__bpa`) maps integer handles to element
//! references; the registry is wiped by navigation, so stale handles surface
//! as `ElementNotFound` — which matches the contract that node handles are
//! never reused across operations.

use std::sync::Arc;

use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tokio::task;
use tracing::{debug, warn};

use crate::engine::{DomEngine, DomNode, SyntheticEvent};
use crate::errors::AutomationError;

/// Installed once per document. `hold` deduplicates, so repeated queries for
/// the same element return the same handle within one document lifetime.
const HELPER_JS: &str = r#"
(() => {
  if (window.__bpa) return "ok";
  const reg = new Map();
  let next = 1;
  window.__bpa = {
    hold(el) {
      if (!el) return 0;
      for (const [k, v] of reg) { if (v === el) return k; }
      const id = next++;
      reg.set(id, el);
      return id;
    },
    get(id) { return reg.get(id) || null; },
    visible(el) {
      if (!el || !el.isConnected) return false;
      if (el.hasAttribute && el.hasAttribute("hidden")) return false;
      const s = getComputedStyle(el);
      if (s.display === "none" || s.visibility === "hidden" || s.opacity === "0") return false;
      const r = el.getBoundingClientRect();
      return r.width > 0 && r.height > 0;
    },
    setNative(el, v) {
      const proto = el instanceof HTMLTextAreaElement
        ? HTMLTextAreaElement.prototype
        : HTMLInputElement.prototype;
      const d = Object.getOwnPropertyDescriptor(proto, "value");
      if (d && d.set) { d.set.call(el, v); } else { el.value = v; }
    },
    reactChange(el, v) {
      const key = Object.keys(el).find(k =>
        k.startsWith("__reactProps$") || k.startsWith("__reactEventHandlers$"));
      const props = key ? el[key] : null;
      if (props && typeof props.onChange === "function") {
        props.onChange({ target: el, currentTarget: el });
        return true;
      }
      return false;
    },
    xpath(expr) {
      const out = [];
      const it = document.evaluate(expr, document, null,
        XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      for (let i = 0; i < it.snapshotLength; i++) out.push(this.hold(it.snapshotItem(i)));
      return out;
    },
  };
  return "ok";
})()
"#;

pub struct CdpEngine {
    // Kept alive for the lifetime of the engine when we launched the browser
    // ourselves; None when attached to an external browser endpoint.
    _browser: Option<Browser>,
    tab: Arc<Tab>,
    base_url: String,
}

impl CdpEngine {
    /// Launch a fresh headless browser pointed at `base_url`.
    pub fn launch(base_url: &str) -> Result<Self, AutomationError> {
        let options = LaunchOptions {
            headless: true,
            ..Default::default()
        };
        let browser = Browser::new(options)
            .map_err(|e| AutomationError::EngineError(format!("browser launch failed: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| AutomationError::EngineError(format!("tab creation failed: {e}")))?;
        tab.navigate_to(base_url)
            .map_err(|e| AutomationError::EngineError(format!("initial navigation failed: {e}")))?;
        Ok(Self {
            _browser: Some(browser),
            tab,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Attach to an already-running browser's debugging endpoint and drive
    /// its first tab (or a new one when none exist).
    pub fn connect(debug_url: &str, base_url: &str) -> Result<Self, AutomationError> {
        let browser = Browser::connect(debug_url.to_string())
            .map_err(|e| AutomationError::EngineError(format!("browser attach failed: {e}")))?;
        let first = {
            let tabs = browser.get_tabs();
            let guard = tabs
                .lock()
                .map_err(|_| AutomationError::EngineError("tab list poisoned".into()))?;
            guard.first().cloned()
        };
        let tab = match first {
            Some(t) => t,
            None => browser.new_tab().map_err(|e| {
                AutomationError::EngineError(format!("tab creation failed: {e}"))
            })?,
        };
        Ok(Self {
            _browser: Some(browser),
            tab,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Evaluate a JS expression that ends in `JSON.stringify(...)` and decode
    /// the result. `headless_chrome` is a blocking client, so evaluation runs
    /// on the blocking pool to avoid stalling the runtime.
    async fn eval(&self, js: String) -> Result<Value, AutomationError> {
        let tab = self.tab.clone();
        let raw = task::spawn_blocking(move || {
            tab.evaluate(HELPER_JS, false)
                .and_then(|_| tab.evaluate(&js, false))
        })
        .await
        .map_err(|e| AutomationError::EngineError(format!("join error: {e}")))?
        .map_err(|e| AutomationError::EngineError(format!("evaluate failed: {e}")))?;

        let text = raw
            .value
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| "null".to_string());
        Ok(serde_json::from_str(&text)?)
    }

    async fn eval_node(&self, js: String) -> Result<Option<DomNode>, AutomationError> {
        match self.eval(js).await?.as_u64() {
            Some(0) | None => Ok(None),
            Some(id) => Ok(Some(DomNode(id))),
        }
    }

    /// JS expression resolving the element for a handle, throwing on stale.
    fn node_expr(node: &DomNode) -> String {
        format!(
            "(() => {{ const el = window.__bpa.get({}); if (!el || !el.isConnected) throw new Error('stale node'); return el; }})()",
            node.0
        )
    }

    fn root_expr(root: Option<&DomNode>) -> String {
        match root {
            Some(n) => Self::node_expr(n),
            None => "document".to_string(),
        }
    }
}

fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

fn event_dispatch_js(node: &DomNode, event: &SyntheticEvent) -> String {
    let target = CdpEngine::node_expr(node);
    let body = match event {
        SyntheticEvent::Input { data } => {
            let data_js = match data {
                Some(d) => js_str(d),
                None => "null".to_string(),
            };
            format!(
                "el.dispatchEvent(new InputEvent('input', {{ bubbles: true, composed: true, inputType: 'insertText', data: {data_js} }}));"
            )
        }
        SyntheticEvent::Change => {
            "el.dispatchEvent(new Event('change', { bubbles: true }));".to_string()
        }
        SyntheticEvent::Focus => {
            "el.dispatchEvent(new FocusEvent('focus', { bubbles: false }));".to_string()
        }
        SyntheticEvent::Blur => {
            "el.dispatchEvent(new FocusEvent('blur', { bubbles: false }));".to_string()
        }
        SyntheticEvent::MouseDown { x, y }
        | SyntheticEvent::MouseUp { x, y }
        | SyntheticEvent::Click { x, y }
        | SyntheticEvent::DblClick { x, y } => {
            let kind = match event {
                SyntheticEvent::MouseDown { .. } => "mousedown",
                SyntheticEvent::MouseUp { .. } => "mouseup",
                SyntheticEvent::Click { .. } => "click",
                _ => "dblclick",
            };
            format!(
                "el.dispatchEvent(new MouseEvent('{kind}', {{ bubbles: true, cancelable: true, view: window, clientX: {x}, clientY: {y}, button: 0 }}));"
            )
        }
        SyntheticEvent::KeyDown { key, modifiers } | SyntheticEvent::KeyUp { key, modifiers } => {
            let kind = if matches!(event, SyntheticEvent::KeyDown { .. }) {
                "keydown"
            } else {
                "keyup"
            };
            format!(
                "el.dispatchEvent(new KeyboardEvent('{kind}', {{ bubbles: true, cancelable: true, key: {key}, ctrlKey: {ctrl}, altKey: {alt}, shiftKey: {shift}, metaKey: {meta} }}));",
                key = js_str(key),
                ctrl = modifiers.ctrl,
                alt = modifiers.alt,
                shift = modifiers.shift,
                meta = modifiers.meta,
            )
        }
    };
    format!("(() => {{ const el = {target}; {body} return JSON.stringify(true); }})()")
}

#[async_trait::async_trait]
impl DomEngine for CdpEngine {
    async fn query(
        &self,
        css: &str,
        root: Option<&DomNode>,
    ) -> Result<Option<DomNode>, AutomationError> {
        let js = format!(
            "(() => {{ const root = {root}; const el = root.querySelector({sel}); return JSON.stringify(window.__bpa.hold(el)); }})()",
            root = Self::root_expr(root),
            sel = js_str(css),
        );
        self.eval_node(js).await
    }

    async fn query_all(
        &self,
        css: &str,
        root: Option<&DomNode>,
    ) -> Result<Vec<DomNode>, AutomationError> {
        let js = format!(
            "(() => {{ const root = {root}; const out = []; for (const el of root.querySelectorAll({sel})) out.push(window.__bpa.hold(el)); return JSON.stringify(out); }})()",
            root = Self::root_expr(root),
            sel = js_str(css),
        );
        let ids: Vec<u64> = serde_json::from_value(self.eval(js).await?)?;
        Ok(ids.into_iter().map(DomNode).collect())
    }

    async fn query_xpath(&self, expr: &str) -> Result<Vec<DomNode>, AutomationError> {
        let js = format!(
            "JSON.stringify(window.__bpa.xpath({}))",
            js_str(expr)
        );
        let ids: Vec<u64> = serde_json::from_value(self.eval(js).await?)?;
        Ok(ids.into_iter().map(DomNode).collect())
    }

    async fn tag_name(&self, node: &DomNode) -> Result<String, AutomationError> {
        let js = format!(
            "JSON.stringify({}.tagName.toLowerCase())",
            Self::node_expr(node)
        );
        Ok(self.eval(js).await?.as_str().unwrap_or_default().to_string())
    }

    async fn text_content(&self, node: &DomNode) -> Result<String, AutomationError> {
        let js = format!(
            "JSON.stringify(({}.textContent || '').trim())",
            Self::node_expr(node)
        );
        Ok(self.eval(js).await?.as_str().unwrap_or_default().to_string())
    }

    async fn value(&self, node: &DomNode) -> Result<String, AutomationError> {
        let js = format!(
            "JSON.stringify(String({}.value ?? ''))",
            Self::node_expr(node)
        );
        Ok(self.eval(js).await?.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(
        &self,
        node: &DomNode,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        let js = format!(
            "JSON.stringify({}.getAttribute({}))",
            Self::node_expr(node),
            js_str(name)
        );
        Ok(self
            .eval(js)
            .await?
            .as_str()
            .map(str::to_owned))
    }

    async fn is_visible(&self, node: &DomNode) -> Result<bool, AutomationError> {
        let js = format!(
            "JSON.stringify(window.__bpa.visible({}))",
            Self::node_expr(node)
        );
        Ok(self.eval(js).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, node: &DomNode) -> Result<bool, AutomationError> {
        let js = format!(
            "(() => {{ const el = {}; return JSON.stringify(!el.disabled && el.getAttribute('aria-disabled') !== 'true'); }})()",
            Self::node_expr(node)
        );
        Ok(self.eval(js).await?.as_bool().unwrap_or(false))
    }

    async fn is_checked(&self, node: &DomNode) -> Result<bool, AutomationError> {
        let js = format!(
            "JSON.stringify(!!{}.checked)",
            Self::node_expr(node)
        );
        Ok(self.eval(js).await?.as_bool().unwrap_or(false))
    }

    async fn bounds(&self, node: &DomNode) -> Result<(f64, f64, f64, f64), AutomationError> {
        let js = format!(
            "(() => {{ const r = {}.getBoundingClientRect(); return JSON.stringify([r.x, r.y, r.width, r.height]); }})()",
            Self::node_expr(node)
        );
        let b: (f64, f64, f64, f64) = serde_json::from_value(self.eval(js).await?)?;
        Ok(b)
    }

    async fn focus(&self, node: &DomNode) -> Result<(), AutomationError> {
        let js = format!(
            "(() => {{ const el = {}; if (el.focus) el.focus(); return JSON.stringify(true); }})()",
            Self::node_expr(node)
        );
        self.eval(js).await.map(|_| ())
    }

    async fn blur(&self, node: &DomNode) -> Result<(), AutomationError> {
        let js = format!(
            "(() => {{ const el = {}; if (el.blur) el.blur(); el.dispatchEvent(new FocusEvent('blur')); return JSON.stringify(true); }})()",
            Self::node_expr(node)
        );
        self.eval(js).await.map(|_| ())
    }

    async fn scroll_into_view(&self, node: &DomNode) -> Result<(), AutomationError> {
        let js = format!(
            "(() => {{ {}.scrollIntoView({{ block: 'center', inline: 'center' }}); return JSON.stringify(true); }})()",
            Self::node_expr(node)
        );
        self.eval(js).await.map(|_| ())
    }

    async fn set_native_value(
        &self,
        node: &DomNode,
        value: &str,
    ) -> Result<(), AutomationError> {
        let js = format!(
            "(() => {{ const el = {}; window.__bpa.setNative(el, {}); return JSON.stringify(true); }})()",
            Self::node_expr(node),
            js_str(value)
        );
        self.eval(js).await.map(|_| ())
    }

    async fn dispatch(
        &self,
        node: &DomNode,
        event: &SyntheticEvent,
    ) -> Result<(), AutomationError> {
        debug!(?event, node = node.0, "dispatching synthetic event");
        self.eval(event_dispatch_js(node, event)).await.map(|_| ())
    }

    async fn invoke_framework_change(
        &self,
        node: &DomNode,
        value: &str,
    ) -> Result<bool, AutomationError> {
        let js = format!(
            "JSON.stringify(window.__bpa.reactChange({}, {}))",
            Self::node_expr(node),
            js_str(value)
        );
        Ok(self.eval(js).await?.as_bool().unwrap_or(false))
    }

    async fn current_path(&self) -> Result<String, AutomationError> {
        let js = "JSON.stringify(window.location.pathname + window.location.search)".to_string();
        Ok(self.eval(js).await?.as_str().unwrap_or("/").to_string())
    }

    async fn navigate(&self, path: &str) -> Result<(), AutomationError> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            path.to_string()
        };
        // Prefer the host app's client-side router so in-app state survives;
        // fall back to a hard assignment, and to a protocol-level navigation
        // if the page cannot evaluate scripts at all.
        let js = format!(
            "(() => {{ const r = window.__APP_ROUTER__ || (window.next && window.next.router); if (r && typeof r.push === 'function') {{ r.push({path}); }} else {{ window.location.href = {url}; }} return JSON.stringify(true); }})()",
            path = js_str(path),
            url = js_str(&url),
        );
        if let Err(e) = self.eval(js).await {
            warn!(error = %e, "router navigation failed, using protocol navigation");
            let tab = self.tab.clone();
            task::spawn_blocking(move || tab.navigate_to(&url).map(|_| ()))
                .await
                .map_err(|e| AutomationError::EngineError(format!("join error: {e}")))?
                .map_err(|e| AutomationError::EngineError(format!("navigation failed: {e}")))?;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AutomationError> {
        let ok = self
            .eval("JSON.stringify(typeof document !== 'undefined')".to_string())
            .await?;
        if ok.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(AutomationError::EngineError(
                "no live document in target tab".to_string(),
            ))
        }
    }
}
