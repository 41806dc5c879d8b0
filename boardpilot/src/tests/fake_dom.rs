//! In-memory `DomEngine` for unit tests: a flat node store with exact-string
//! CSS matching, the two text-XPath shapes the selector layer emits, and
//! scriptable event hooks (click reveals a node, navigates, etc.).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::engine::{DomEngine, DomNode, SyntheticEvent};
use crate::errors::AutomationError;
use crate::rest::{ProjectDirectory, ProjectRecord, StatusRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    MouseDown,
    EnterKey,
}

#[derive(Debug, Clone)]
pub enum Action {
    Navigate(String),
    Reveal(u64),
    RevealMany(Vec<u64>),
    Remove(u64),
}

#[derive(Clone)]
pub struct Node {
    tag: String,
    selectors: Vec<String>,
    text: String,
    value: String,
    attrs: HashMap<String, String>,
    visible: bool,
    enabled: bool,
    checked: bool,
    present: bool,
    parent: Option<u64>,
    /// Enabled only while the referenced node's value equals the string.
    enabled_gate: Option<(u64, String)>,
    hooks: Vec<(Trigger, Action)>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            selectors: Vec::new(),
            text: String::new(),
            value: String::new(),
            attrs: HashMap::new(),
            visible: true,
            enabled: true,
            checked: false,
            present: true,
            parent: None,
            enabled_gate: None,
            hooks: Vec::new(),
        }
    }

    pub fn sel(mut self, css: &str) -> Self {
        self.selectors.push(css.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn parent(mut self, id: u64) -> Self {
        self.parent = Some(id);
        self
    }

    pub fn absent(mut self) -> Self {
        self.present = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn gate(mut self, input: u64, expected: &str) -> Self {
        self.enabled_gate = Some((input, expected.to_string()));
        self
    }

    pub fn on(mut self, trigger: Trigger, action: Action) -> Self {
        self.hooks.push((trigger, action));
        self
    }
}

struct State {
    path: String,
    nodes: HashMap<u64, Node>,
    next_id: u64,
    events: Vec<(u64, String)>,
}

pub struct FakeDom {
    state: Mutex<State>,
}

impl FakeDom {
    pub fn new(path: &str) -> Self {
        Self {
            state: Mutex::new(State {
                path: path.to_string(),
                nodes: HashMap::new(),
                next_id: 1,
                events: Vec::new(),
            }),
        }
    }

    pub fn add(&self, node: Node) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(id, node);
        id
    }

    /// Attach hooks to an already-added node (for cycles like "the button's
    /// gate references an input added later").
    pub fn update(&self, id: u64, f: impl FnOnce(&mut Node)) {
        let mut state = self.state.lock().unwrap();
        if let Some(node) = state.nodes.get_mut(&id) {
            f(node);
        }
    }

    pub fn set_path(&self, path: &str) {
        self.state.lock().unwrap().path = path.to_string();
    }

    pub fn events(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn value_of(&self, id: u64) -> String {
        self.state.lock().unwrap().nodes[&id].value.clone()
    }

    fn matching(&self, css: &str, root: Option<u64>) -> Vec<u64> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<u64> = state
            .nodes
            .iter()
            .filter(|(id, node)| {
                node.present
                    && node.selectors.iter().any(|s| s == css)
                    && root.map_or(true, |r| is_descendant(&state.nodes, **id, r))
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn run_hooks(&self, id: u64, trigger: Trigger) {
        let actions: Vec<Action> = {
            let state = self.state.lock().unwrap();
            match state.nodes.get(&id) {
                Some(node) => node
                    .hooks
                    .iter()
                    .filter(|(t, _)| *t == trigger)
                    .map(|(_, a)| a.clone())
                    .collect(),
                None => Vec::new(),
            }
        };
        for action in actions {
            let mut state = self.state.lock().unwrap();
            match action {
                Action::Navigate(path) => state.path = path,
                Action::Reveal(target) => {
                    if let Some(node) = state.nodes.get_mut(&target) {
                        node.present = true;
                    }
                }
                Action::RevealMany(targets) => {
                    for target in targets {
                        if let Some(node) = state.nodes.get_mut(&target) {
                            node.present = true;
                        }
                    }
                }
                Action::Remove(target) => {
                    if let Some(node) = state.nodes.get_mut(&target) {
                        node.present = false;
                    }
                }
            }
        }
    }

    fn node<T>(&self, id: u64, f: impl FnOnce(&Node) -> T) -> Result<T, AutomationError> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .get(&id)
            .filter(|n| n.present)
            .map(f)
            .ok_or_else(|| AutomationError::ElementNotFound(format!("stale fake node {id}")))
    }
}

fn is_descendant(nodes: &HashMap<u64, Node>, id: u64, ancestor: u64) -> bool {
    let mut current = id;
    while let Some(parent) = nodes.get(&current).and_then(|n| n.parent) {
        if parent == ancestor {
            return true;
        }
        current = parent;
    }
    false
}

/// Parse the two XPath shapes `Selector::text_xpath` produces. Other
/// expressions only match nodes that registered the raw string.
fn parse_text_xpath(expr: &str) -> Option<(String, String, bool)> {
    let rest = expr.strip_prefix("//")?;
    if let Some((tag, tail)) = rest.split_once("[normalize-space(text()) = '") {
        let literal = tail.strip_suffix("']")?;
        return Some((tag.to_string(), literal.to_string(), true));
    }
    if let Some((tag, tail)) = rest.split_once("[contains(text(), '") {
        let literal = tail.strip_suffix("')]")?;
        return Some((tag.to_string(), literal.to_string(), false));
    }
    None
}

#[async_trait]
impl DomEngine for FakeDom {
    async fn query(
        &self,
        css: &str,
        root: Option<&DomNode>,
    ) -> Result<Option<DomNode>, AutomationError> {
        Ok(self
            .matching(css, root.map(|r| r.0))
            .first()
            .map(|id| DomNode(*id)))
    }

    async fn query_all(
        &self,
        css: &str,
        root: Option<&DomNode>,
    ) -> Result<Vec<DomNode>, AutomationError> {
        Ok(self
            .matching(css, root.map(|r| r.0))
            .into_iter()
            .map(DomNode)
            .collect())
    }

    async fn query_xpath(&self, expr: &str) -> Result<Vec<DomNode>, AutomationError> {
        if let Some((tag, literal, exact)) = parse_text_xpath(expr) {
            let state = self.state.lock().unwrap();
            let mut ids: Vec<u64> = state
                .nodes
                .iter()
                .filter(|(_, node)| {
                    node.present
                        && (tag == "*" || node.tag == tag)
                        && if exact {
                            node.text.trim() == literal
                        } else {
                            node.text.contains(&literal)
                        }
                })
                .map(|(id, _)| *id)
                .collect();
            ids.sort_unstable();
            return Ok(ids.into_iter().map(DomNode).collect());
        }
        Ok(self.matching(expr, None).into_iter().map(DomNode).collect())
    }

    async fn tag_name(&self, node: &DomNode) -> Result<String, AutomationError> {
        self.node(node.0, |n| n.tag.clone())
    }

    async fn text_content(&self, node: &DomNode) -> Result<String, AutomationError> {
        self.node(node.0, |n| n.text.clone())
    }

    async fn value(&self, node: &DomNode) -> Result<String, AutomationError> {
        self.node(node.0, |n| n.value.clone())
    }

    async fn attribute(
        &self,
        node: &DomNode,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        self.node(node.0, |n| n.attrs.get(name).cloned())
    }

    async fn is_visible(&self, node: &DomNode) -> Result<bool, AutomationError> {
        self.node(node.0, |n| n.visible)
    }

    async fn is_enabled(&self, node: &DomNode) -> Result<bool, AutomationError> {
        let gate = self.node(node.0, |n| (n.enabled, n.enabled_gate.clone()))?;
        match gate {
            (false, _) => Ok(false),
            (true, None) => Ok(true),
            (true, Some((input, expected))) => {
                let actual = self.node(input, |n| n.value.clone())?;
                Ok(actual == expected)
            }
        }
    }

    async fn is_checked(&self, node: &DomNode) -> Result<bool, AutomationError> {
        self.node(node.0, |n| n.checked)
    }

    async fn bounds(&self, node: &DomNode) -> Result<(f64, f64, f64, f64), AutomationError> {
        self.node(node.0, |_| (0.0, 0.0, 100.0, 30.0))
    }

    async fn focus(&self, node: &DomNode) -> Result<(), AutomationError> {
        self.node(node.0, |_| ())
    }

    async fn blur(&self, node: &DomNode) -> Result<(), AutomationError> {
        self.node(node.0, |_| ())
    }

    async fn scroll_into_view(&self, node: &DomNode) -> Result<(), AutomationError> {
        self.node(node.0, |_| ())
    }

    async fn set_native_value(
        &self,
        node: &DomNode,
        value: &str,
    ) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .nodes
            .get_mut(&node.0)
            .filter(|n| n.present)
            .ok_or_else(|| AutomationError::ElementNotFound(format!("stale fake node {}", node.0)))?;
        entry.value = value.to_string();
        Ok(())
    }

    async fn dispatch(
        &self,
        node: &DomNode,
        event: &SyntheticEvent,
    ) -> Result<(), AutomationError> {
        let name = match event {
            SyntheticEvent::Input { .. } => "input",
            SyntheticEvent::Change => "change",
            SyntheticEvent::Focus => "focus",
            SyntheticEvent::Blur => "blur",
            SyntheticEvent::MouseDown { .. } => "mousedown",
            SyntheticEvent::MouseUp { .. } => "mouseup",
            SyntheticEvent::Click { .. } => "click",
            SyntheticEvent::DblClick { .. } => "dblclick",
            SyntheticEvent::KeyDown { .. } => "keydown",
            SyntheticEvent::KeyUp { .. } => "keyup",
        };
        {
            let mut state = self.state.lock().unwrap();
            if !state.nodes.get(&node.0).map(|n| n.present).unwrap_or(false) {
                return Err(AutomationError::ElementNotFound(format!(
                    "stale fake node {}",
                    node.0
                )));
            }
            state.events.push((node.0, name.to_string()));
        }

        match event {
            SyntheticEvent::Click { .. } => {
                // A click on a checkbox toggles it, like the real thing.
                {
                    let mut state = self.state.lock().unwrap();
                    if let Some(n) = state.nodes.get_mut(&node.0) {
                        if n.attrs.get("type").map(String::as_str) == Some("checkbox") {
                            n.checked = !n.checked;
                        }
                    }
                }
                self.run_hooks(node.0, Trigger::Click);
            }
            SyntheticEvent::MouseDown { .. } => self.run_hooks(node.0, Trigger::MouseDown),
            SyntheticEvent::KeyDown { key, .. } if key == "Enter" => {
                self.run_hooks(node.0, Trigger::EnterKey)
            }
            _ => {}
        }
        Ok(())
    }

    async fn invoke_framework_change(
        &self,
        _node: &DomNode,
        _value: &str,
    ) -> Result<bool, AutomationError> {
        Ok(false)
    }

    async fn current_path(&self) -> Result<String, AutomationError> {
        Ok(self.state.lock().unwrap().path.clone())
    }

    async fn navigate(&self, path: &str) -> Result<(), AutomationError> {
        self.set_path(path);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AutomationError> {
        Ok(())
    }
}

/// Canned REST collaborator.
pub struct FakeDirectory {
    pub projects: Vec<ProjectRecord>,
    pub statuses: Vec<StatusRecord>,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self {
            projects: vec![ProjectRecord {
                id: "p-1".to_string(),
                slug: Some("website-redesign".to_string()),
                name: Some("Website Redesign".to_string()),
            }],
            statuses: vec![
                StatusRecord {
                    id: "s-1".to_string(),
                    name: "To Do".to_string(),
                },
                StatusRecord {
                    id: "s-2".to_string(),
                    name: "Done".to_string(),
                },
            ],
        }
    }
}

#[async_trait]
impl ProjectDirectory for FakeDirectory {
    async fn list_projects(&self, _org_id: &str) -> Result<Vec<ProjectRecord>, AutomationError> {
        Ok(self.projects.clone())
    }

    async fn list_statuses(
        &self,
        _project_id: &str,
    ) -> Result<Vec<StatusRecord>, AutomationError> {
        Ok(self.statuses.clone())
    }
}
