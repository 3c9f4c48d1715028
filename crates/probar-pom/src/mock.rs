//! In-memory session for testing page objects without a browser.
//!
//! [`MockSession`] keeps a tree of [`MockNode`]s in document order. A node
//! answers to the locators it was registered with, so tests describe the
//! page by saying which locators find which nodes rather than by writing
//! real markup. Timing behavior is modeled by counters: a node can stay
//! hidden from the first N queries, or return empty text for its first N
//! reads, which is enough to exercise every wait loop deterministically.
//!
//! Every call is recorded so tests can assert on how often the session was
//! hit.

use base64::Engine as _;
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::locator::Locator;
use crate::result::{PomError, PomResult};
use crate::session::{keys, NodeRef, SearchRoot, Session};

const ID_PREFIX: &str = "mock-";

/// Side effect applied when a node is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Set an attribute on a node
    SetAttribute {
        /// Target node
        node: NodeRef,
        /// Attribute name
        name: String,
        /// New value
        value: String,
    },
    /// Replace a node's text
    SetText {
        /// Target node
        node: NodeRef,
        /// New text
        text: String,
    },
    /// Remove a node (and its subtree) from the document
    Detach(NodeRef),
    /// Put a previously detached node back
    Attach(NodeRef),
    /// Flip a node's selected state
    ToggleSelected(NodeRef),
}

/// Description of a node registered with [`MockSession`]
#[derive(Debug, Clone)]
pub struct MockNode {
    locators: Vec<Locator>,
    text: String,
    blank_text_reads: usize,
    attributes: BTreeMap<String, String>,
    displayed: bool,
    enabled: bool,
    selected: bool,
    appears_after: usize,
    screenshot: Vec<u8>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            locators: Vec::new(),
            text: String::new(),
            blank_text_reads: 0,
            attributes: BTreeMap::new(),
            displayed: true,
            enabled: true,
            selected: false,
            appears_after: 0,
            screenshot: Vec::new(),
        }
    }
}

impl MockNode {
    /// Create a visible, enabled node with no text
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the node answer to a locator
    #[must_use]
    pub fn matching(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    /// Set the rendered text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Return empty text for the first `reads` text reads
    #[must_use]
    pub const fn blank_text_reads(mut self, reads: usize) -> Self {
        self.blank_text_reads = reads;
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    /// Set enabled state
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set selected state
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Hide the node from the first `queries` queries that would match it
    #[must_use]
    pub const fn appears_after(mut self, queries: usize) -> Self {
        self.appears_after = queries;
        self
    }

    /// Set the PNG bytes returned by screenshots
    #[must_use]
    pub fn screenshot(mut self, png: impl Into<Vec<u8>>) -> Self {
        self.screenshot = png.into();
        self
    }
}

#[derive(Debug)]
struct Slot {
    node: MockNode,
    parent: Option<usize>,
    attached: bool,
    misses: usize,
    text_reads: usize,
    text_selected: bool,
    on_click: Vec<Effect>,
}

#[derive(Debug, Default)]
struct MockState {
    slots: Vec<Slot>,
    history: Vec<String>,
    failures: Vec<(String, PomError)>,
    url: Option<String>,
    closed: bool,
}

impl MockState {
    fn index(&self, node: &NodeRef) -> PomResult<usize> {
        node.id()
            .strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&i| i < self.slots.len())
            .ok_or_else(|| PomError::session(format!("unknown node {node}")))
    }

    fn is_attached(&self, index: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if !self.slots[i].attached {
                return false;
            }
            current = self.slots[i].parent;
        }
        true
    }

    fn is_descendant(&self, index: usize, ancestor: usize) -> bool {
        let mut current = self.slots[index].parent;
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.slots[i].parent;
        }
        false
    }

    fn attached_index(&self, node: &NodeRef) -> PomResult<usize> {
        let index = self.index(node)?;
        if self.is_attached(index) {
            Ok(index)
        } else {
            Err(PomError::NodeDetached {
                node: node.to_string(),
            })
        }
    }

    fn take_failure(&mut self, method: &str) -> Option<PomError> {
        let pos = self.failures.iter().position(|(m, _)| m == method)?;
        Some(self.failures.remove(pos).1)
    }

    fn query(&mut self, root: &SearchRoot, locator: &Locator) -> PomResult<Vec<NodeRef>> {
        let scope = match root {
            SearchRoot::Document => None,
            SearchRoot::Node(node) => Some(self.attached_index(node)?),
        };

        let mut found = Vec::new();
        for i in 0..self.slots.len() {
            if !self.slots[i].node.locators.contains(locator) || !self.is_attached(i) {
                continue;
            }
            if let Some(ancestor) = scope {
                if !self.is_descendant(i, ancestor) {
                    continue;
                }
            }
            let slot = &mut self.slots[i];
            if slot.misses < slot.node.appears_after {
                slot.misses += 1;
                continue;
            }
            found.push(node_ref(i));
        }
        Ok(found)
    }

    fn apply(&mut self, effect: &Effect) -> PomResult<()> {
        match effect {
            Effect::SetAttribute { node, name, value } => {
                let i = self.index(node)?;
                let _ = self.slots[i]
                    .node
                    .attributes
                    .insert(name.clone(), value.clone());
            }
            Effect::SetText { node, text } => {
                let i = self.index(node)?;
                self.slots[i].node.text.clone_from(text);
            }
            Effect::Detach(node) => {
                let i = self.index(node)?;
                self.slots[i].attached = false;
            }
            Effect::Attach(node) => {
                let i = self.index(node)?;
                self.slots[i].attached = true;
            }
            Effect::ToggleSelected(node) => {
                let i = self.index(node)?;
                self.slots[i].node.selected = !self.slots[i].node.selected;
            }
        }
        Ok(())
    }
}

fn node_ref(index: usize) -> NodeRef {
    NodeRef::new(format!("{ID_PREFIX}{index}"))
}

/// Mock session for unit testing
#[derive(Debug, Default)]
pub struct MockSession {
    state: RefCell<MockState>,
}

impl MockSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node directly under the document
    pub fn add_node(&self, node: MockNode) -> NodeRef {
        self.insert(node, None)
    }

    /// Add a node under `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not created by this session.
    pub fn add_child(&self, parent: &NodeRef, node: MockNode) -> NodeRef {
        let parent_index = self
            .state
            .borrow()
            .index(parent)
            .expect("parent must belong to this mock session");
        self.insert(node, Some(parent_index))
    }

    fn insert(&self, node: MockNode, parent: Option<usize>) -> NodeRef {
        let mut state = self.state.borrow_mut();
        state.slots.push(Slot {
            node,
            parent,
            attached: true,
            misses: 0,
            text_reads: 0,
            text_selected: false,
            on_click: Vec::new(),
        });
        node_ref(state.slots.len() - 1)
    }

    /// Register an effect to run whenever `node` is clicked
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this session.
    pub fn on_click(&self, node: &NodeRef, effect: Effect) {
        let mut state = self.state.borrow_mut();
        let i = state.index(node).expect("node must belong to this mock session");
        state.slots[i].on_click.push(effect);
    }

    /// Remove a node and its subtree from the document
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this session.
    pub fn detach(&self, node: &NodeRef) {
        self.apply(&Effect::Detach(node.clone()));
    }

    /// Put a detached node back
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this session.
    pub fn attach(&self, node: &NodeRef) {
        self.apply(&Effect::Attach(node.clone()));
    }

    /// Replace a node's text
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this session.
    pub fn set_text(&self, node: &NodeRef, text: impl Into<String>) {
        self.apply(&Effect::SetText {
            node: node.clone(),
            text: text.into(),
        });
    }

    /// Set an attribute on a node
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this session.
    pub fn set_attribute(&self, node: &NodeRef, name: impl Into<String>, value: impl Into<String>) {
        self.apply(&Effect::SetAttribute {
            node: node.clone(),
            name: name.into(),
            value: value.into(),
        });
    }

    fn apply(&self, effect: &Effect) {
        self.state
            .borrow_mut()
            .apply(effect)
            .expect("node must belong to this mock session");
    }

    /// Make the next call to `method` fail with `error`
    pub fn fail_next(&self, method: impl Into<String>, error: PomError) {
        self.state.borrow_mut().failures.push((method.into(), error));
    }

    /// Call history for verification
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        self.state.borrow_mut().history.clear();
    }

    /// Number of recorded calls to `method`
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        let prefix = format!("{method}:");
        self.state
            .borrow()
            .history
            .iter()
            .filter(|c| *c == method || c.starts_with(&prefix))
            .count()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.calls(method) > 0
    }

    /// Number of clicks delivered to `node`
    #[must_use]
    pub fn clicks_on(&self, node: &NodeRef) -> usize {
        let entry = format!("click:{node}");
        self.state
            .borrow()
            .history
            .iter()
            .filter(|c| **c == entry)
            .count()
    }

    /// Last URL opened
    #[must_use]
    pub fn current_url(&self) -> Option<String> {
        self.state.borrow().url.clone()
    }

    /// Whether `quit` was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Current `value` attribute of a node, as typed by `send_keys`
    #[must_use]
    pub fn value_of(&self, node: &NodeRef) -> Option<String> {
        let state = self.state.borrow();
        let i = state.index(node).ok()?;
        state.slots[i].node.attributes.get("value").cloned()
    }

    fn begin(&self, method: &str, detail: impl std::fmt::Display) -> PomResult<()> {
        let mut state = self.state.borrow_mut();
        state.history.push(format!("{method}:{detail}"));
        match state.take_failure(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Session for MockSession {
    fn open(&self, url: &str) -> PomResult<()> {
        self.begin("open", url)?;
        self.state.borrow_mut().url = Some(url.to_string());
        Ok(())
    }

    fn quit(&self) -> PomResult<()> {
        {
            let mut state = self.state.borrow_mut();
            state.history.push("quit".to_string());
            if let Some(err) = state.take_failure("quit") {
                return Err(err);
            }
        }
        self.state.borrow_mut().closed = true;
        Ok(())
    }

    fn query_one(&self, root: &SearchRoot, locator: &Locator) -> PomResult<NodeRef> {
        self.begin("query_one", locator)?;
        self.state
            .borrow_mut()
            .query(root, locator)?
            .into_iter()
            .next()
            .ok_or_else(|| PomError::NoSuchElement {
                locator: locator.clone(),
            })
    }

    fn query_many(&self, root: &SearchRoot, locator: &Locator) -> PomResult<Vec<NodeRef>> {
        self.begin("query_many", locator)?;
        self.state.borrow_mut().query(root, locator)
    }

    fn click(&self, node: &NodeRef) -> PomResult<()> {
        self.begin("click", node)?;
        let mut state = self.state.borrow_mut();
        let i = state.attached_index(node)?;
        let effects = state.slots[i].on_click.clone();
        for effect in &effects {
            state.apply(effect)?;
        }
        Ok(())
    }

    fn double_click(&self, node: &NodeRef) -> PomResult<()> {
        self.begin("double_click", node)?;
        let mut state = self.state.borrow_mut();
        let i = state.attached_index(node)?;
        state.slots[i].text_selected = true;
        Ok(())
    }

    fn hover(&self, node: &NodeRef) -> PomResult<()> {
        self.begin("hover", node)?;
        let state = self.state.borrow();
        state.attached_index(node).map(|_| ())
    }

    fn send_keys(&self, node: &NodeRef, keys_to_send: &str) -> PomResult<()> {
        self.begin("send_keys", format_args!("{node}:{keys_to_send}"))?;
        let mut state = self.state.borrow_mut();
        let i = state.attached_index(node)?;
        let slot = &mut state.slots[i];
        let value = slot.node.attributes.entry("value".to_string()).or_default();
        if keys_to_send == keys::BACKSPACE {
            if slot.text_selected {
                value.clear();
            } else {
                let _ = value.pop();
            }
        } else {
            if slot.text_selected {
                value.clear();
            }
            value.push_str(keys_to_send);
        }
        slot.text_selected = false;
        Ok(())
    }

    fn attribute(&self, node: &NodeRef, name: &str) -> PomResult<Option<String>> {
        self.begin("attribute", format_args!("{node}:{name}"))?;
        let state = self.state.borrow();
        let i = state.attached_index(node)?;
        Ok(state.slots[i].node.attributes.get(name).cloned())
    }

    fn text(&self, node: &NodeRef) -> PomResult<String> {
        self.begin("text", node)?;
        let mut state = self.state.borrow_mut();
        let i = state.attached_index(node)?;
        let slot = &mut state.slots[i];
        if slot.text_reads < slot.node.blank_text_reads {
            slot.text_reads += 1;
            return Ok(String::new());
        }
        Ok(slot.node.text.clone())
    }

    fn is_enabled(&self, node: &NodeRef) -> PomResult<bool> {
        self.begin("is_enabled", node)?;
        let state = self.state.borrow();
        let i = state.attached_index(node)?;
        Ok(state.slots[i].node.enabled)
    }

    fn is_displayed(&self, node: &NodeRef) -> PomResult<bool> {
        self.begin("is_displayed", node)?;
        let state = self.state.borrow();
        let i = state.attached_index(node)?;
        Ok(state.slots[i].node.displayed)
    }

    fn is_selected(&self, node: &NodeRef) -> PomResult<bool> {
        self.begin("is_selected", node)?;
        let state = self.state.borrow();
        let i = state.attached_index(node)?;
        Ok(state.slots[i].node.selected)
    }

    fn is_attached(&self, node: &NodeRef) -> PomResult<bool> {
        self.begin("is_attached", node)?;
        let state = self.state.borrow();
        let i = state.index(node)?;
        Ok(state.is_attached(i))
    }

    fn screenshot_base64(&self, node: &NodeRef) -> PomResult<String> {
        self.begin("screenshot", node)?;
        let state = self.state.borrow();
        let i = state.attached_index(node)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&state.slots[i].node.screenshot))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod query_tests {
        use super::*;

        #[test]
        fn test_query_many_document_order() {
            let session = MockSession::new();
            let li = Locator::css("li");
            let a = session.add_node(MockNode::new().matching(li.clone()));
            let b = session.add_node(MockNode::new().matching(li.clone()));
            let c = session.add_node(MockNode::new().matching(li.clone()));

            let found = session.query_many(&SearchRoot::Document, &li).unwrap();
            assert_eq!(found, vec![a, b, c]);
        }

        #[test]
        fn test_query_scoped_to_descendants() {
            let session = MockSession::new();
            let td = Locator::css("td");
            let row1 = session.add_node(MockNode::new());
            let row2 = session.add_node(MockNode::new());
            let cell1 = session.add_child(&row1, MockNode::new().matching(td.clone()));
            let _cell2 = session.add_child(&row2, MockNode::new().matching(td.clone()));

            let found = session
                .query_many(&SearchRoot::Node(row1), &td)
                .unwrap();
            assert_eq!(found, vec![cell1]);
        }

        #[test]
        fn test_query_one_missing() {
            let session = MockSession::new();
            let err = session
                .query_one(&SearchRoot::Document, &Locator::css("nav"))
                .unwrap_err();
            assert!(matches!(err, PomError::NoSuchElement { .. }));
        }

        #[test]
        fn test_detached_subtree_hidden() {
            let session = MockSession::new();
            let li = Locator::css("li");
            let list = session.add_node(MockNode::new());
            let _item = session.add_child(&list, MockNode::new().matching(li.clone()));
            session.detach(&list);

            assert!(session
                .query_many(&SearchRoot::Document, &li)
                .unwrap()
                .is_empty());
            assert!(matches!(
                session.query_many(&SearchRoot::Node(list), &li),
                Err(PomError::NodeDetached { .. })
            ));
        }

        #[test]
        fn test_appears_after() {
            let session = MockSession::new();
            let loc = Locator::css(".late");
            session.add_node(MockNode::new().matching(loc.clone()).appears_after(2));

            assert!(session.query_one(&SearchRoot::Document, &loc).is_err());
            assert!(session.query_one(&SearchRoot::Document, &loc).is_err());
            assert!(session.query_one(&SearchRoot::Document, &loc).is_ok());
        }
    }

    mod node_op_tests {
        use super::*;

        #[test]
        fn test_blank_text_reads() {
            let session = MockSession::new();
            let node = session.add_node(MockNode::new().text("Ready").blank_text_reads(1));
            assert_eq!(session.text(&node).unwrap(), "");
            assert_eq!(session.text(&node).unwrap(), "Ready");
        }

        #[test]
        fn test_click_effects() {
            let session = MockSession::new();
            let button = session.add_node(MockNode::new());
            let label = session.add_node(MockNode::new().text("closed"));
            session.on_click(
                &button,
                Effect::SetText {
                    node: label.clone(),
                    text: "open".to_string(),
                },
            );
            session.on_click(&button, Effect::Detach(button.clone()));

            session.click(&button).unwrap();
            assert_eq!(session.text(&label).unwrap(), "open");
            assert!(!session.is_attached(&button).unwrap());
            assert!(matches!(
                session.click(&button),
                Err(PomError::NodeDetached { .. })
            ));
            assert_eq!(session.clicks_on(&button), 2);
        }

        #[test]
        fn test_send_keys_and_clear() {
            let session = MockSession::new();
            let input = session.add_node(MockNode::new().attribute("value", "old"));
            session.double_click(&input).unwrap();
            session.send_keys(&input, keys::BACKSPACE).unwrap();
            session.send_keys(&input, "new").unwrap();
            assert_eq!(session.value_of(&input).as_deref(), Some("new"));
        }

        #[test]
        fn test_screenshot_is_base64() {
            let session = MockSession::new();
            let node = session.add_node(MockNode::new().screenshot(vec![0x89, 0x50]));
            assert_eq!(session.screenshot_base64(&node).unwrap(), "iVA=");
        }

        #[test]
        fn test_unknown_node() {
            let session = MockSession::new();
            assert!(matches!(
                session.text(&NodeRef::new("elsewhere-1")),
                Err(PomError::Session { .. })
            ));
        }
    }

    mod history_tests {
        use super::*;

        #[test]
        fn test_history_and_counts() {
            let session = MockSession::new();
            session.open("https://example.test/login").unwrap();
            let _ = session.query_one(&SearchRoot::Document, &Locator::css("a"));
            session.quit().unwrap();

            assert_eq!(session.calls("open"), 1);
            assert_eq!(session.calls("query_one"), 1);
            assert!(session.was_called("quit"));
            assert!(!session.was_called("click"));
            assert_eq!(
                session.current_url().as_deref(),
                Some("https://example.test/login")
            );
            assert!(session.is_closed());

            session.clear_history();
            assert!(session.history().is_empty());
        }

        #[test]
        fn test_fail_next_is_consumed() {
            let session = MockSession::new();
            let node = session.add_node(MockNode::new());
            session.fail_next("click", PomError::session("intercepted"));
            assert!(session.click(&node).is_err());
            assert!(session.click(&node).is_ok());
        }
    }
}
