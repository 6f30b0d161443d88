//! gift-dom — DOM tree shared by the gift shop views and renderers
//!
//! Every view in the client core renders into a `DomNode` tree. The HTML
//! renderer and the dev server consume it, and tests inspect it directly
//! instead of scraping markup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single node in the view tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    /// HTML tag name (e.g. "div", "button", "img")
    pub tag: String,

    /// Stable identity, also used by tests to locate nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// HTML attributes (class, src, aria-*, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<HashMap<String, String>>,

    /// Map of DOM event name → action name (e.g. "click" → "filter:FEMALE")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<HashMap<String, String>>,

    /// Text content for leaf nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DomNode>>,
}

/// A complete snapshot wrapping the root DomNode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub root: DomNode,
}

impl DomNode {
    /// Create an empty element
    pub fn element(tag: &str) -> Self {
        DomNode {
            tag: tag.to_string(),
            key: None,
            attrs: None,
            events: None,
            text: None,
            children: None,
        }
    }

    /// Create a simple text node
    pub fn text(tag: &str, content: &str) -> Self {
        DomNode {
            text: Some(content.to_string()),
            ..DomNode::element(tag)
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.into());
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.with_attr("class", class)
    }

    /// Bind a DOM event to an action name.
    pub fn on(mut self, event: &str, action: impl Into<String>) -> Self {
        self.events
            .get_or_insert_with(HashMap::new)
            .insert(event.to_string(), action.into());
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.get_or_insert_with(Vec::new).extend(children);
        self
    }

    /// Get a class attribute if present
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(name).map(|s| s.as_str())
    }

    /// True when the whitespace-separated class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.class()
            .map(|c| c.split_whitespace().any(|part| part == class))
            .unwrap_or(false)
    }

    /// Iterate over children (empty slice if none)
    pub fn children_iter(&self) -> &[DomNode] {
        match &self.children {
            Some(c) => c,
            None => &[],
        }
    }

    /// Get an event action by event name
    pub fn event(&self, name: &str) -> Option<&str> {
        self.events.as_ref()?.get(name).map(|s| s.as_str())
    }

    /// Depth-first search for the first node carrying `key`.
    pub fn find_by_key(&self, key: &str) -> Option<&DomNode> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children_iter().iter().find_map(|c| c.find_by_key(key))
    }

    /// Collect every node (self included) matching `pred`, in document order.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&DomNode) -> bool) -> Vec<&'a DomNode> {
        let mut out = Vec::new();
        collect(self, pred, &mut out);
        out
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        push_text(self, &mut buf);
        buf
    }

    /// True when any node in the subtree has exactly this text.
    pub fn contains_text(&self, needle: &str) -> bool {
        !self.find_all(&|n| n.text.as_deref() == Some(needle)).is_empty()
    }
}

fn collect<'a>(node: &'a DomNode, pred: &dyn Fn(&DomNode) -> bool, out: &mut Vec<&'a DomNode>) {
    if pred(node) {
        out.push(node);
    }
    for child in node.children_iter() {
        collect(child, pred, out);
    }
}

fn push_text(node: &DomNode, buf: &mut String) {
    if let Some(t) = &node.text {
        buf.push_str(t);
    }
    for child in node.children_iter() {
        push_text(child, buf);
    }
}

/// Parse a snapshot from a JSON string
pub fn parse_snapshot(json: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse a single DomNode from a JSON string
pub fn parse_node(json: &str) -> Result<DomNode, serde_json::Error> {
    serde_json::from_str(json)
}
