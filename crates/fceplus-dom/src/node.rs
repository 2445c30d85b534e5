//! Reference-counted DOM nodes.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::selector::Selector;

/// Attributes of an element node, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    entries: Vec<(String, String)>,
}

impl NodeAttributes {
    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether an attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Element id.
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Class names from the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get("class").unwrap_or("").split_whitespace()
    }

    /// Class-list membership.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set("class", joined);
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

enum NodeKind {
    Element {
        tag: String,
        attributes: NodeAttributes,
    },
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<Node>,
}

/// Shared handle to a DOM node.
///
/// Cloning the handle does not clone the node. Equality is identity.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

/// Non-owning handle to a DOM node.
#[derive(Clone, Default)]
pub struct WeakNode(Weak<RefCell<NodeData>>);

impl WeakNode {
    /// Upgrade to a strong handle if the node is still alive.
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }

    /// Whether the node is still alive.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
        })))
    }

    /// Create a detached element with the given tag name (lowercased).
    pub fn element(tag: &str) -> Self {
        Self::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: NodeAttributes::default(),
        })
    }

    /// Create a detached text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(content.into()))
    }

    /// Builder: add a class.
    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Builder: set the id attribute.
    pub fn with_id(self, id: &str) -> Self {
        self.set_attribute("id", id);
        self
    }

    /// Builder: set an attribute.
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: append a text child.
    pub fn with_text(self, text: &str) -> Self {
        self.append_child(&Node::text(text));
        self
    }

    /// Builder: append a child.
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(&child);
        self
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// Lowercase tag name, `None` for text nodes.
    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Snapshot of the element's attributes.
    pub fn attributes(&self) -> NodeAttributes {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.clone(),
            NodeKind::Text(_) => NodeAttributes::default(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(str::to_string),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.contains(name),
            NodeKind::Text(_) => false,
        }
    }

    /// Set an attribute. No-op on text nodes.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
            attributes.set(name, value);
        }
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => attributes.remove(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.has_class(class),
            NodeKind::Text(_) => false,
        }
    }

    pub fn add_class(&self, class: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
            attributes.add_class(class);
        }
    }

    pub fn classes(&self) -> Vec<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => {
                attributes.classes().map(str::to_string).collect()
            }
            NodeKind::Text(_) => Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn element_children(&self) -> Vec<Node> {
        self.children().into_iter().filter(Node::is_element).collect()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    pub fn last_child(&self) -> Option<Node> {
        self.0.borrow().children.last().cloned()
    }

    pub fn last_element_child(&self) -> Option<Node> {
        self.children().into_iter().rev().find(Node::is_element)
    }

    /// Whether this is the first element among its siblings. Parentless nodes count as first.
    pub fn is_first_element_child(&self) -> bool {
        match self.parent() {
            Some(parent) => parent
                .children()
                .into_iter()
                .find(Node::is_element)
                .is_some_and(|first| first.ptr_eq(self)),
            None => true,
        }
    }

    /// Whether this is the last element among its siblings. Parentless nodes count as last.
    pub fn is_last_element_child(&self) -> bool {
        match self.parent() {
            Some(parent) => parent
                .last_element_child()
                .is_some_and(|last| last.ptr_eq(self)),
            None => true,
        }
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            out.push(node);
        }
        out
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        other.ptr_eq(self) || other.ancestors().iter().any(|a| a.ptr_eq(self))
    }

    /// Append a child, moving it from its previous parent.
    ///
    /// Returns `false` (and does nothing) if the insertion would create a cycle.
    pub fn append_child(&self, child: &Node) -> bool {
        self.insert_before(child, None)
    }

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None` or not a child of this node.
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) -> bool {
        if child.contains(self) {
            return false;
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);

        let mut data = self.0.borrow_mut();
        let idx = reference.and_then(|r| data.children.iter().position(|c| c.ptr_eq(r)));
        match idx {
            Some(i) => data.children.insert(i, child.clone()),
            None => data.children.push(child.clone()),
        }
        true
    }

    /// Remove a direct child. Returns `false` if `child` is not a child of this node.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut data = self.0.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| !c.ptr_eq(child));
            data.children.len() != before
        };
        if removed {
            child.0.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// Detach from the parent, if any.
    pub fn detach(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => false,
        }
    }

    /// Remove and return every child.
    pub fn remove_all_children(&self) -> Vec<Node> {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in &children {
            child.0.borrow_mut().parent = Weak::new();
        }
        children
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Replace the content with a single text node (or the text itself for text nodes).
    pub fn set_text_content(&self, text: &str) {
        if let NodeKind::Text(existing) = &mut self.0.borrow_mut().kind {
            *existing = text.to_string();
            return;
        }
        self.remove_all_children();
        if !text.is_empty() {
            self.append_child(&Node::text(text));
        }
    }

    /// Append text at the end of this node's content.
    pub fn append_text(&self, text: &str) {
        if let NodeKind::Text(existing) = &mut self.0.borrow_mut().kind {
            existing.push_str(text);
            return;
        }
        self.append_child(&Node::text(text));
    }

    /// This node followed by all descendants, in document order.
    pub fn inclusive_descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    /// All descendants in document order, excluding this node.
    pub fn descendants(&self) -> Vec<Node> {
        let mut all = self.inclusive_descendants();
        all.remove(0);
        all
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }

    /// First descendant matching `selector` (this node excluded, as in the DOM).
    pub fn query_selector(&self, selector: &Selector) -> Option<Node> {
        self.descendants().into_iter().find(|n| selector.matches(n))
    }

    /// Every descendant matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Node> {
        self.descendants()
            .into_iter()
            .filter(|n| selector.matches(n))
            .collect()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().kind {
            NodeKind::Text(text) => write!(f, "#text {:?}", text),
            NodeKind::Element { tag, attributes } => {
                write!(f, "<{}", tag)?;
                for (name, value) in attributes.iter() {
                    write!(f, " {}=\"{}\"", name, value)?;
                }
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
