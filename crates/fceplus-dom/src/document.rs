//! Document, location, and mutation records.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DomError;
use crate::node::Node;
use crate::selector::Selector;

/// Page location: the parts of the URL the engine looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// URL path, e.g. `/sio/index.html`.
    pub path: String,
    /// Fragment without the leading `#`.
    pub hash: String,
}

impl Location {
    /// Parse an absolute URL.
    pub fn parse(url: &str) -> Result<Self, DomError> {
        let url = Url::parse(url)?;
        Ok(Self {
            path: url.path().to_string(),
            hash: url.fragment().unwrap_or_default().to_string(),
        })
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            hash: String::new(),
        }
    }
}

/// One tree change: nodes added to and removed from `target`.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub target: Node,
    pub added: Vec<Node>,
    pub removed: Vec<Node>,
}

impl MutationRecord {
    pub fn added(target: &Node, nodes: Vec<Node>) -> Self {
        Self {
            target: target.clone(),
            added: nodes,
            removed: Vec::new(),
        }
    }

    pub fn removed(target: &Node, nodes: Vec<Node>) -> Self {
        Self {
            target: target.clone(),
            added: Vec::new(),
            removed: nodes,
        }
    }
}

struct DocumentInner {
    body: Node,
    location: RefCell<Location>,
    pending: RefCell<Vec<MutationRecord>>,
}

/// Shared handle to a page.
///
/// Tree changes made through the document's mutation methods are queued as
/// [`MutationRecord`]s and handed out in batches by [`Document::take_records`].
/// Direct edits through [`Node`] methods are not recorded; that is how the
/// annotation engine writes without feeding its own changes back to itself.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    /// Create an empty document with a `<body>` root.
    pub fn new(location: Location) -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                body: Node::element("body"),
                location: RefCell::new(location),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn body(&self) -> Node {
        self.inner.body.clone()
    }

    pub fn location(&self) -> Location {
        self.inner.location.borrow().clone()
    }

    /// Change the fragment, as in-page navigation does.
    pub fn set_hash(&self, hash: &str) {
        self.inner.location.borrow_mut().hash = hash.trim_start_matches('#').to_string();
    }

    /// First matching node, the body included.
    pub fn query_selector(&self, selector: &Selector) -> Option<Node> {
        self.inner
            .body
            .inclusive_descendants()
            .into_iter()
            .find(|n| selector.matches(n))
    }

    /// Every matching node, the body included.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Node> {
        self.inner
            .body
            .inclusive_descendants()
            .into_iter()
            .filter(|n| selector.matches(n))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        self.inner
            .body
            .inclusive_descendants()
            .into_iter()
            .find(|n| n.id().as_deref() == Some(id))
    }

    /// Append `child` under `parent` and record the insertion.
    pub fn append_child(&self, parent: &Node, child: Node) {
        if parent.append_child(&child) {
            self.record(MutationRecord::added(parent, vec![child]));
        }
    }

    /// Remove `child` from `parent` and record the removal.
    pub fn remove_child(&self, parent: &Node, child: &Node) {
        if parent.remove_child(child) {
            self.record(MutationRecord::removed(parent, vec![child.clone()]));
        }
    }

    /// Replace every child of `parent`, recording one removal and one insertion.
    ///
    /// This is the shape of a server-driven re-render: the old subtree leaves
    /// and a freshly built one arrives in the same batch.
    pub fn replace_children(&self, parent: &Node, children: Vec<Node>) {
        let removed = parent.remove_all_children();
        if !removed.is_empty() {
            self.record(MutationRecord::removed(parent, removed));
        }
        let mut added = Vec::with_capacity(children.len());
        for child in children {
            if parent.append_child(&child) {
                added.push(child);
            }
        }
        if !added.is_empty() {
            self.record(MutationRecord::added(parent, added));
        }
    }

    /// Queue a record directly.
    pub fn record(&self, record: MutationRecord) {
        self.inner.pending.borrow_mut().push(record);
    }

    /// Drain queued records as one batch.
    pub fn take_records(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut *self.inner.pending.borrow_mut())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("location", &*self.inner.location.borrow())
            .field("pending", &self.inner.pending.borrow().len())
            .finish()
    }
}
