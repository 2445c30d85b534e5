//! DOM model for fceplus.
//!
//! The annotation engine never talks to a browser directly. It reads and
//! writes through this crate, which models the small part of the DOM the
//! engine relies on:
//!
//! - reference-counted element/text nodes with attributes and class lists
//! - `querySelector`-style queries (compound selectors, descendant
//!   combinator, `:first-child` / `:last-child`)
//! - mutation records, delivered in batches like a `MutationObserver`
//! - the page location (path and hash) used for page mode detection
//!
//! Nodes are `Rc`-based and single-threaded. Parents hold their children
//! strongly and children point back weakly, so dropping a detached subtree
//! drops every attribute stored on it.

mod document;
mod error;
mod node;
mod selector;

pub use document::{Document, Location, MutationRecord};
pub use error::DomError;
pub use node::{Node, NodeAttributes, WeakNode};
pub use selector::Selector;
