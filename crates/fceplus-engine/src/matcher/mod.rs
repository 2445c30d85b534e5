//! Pattern matchers for the host markup.
//!
//! Each matcher owns one UI pattern: it decides from a node's classes
//! whether the node is an instance of the pattern, and scrapes what the
//! engine needs out of its labels. Matchers never write to the DOM.

mod calendar_entry;
mod course_row;
mod detail_popup;

pub use calendar_entry::{CalendarEntry, CalendarEntryMatcher};
pub use course_row::{CourseRow, CourseRowMatcher};
pub use detail_popup::{DetailPopup, DetailPopupMatcher};

use fceplus_dom::Node;

use crate::error::MatchFailure;

/// A recognizer for one host UI pattern.
pub trait PatternMatcher {
    /// What a successful match yields.
    type Match;

    /// Short name used in logs and [`MatchFailure`]s.
    fn name(&self) -> &'static str;

    /// Cheap class-based check.
    fn recognizes(&self, node: &Node) -> bool;

    /// Scrape the pattern's data out of a recognized node.
    ///
    /// `Ok(None)` means the node turned out not to be an instance after all
    /// (or was already handled). `Err` means it is one, but a required part
    /// is missing.
    fn extract(&self, node: &Node) -> Result<Option<Self::Match>, MatchFailure>;
}

/// The role a node plays in the host UI.
///
/// Variants are declared in rank order: a node whose classes satisfy more
/// than one pattern takes the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeRole {
    DetailPopup,
    CalendarEntry,
    CourseRow,
}

impl NodeRole {
    /// Classify a node by its class set.
    pub fn classify(node: &Node) -> Option<Self> {
        if !node.is_element() {
            return None;
        }
        if DetailPopupMatcher.recognizes(node) {
            Some(Self::DetailPopup)
        } else if CalendarEntryMatcher.recognizes(node) {
            Some(Self::CalendarEntry)
        } else if CourseRowMatcher.recognizes(node) {
            Some(Self::CourseRow)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetailPopup => "detail_popup",
            Self::CalendarEntry => "calendar_entry",
            Self::CourseRow => "course_row",
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
