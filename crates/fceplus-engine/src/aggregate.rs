//! Running total and the courses that lack reference data.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use tracing::debug;

use fceplus_dataset::CourseId;
use fceplus_dom::{Document, Node, Selector};

/// Id of the span holding the rendered total.
pub const TOTAL_ID: &str = "course-total-fce";

static UNITS_LABEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".schedule-units-label").expect("label selector is valid")
});

/// Multiset of course ids whose counted hours came from the fallback.
///
/// An id is present while at least one visible row for it used the
/// fallback; each row holds one count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingReferenceSet {
    counts: BTreeMap<CourseId, usize>,
}

impl MissingReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, course_id: CourseId) {
        *self.counts.entry(course_id).or_insert(0) += 1;
    }

    /// Drop one count. Returns `false` if the id was not present.
    pub fn remove(&mut self, course_id: &CourseId) -> bool {
        match self.counts.get_mut(course_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(course_id);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, course_id: &CourseId) -> bool {
        self.counts.contains_key(course_id)
    }

    pub fn count(&self, course_id: &CourseId) -> usize {
        self.counts.get(course_id).copied().unwrap_or(0)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &CourseId> {
        self.counts.keys()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

/// Running total of effective hours over visible counted rows.
#[derive(Debug, Clone, Default)]
pub struct AggregateEngine {
    total: f64,
    missing: MissingReferenceSet,
    dirty: bool,
    epoch: u64,
}

impl AggregateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hours: f64) {
        self.total += hours;
        self.dirty = true;
    }

    pub fn remove(&mut self, hours: f64) {
        self.total -= hours;
        self.dirty = true;
    }

    /// Round the total to two decimals. Called after each mutation record.
    pub fn commit(&mut self) {
        self.total = round2(self.total);
    }

    /// Zero the total and forget missing courses.
    ///
    /// Starts a new epoch: annotations stamped with an earlier one no longer
    /// count toward this total.
    pub fn reset(&mut self) {
        self.total = 0.0;
        self.missing.clear();
        self.dirty = true;
        self.epoch += 1;
    }

    /// Number of resets so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn missing(&self) -> &MissingReferenceSet {
        &self.missing
    }

    pub fn missing_mut(&mut self) -> &mut MissingReferenceSet {
        self.dirty = true;
        &mut self.missing
    }

    /// Whether anything changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Text for the total span; empty when there is nothing to show.
    pub fn label(&self) -> String {
        let total = round2(self.total);
        if total <= 0.0 {
            return String::new();
        }
        if self.missing.is_empty() {
            format!(" (FCE: {})", total)
        } else {
            format!(" (FCE: {} ⚠)", total)
        }
    }

    /// Tooltip naming the courses counted from declared units.
    fn missing_title(&self) -> Option<String> {
        if self.missing.is_empty() || round2(self.total) <= 0.0 {
            return None;
        }
        let ids: Vec<String> = self.missing.ids().map(CourseId::display_form).collect();
        Some(format!("No FCE data, declared units used: {}", ids.join(", ")))
    }

    /// Write the total into the page.
    ///
    /// Creates `#course-total-fce` in front of the units label's last child
    /// on first use. Returns `true` if the text changed. Does nothing (and
    /// stays dirty) when the label is not on the page yet.
    pub fn render(&mut self, document: &Document) -> bool {
        self.commit();
        let Some(span) = total_span(document) else {
            return false;
        };
        self.dirty = false;

        match self.missing_title() {
            Some(title) => span.set_attribute("title", title),
            None => {
                span.remove_attribute("title");
            }
        }

        let label = self.label();
        if span.text_content() == label {
            return false;
        }
        span.set_text_content(&label);
        debug!(label = %label, "Rendered total");
        true
    }
}

fn total_span(document: &Document) -> Option<Node> {
    if let Some(span) = document.get_element_by_id(TOTAL_ID) {
        return Some(span);
    }
    let label = document.query_selector(&UNITS_LABEL)?;
    let span = Node::element("span").with_id(TOTAL_ID);
    let last = label.last_child();
    label.insert_before(&span, last.as_ref());
    Some(span)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
