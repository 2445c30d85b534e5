//! Per-node annotation state.
//!
//! The state lives in attributes on the annotated node itself, so it goes
//! away with the node. A node is counted at most once: annotating a marked
//! node is a no-op, and re-annotating after a reversal rewrites the
//! existing suffix instead of appending a second one.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use fceplus_dataset::{CourseId, Lookup, ReferenceStore};
use fceplus_dom::Node;

use crate::aggregate::AggregateEngine;
use crate::error::EngineError;

/// Effective hours counted for the node.
pub const HOURS_ATTR: &str = "data-fce-hours";
/// Canonical course id.
pub const COURSE_ATTR: &str = "data-fce-course";
/// Where the hours came from, see [`HoursSource`].
pub const SOURCE_ATTR: &str = "data-fce-source";
/// Aggregate epoch the node was counted in.
pub const EPOCH_ATTR: &str = "data-fce-epoch";
/// Present (as `detail`) on display-only annotations.
pub const ROLE_ATTR: &str = "data-fce-role";
/// Class of the inserted suffix span.
pub const SUFFIX_CLASS: &str = "fce-suffix";

const DETAIL_ROLE: &str = "detail";

/// Where a node's effective hours came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursSource {
    /// Average from the reference dataset.
    Reference,
    /// Dataset loaded without this course; declared units used.
    Fallback,
    /// Dataset not available; declared units used.
    Declared,
}

impl HoursSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Fallback => "fallback",
            Self::Declared => "declared",
        }
    }
}

impl fmt::Display for HoursSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoursSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(Self::Reference),
            "fallback" => Ok(Self::Fallback),
            "declared" => Ok(Self::Declared),
            _ => Err(()),
        }
    }
}

/// State read back from a counted node.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub course_id: CourseId,
    pub hours: f64,
    pub source: HoursSource,
}

/// Result of [`try_annotate`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotateOutcome {
    Annotated(Annotation),
    AlreadyAnnotated,
}

/// Whether the node carries any annotation marker, counted or display-only.
pub fn is_annotated(node: &Node) -> bool {
    node.has_attribute(HOURS_ATTR)
}

/// Whether the node is a counted (non-detail) annotation.
pub fn is_counted(node: &Node) -> bool {
    is_annotated(node) && node.attribute(ROLE_ATTR).as_deref() != Some(DETAIL_ROLE)
}

/// Whether a counted node was annotated in the aggregate's current epoch.
pub fn is_current(node: &Node, aggregate: &AggregateEngine) -> bool {
    node.attribute(EPOCH_ATTR)
        .and_then(|e| e.parse::<u64>().ok())
        == Some(aggregate.epoch())
}

/// Drop counted markers left over from before the last reset.
///
/// Returns `true` if the node had any. The suffix text stays.
pub fn expire_if_stale(node: &Node, aggregate: &AggregateEngine) -> bool {
    if is_counted(node) && !is_current(node, aggregate) {
        clear_markers(node);
        return true;
    }
    false
}

/// Read the counted annotation back from a node.
pub fn annotation_of(node: &Node) -> Option<Annotation> {
    if !is_counted(node) {
        return None;
    }
    let hours = node.attribute(HOURS_ATTR)?.parse::<f64>().ok()?;
    let course_id = CourseId::parse(&node.attribute(COURSE_ATTR)?)?;
    let source = node.attribute(SOURCE_ATTR)?.parse().ok()?;
    Some(Annotation {
        course_id,
        hours,
        source,
    })
}

/// Annotate a course row and count it.
///
/// Effective hours are the dataset average when there is one, otherwise
/// the declared units, otherwise zero. A zero average is a real value.
pub fn try_annotate(
    node: &Node,
    course_id: &CourseId,
    declared_hours: Option<f64>,
    store: &ReferenceStore,
    aggregate: &mut AggregateEngine,
) -> AnnotateOutcome {
    expire_if_stale(node, aggregate);
    if is_annotated(node) {
        return AnnotateOutcome::AlreadyAnnotated;
    }

    let fallback = declared_hours.unwrap_or(0.0);
    let (hours, source, suffix) = match store.lookup(course_id) {
        Lookup::Found(avg) => (
            avg,
            HoursSource::Reference,
            Some(format!(" (FCE avg: {})", avg)),
        ),
        Lookup::Missing => (
            fallback,
            HoursSource::Fallback,
            Some(" (FCE: no data)".to_string()),
        ),
        Lookup::Unavailable => (fallback, HoursSource::Declared, None),
    };

    write_suffix(node, suffix.as_deref());
    node.set_attribute(HOURS_ATTR, hours.to_string());
    node.set_attribute(COURSE_ATTR, course_id.as_str());
    node.set_attribute(SOURCE_ATTR, source.as_str());
    node.set_attribute(EPOCH_ATTR, aggregate.epoch().to_string());

    aggregate.add(hours);
    if source == HoursSource::Fallback {
        aggregate.missing_mut().insert(course_id.clone());
    }

    debug!(course = %course_id, hours, source = %source, "Annotated course row");
    AnnotateOutcome::Annotated(Annotation {
        course_id: course_id.clone(),
        hours,
        source,
    })
}

/// Annotate a popup's units cell for display only.
///
/// Detail annotations never reach the running total or the missing set.
pub fn annotate_detail(target: &Node, course_id: &CourseId, store: &ReferenceStore) -> bool {
    if is_annotated(target) {
        return false;
    }
    let (hours, suffix) = match store.lookup(course_id) {
        Lookup::Found(avg) => (avg, Some(format!(" (FCE: {})", avg))),
        Lookup::Missing => (0.0, Some(" (FCE: no data)".to_string())),
        Lookup::Unavailable => (0.0, None),
    };
    write_suffix(target, suffix.as_deref());
    target.set_attribute(HOURS_ATTR, hours.to_string());
    target.set_attribute(COURSE_ATTR, course_id.as_str());
    target.set_attribute(ROLE_ATTR, DETAIL_ROLE);
    debug!(course = %course_id, "Annotated detail popup");
    true
}

/// Undo a counted annotation and subtract it from the aggregate.
///
/// Returns the subtracted hours. The suffix span stays in place. A node
/// counted before the last reset loses its markers and subtracts nothing.
pub fn reverse_annotation(node: &Node, aggregate: &mut AggregateEngine) -> Result<f64, EngineError> {
    let annotation = annotation_of(node).ok_or(EngineError::NotAnnotated)?;
    if !is_current(node, aggregate) {
        let epoch = node
            .attribute(EPOCH_ATTR)
            .and_then(|e| e.parse::<u64>().ok())
            .unwrap_or_default();
        clear_markers(node);
        return Err(EngineError::StaleAnnotation { epoch });
    }

    if annotation.source == HoursSource::Fallback {
        aggregate.missing_mut().remove(&annotation.course_id);
    }
    aggregate.remove(annotation.hours);
    clear_markers(node);

    debug!(course = %annotation.course_id, hours = annotation.hours, "Reversed course row");
    Ok(annotation.hours)
}

/// Drop the markers without touching the aggregate.
fn clear_markers(node: &Node) {
    node.remove_attribute(HOURS_ATTR);
    node.remove_attribute(COURSE_ATTR);
    node.remove_attribute(SOURCE_ATTR);
    node.remove_attribute(EPOCH_ATTR);
}

fn write_suffix(node: &Node, suffix: Option<&str>) {
    let existing = node
        .children()
        .into_iter()
        .find(|c| c.has_class(SUFFIX_CLASS));
    match (existing, suffix) {
        (Some(span), Some(text)) => span.set_text_content(text),
        (Some(span), None) => span.set_text_content(""),
        (None, Some(text)) => {
            node.append_child(
                &Node::element("span")
                    .with_class(SUFFIX_CLASS)
                    .with_text(text),
            );
        }
        (None, None) => {}
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
