//! Interactive planner vs. static semester-schedule listing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use fceplus_dataset::{CourseId, Lookup, ReferenceStore};
use fceplus_dom::{Document, Location, Selector};

use crate::aggregate::MissingReferenceSet;
use crate::matcher::{CalendarEntryMatcher, PatternMatcher};

static CALENDAR_ENTRIES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".gwt-appointment").expect("calendar selector is valid")
});

/// How the engine treats the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMode {
    /// Planner: follow mutations for the whole session.
    #[default]
    Interactive,
    /// Fully rendered schedule: one scan after page load.
    StaticListing,
}

impl PageMode {
    /// Static listing when the hash or path contains any marker.
    pub fn detect(location: &Location, markers: &[String]) -> Self {
        let is_static = markers
            .iter()
            .any(|m| location.hash.contains(m.as_str()) || location.path.contains(m.as_str()));
        if is_static {
            Self::StaticListing
        } else {
            Self::Interactive
        }
    }
}

/// Result of a static listing scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticSummary {
    /// Effective hours per unique course.
    pub courses: BTreeMap<CourseId, f64>,
    /// Courses counted from declared units because the dataset lacks them.
    pub missing: MissingReferenceSet,
}

impl StaticSummary {
    /// Sum over unique courses, rounded to two decimals.
    pub fn total(&self) -> f64 {
        let sum: f64 = self.courses.values().sum();
        (sum * 100.0).round() / 100.0
    }

    /// Add one calendar entry. A course already seen is not counted again.
    pub fn record(&mut self, course_id: CourseId, declared_hours: Option<f64>, store: &ReferenceStore) {
        if self.courses.contains_key(&course_id) {
            return;
        }
        let hours = match store.lookup(&course_id) {
            Lookup::Found(avg) => avg,
            Lookup::Missing => {
                self.missing.insert(course_id.clone());
                declared_hours.unwrap_or(0.0)
            }
            Lookup::Unavailable => declared_hours.unwrap_or(0.0),
        };
        self.courses.insert(course_id, hours);
    }
}

/// Collect every rendered calendar entry, one count per course.
pub fn scan_static_listing(document: &Document, store: &ReferenceStore) -> StaticSummary {
    let matcher = CalendarEntryMatcher;
    let mut summary = StaticSummary::default();
    for node in document.query_selector_all(&CALENDAR_ENTRIES) {
        match matcher.extract(&node) {
            Ok(Some(entry)) => summary.record(entry.course_id, entry.declared_hours, store),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "Skipping calendar entry"),
        }
    }
    summary
}
