//! Scheduled course block in the calendar grid.
//!
//! In the planner, calendar blocks are the last thing rendered in a pass, so
//! their arrival means the total label is in place. On the static schedule
//! listing they are the only place course ids appear.

use std::sync::LazyLock;

use regex::Regex;

use fceplus_dataset::CourseId;
use fceplus_dom::Node;

use super::PatternMatcher;
use crate::error::MatchFailure;

static HYPHENATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d\d)-(\d\d\d)\b").expect("course pattern is valid"));

// Bare five-digit tokens also show up as room numbers; only used when no
// hyphenated id is present.
static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d\d)(\d\d\d)\b").expect("course pattern is valid"));

static UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*units?\b").expect("units pattern is valid")
});

/// A scraped calendar entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub course_id: CourseId,
    /// Units, when the entry prints them.
    pub declared_hours: Option<f64>,
}

/// Matches `gwt-appointment` blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarEntryMatcher;

impl PatternMatcher for CalendarEntryMatcher {
    type Match = CalendarEntry;

    fn name(&self) -> &'static str {
        "calendar_entry"
    }

    fn recognizes(&self, node: &Node) -> bool {
        node.has_class("gwt-appointment")
    }

    fn extract(&self, node: &Node) -> Result<Option<CalendarEntry>, MatchFailure> {
        let text = node.text_content();
        let caps = HYPHENATED
            .captures(&text)
            .or_else(|| BARE.captures(&text))
            .ok_or_else(|| MatchFailure::new(self.name(), "no course id in entry text"))?;
        let course_id = CourseId::from_parts(&caps[1], &caps[2])
            .ok_or_else(|| MatchFailure::new(self.name(), "malformed course id"))?;
        let declared_hours = UNITS
            .captures(&text)
            .and_then(|c| c[1].parse::<f64>().ok());
        Ok(Some(CalendarEntry {
            course_id,
            declared_hours,
        }))
    }
}
