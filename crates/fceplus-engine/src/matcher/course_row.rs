//! Course line in the planning sidebar: `15-780 :: 12.0 units`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use fceplus_dataset::CourseId;
use fceplus_dom::Node;

use super::PatternMatcher;
use crate::error::MatchFailure;
use crate::tracker::HOURS_ATTR;

static UNITS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d\d)-?(\d\d\d)\s*::\s*(\d+)").expect("units label pattern is valid")
});

/// A scraped course row.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRow {
    pub course_id: CourseId,
    /// Whole credit units printed on the label.
    pub declared_hours: u32,
}

/// Matches `div.txt` and `.course-units` label nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseRowMatcher;

impl CourseRowMatcher {
    /// Parse a units label. The label text may already carry a suffix.
    pub fn parse_label(text: &str) -> Option<CourseRow> {
        let caps = UNITS_LABEL.captures(text)?;
        let course_id = CourseId::from_parts(&caps[1], &caps[2])?;
        let declared_hours = caps[3].parse().ok()?;
        Some(CourseRow {
            course_id,
            declared_hours,
        })
    }
}

impl PatternMatcher for CourseRowMatcher {
    type Match = CourseRow;

    fn name(&self) -> &'static str {
        "course_row"
    }

    fn recognizes(&self, node: &Node) -> bool {
        let is_txt_div = node.tag_name().as_deref() == Some("div") && node.has_class("txt");
        is_txt_div || node.has_class("course-units")
    }

    fn extract(&self, node: &Node) -> Result<Option<CourseRow>, MatchFailure> {
        if node.has_attribute(HOURS_ATTR) {
            debug!(node = ?node, "Course row already annotated");
            return Ok(None);
        }
        // `div.txt` is used for other sidebar text too; no label, no match.
        Ok(Self::parse_label(&node.text_content()))
    }
}
