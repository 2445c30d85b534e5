//! Course description dialog.

use std::sync::LazyLock;

use regex::Regex;

use fceplus_dataset::CourseId;
use fceplus_dom::{Node, Selector};

use super::PatternMatcher;
use crate::error::MatchFailure;

static TITLE_COURSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d\d)-(\d\d\d)").expect("title pattern is valid"));

static CAPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".Caption").expect("caption selector is valid"));

static SECTIONS_TABLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".course-description-sections-tbl").expect("table selector is valid")
});

static UNITS_CELL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("tr:last-child td:last-child div:last-child")
        .expect("units cell selector is valid")
});

/// A scraped detail popup.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPopup {
    pub course_id: CourseId,
    /// Units cell of the last section row; the annotation goes here.
    pub target: Node,
}

/// Matches `gwt-DialogBox` dialogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailPopupMatcher;

impl PatternMatcher for DetailPopupMatcher {
    type Match = DetailPopup;

    fn name(&self) -> &'static str {
        "detail_popup"
    }

    fn recognizes(&self, node: &Node) -> bool {
        node.has_class("gwt-DialogBox")
    }

    fn extract(&self, node: &Node) -> Result<Option<DetailPopup>, MatchFailure> {
        let fail = |reason: &str| MatchFailure::new(self.name(), reason);

        let title = node
            .query_selector(&CAPTION)
            .ok_or_else(|| fail("no .Caption title"))?;
        let table = node
            .query_selector(&SECTIONS_TABLE)
            .ok_or_else(|| fail("no sections table"))?;
        let target = table
            .query_selector(&UNITS_CELL)
            .ok_or_else(|| fail("no units cell in sections table"))?;

        let title_text = title.text_content();
        let caps = TITLE_COURSE
            .captures(&title_text)
            .ok_or_else(|| fail("title carries no course id"))?;
        let course_id =
            CourseId::from_parts(&caps[1], &caps[2]).ok_or_else(|| fail("malformed course id"))?;

        Ok(Some(DetailPopup { course_id, target }))
    }
}
