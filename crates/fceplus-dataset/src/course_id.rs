//! Canonical course identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Five-digit course code: two department digits followed by three course
/// digits. `15-780` and `15780` are the same course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Parse the display (`DD-DDD`) or concatenated (`DDDDD`) form.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits: String = match s.len() {
            5 => s.to_string(),
            6 if s.as_bytes()[2] == b'-' => format!("{}{}", &s[..2], &s[3..]),
            _ => return None,
        };
        if digits.len() == 5 && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(digits))
        } else {
            None
        }
    }

    /// Build from department and number parts, e.g. `("15", "780")`.
    pub fn from_parts(department: &str, number: &str) -> Option<Self> {
        Self::parse(&format!("{}{}", department, number))
    }

    /// Normalize a dataset key such as `10701`, `10-701` or `F14-10-701`:
    /// keep the digits and take the last five.
    pub fn from_key(key: &str) -> Option<Self> {
        let digits: Vec<char> = key.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < 5 {
            return None;
        }
        Some(Self(digits[digits.len() - 5..].iter().collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form, e.g. `15-780`.
    pub fn display_form(&self) -> String {
        format!("{}-{}", &self.0[..2], &self.0[2..])
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_forms() {
        assert_eq!(CourseId::parse("15780").unwrap().as_str(), "15780");
        assert_eq!(CourseId::parse("15-780").unwrap().as_str(), "15780");
        assert_eq!(CourseId::parse(" 15-780 ").unwrap().as_str(), "15780");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(CourseId::parse("1578").is_none());
        assert!(CourseId::parse("157800").is_none());
        assert!(CourseId::parse("15_780").is_none());
        assert!(CourseId::parse("ab-cde").is_none());
        assert!(CourseId::parse("1a780").is_none());
    }

    #[test]
    fn test_from_key_takes_last_five_digits() {
        assert_eq!(CourseId::from_key("F14-10-701").unwrap().as_str(), "10701");
        assert_eq!(CourseId::from_key("10-701").unwrap().as_str(), "10701");
        assert!(CourseId::from_key("S18").is_none());
    }

    #[test]
    fn test_display_form() {
        let id = CourseId::from_parts("15", "780").unwrap();
        assert_eq!(id.display_form(), "15-780");
        assert_eq!(id.to_string(), "15780");
    }

    #[test]
    fn test_serde_transparent() {
        let id = CourseId::parse("15780").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"15780\"");
    }
}
