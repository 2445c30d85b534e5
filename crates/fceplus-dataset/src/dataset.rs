//! Reference dataset parsing.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::course_id::CourseId;
use crate::error::DatasetError;

/// Historical data for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub course_id: CourseId,
    /// Average hours per week, absent when the published entry has none.
    pub average_hours: Option<f64>,
}

/// Immutable mapping from course id to reference entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDataset {
    entries: HashMap<CourseId, ReferenceEntry>,
}

impl ReferenceDataset {
    /// Parse a published payload. A JSONP wrapper (`callback({...});`) is
    /// accepted and stripped.
    pub fn parse(body: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(strip_jsonp(body))?;
        Self::from_value(value)
    }

    /// Build from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        let Value::Object(map) = value else {
            return Err(DatasetError::Parse(
                "expected a JSON object keyed by course id".to_string(),
            ));
        };

        let mut entries: HashMap<CourseId, ReferenceEntry> = HashMap::with_capacity(map.len());
        for (key, raw) in map {
            let Some(course_id) = CourseId::from_key(&key) else {
                debug!(key = %key, "Skipping dataset key without a course id");
                continue;
            };
            let average_hours = extract_hours(&raw);
            // Keep an entry that has data over one that does not.
            let keep_existing = entries
                .get(&course_id)
                .is_some_and(|e| e.average_hours.is_some() || average_hours.is_none());
            if keep_existing {
                continue;
            }
            entries.insert(
                course_id.clone(),
                ReferenceEntry {
                    course_id,
                    average_hours,
                },
            );
        }

        Ok(Self { entries })
    }

    /// Read and parse a dataset file.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let body = std::fs::read_to_string(path)?;
        Self::parse(&body)
    }

    /// Fill renumbered courses from their previous id (`new → old`) when the
    /// new id has no entry of its own.
    pub fn with_aliases(mut self, aliases: &BTreeMap<String, String>) -> Self {
        for (new, old) in aliases {
            let (Some(new_id), Some(old_id)) = (CourseId::parse(new), CourseId::parse(old)) else {
                continue;
            };
            if self.entries.contains_key(&new_id) {
                continue;
            }
            if let Some(source) = self.entries.get(&old_id) {
                let entry = ReferenceEntry {
                    course_id: new_id.clone(),
                    average_hours: source.average_hours,
                };
                self.entries.insert(new_id, entry);
            }
        }
        self
    }

    pub fn get(&self, course_id: &CourseId) -> Option<&ReferenceEntry> {
        self.entries.get(course_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(CourseId, Option<f64>)> for ReferenceDataset {
    fn from_iter<T: IntoIterator<Item = (CourseId, Option<f64>)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(course_id, average_hours)| {
                (
                    course_id.clone(),
                    ReferenceEntry {
                        course_id,
                        average_hours,
                    },
                )
            })
            .collect();
        Self { entries }
    }
}

fn strip_jsonp(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => trimmed[open + 1..close].trim(),
        _ => trimmed,
    }
}

fn extract_hours(raw: &Value) -> Option<f64> {
    let hours = match raw.get("hrs")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    hours.is_finite().then_some(hours)
}

#[cfg(test)]
#[path = "dataset_tests.rs"]
mod tests;
