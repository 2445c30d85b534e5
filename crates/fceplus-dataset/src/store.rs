//! Session-scoped holder of the reference dataset.

use tracing::warn;

use crate::course_id::CourseId;
use crate::dataset::{ReferenceDataset, ReferenceEntry};
use crate::error::DatasetError;

#[derive(Debug, Default)]
enum StoreState {
    #[default]
    Pending,
    Ready(ReferenceDataset),
    Failed,
}

/// Result of resolving a course against the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    /// No dataset yet (still loading, or the load failed).
    Unavailable,
    /// Dataset loaded, but it has no average for this course.
    Missing,
    /// Average hours from the dataset.
    Found(f64),
}

/// Holds the dataset for the rest of the session once it arrives.
///
/// Lookups never block: before the dataset is installed every course
/// resolves to [`Lookup::Unavailable`].
#[derive(Debug, Default)]
pub struct ReferenceStore {
    state: StoreState,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that is already loaded, mostly for tests and one-shot tools.
    pub fn ready(dataset: ReferenceDataset) -> Self {
        Self {
            state: StoreState::Ready(dataset),
        }
    }

    /// Replace the contents wholesale with a freshly loaded dataset.
    pub fn install(&mut self, dataset: ReferenceDataset) {
        self.state = StoreState::Ready(dataset);
    }

    /// Record a failed load. The session continues in declared-hours mode.
    pub fn mark_failed(&mut self, error: &DatasetError) {
        warn!(error = %error, "Reference dataset unavailable, using declared hours only");
        self.state = StoreState::Failed;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, StoreState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, StoreState::Failed)
    }

    /// Raw entry lookup; `None` until loaded.
    pub fn get(&self, course_id: &CourseId) -> Option<&ReferenceEntry> {
        match &self.state {
            StoreState::Ready(dataset) => dataset.get(course_id),
            _ => None,
        }
    }

    /// Resolve a course to its average hours.
    pub fn lookup(&self, course_id: &CourseId) -> Lookup {
        match &self.state {
            StoreState::Ready(dataset) => match dataset.get(course_id).and_then(|e| e.average_hours) {
                Some(hours) => Lookup::Found(hours),
                None => Lookup::Missing,
            },
            StoreState::Pending | StoreState::Failed => Lookup::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CourseId {
        CourseId::parse(s).unwrap()
    }

    fn dataset() -> ReferenceDataset {
        vec![(id("15780"), Some(10.5)), (id("15213"), None)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_pending_store_is_unavailable() {
        let store = ReferenceStore::new();
        assert!(!store.is_ready());
        assert_eq!(store.lookup(&id("15780")), Lookup::Unavailable);
        assert!(store.get(&id("15780")).is_none());
    }

    #[test]
    fn test_ready_store_lookup() {
        let store = ReferenceStore::ready(dataset());
        assert_eq!(store.lookup(&id("15780")), Lookup::Found(10.5));
        assert_eq!(store.lookup(&id("15213")), Lookup::Missing);
        assert_eq!(store.lookup(&id("99999")), Lookup::Missing);
    }

    #[test]
    fn test_install_replaces_wholesale() {
        let mut store = ReferenceStore::ready(dataset());
        store.install(vec![(id("99999"), Some(3.0))].into_iter().collect());
        assert_eq!(store.lookup(&id("15780")), Lookup::Missing);
        assert_eq!(store.lookup(&id("99999")), Lookup::Found(3.0));
    }

    #[test]
    fn test_failed_store_is_unavailable() {
        let mut store = ReferenceStore::new();
        store.mark_failed(&DatasetError::Network("connection refused".to_string()));
        assert!(store.is_failed());
        assert_eq!(store.lookup(&id("15780")), Lookup::Unavailable);
    }
}
