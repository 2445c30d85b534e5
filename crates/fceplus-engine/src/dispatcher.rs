//! Mutation dispatcher.
//!
//! The dispatcher is the whole engine's state: the reference store, the
//! aggregate, and the lifecycle. Host events are fed to [`Dispatcher::handle`]
//! one at a time and processed to completion.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use fceplus_dataset::{DatasetError, ReferenceDataset, ReferenceStore};
use fceplus_dom::{Document, MutationRecord, Node};

use crate::aggregate::AggregateEngine;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::matcher::{CourseRowMatcher, DetailPopupMatcher, NodeRole, PatternMatcher};
use crate::page_mode::{scan_static_listing, PageMode};
use crate::tracker::{self, AnnotateOutcome};

/// Something the host page did.
#[derive(Debug)]
pub enum HostEvent {
    /// Document finished parsing.
    DocumentReady,
    /// Page and subresources finished loading.
    PageLoad,
    /// In-page navigation.
    HashChange,
    /// One batch of tree changes.
    Mutations(Vec<MutationRecord>),
    /// The reference dataset fetch settled.
    DatasetLoaded(Result<ReferenceDataset, DatasetError>),
}

/// Dispatcher lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherState {
    /// Created, not yet subscribed to mutations.
    #[default]
    Inactive,
    /// Processing mutation batches.
    Observing,
    /// Torn down; every event is ignored.
    Disposed,
}

impl std::fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Observing => write!(f, "observing"),
            Self::Disposed => write!(f, "disposed"),
        }
    }
}

/// Routes host events through the matchers, tracker and aggregate.
pub struct Dispatcher {
    document: Document,
    mode: PageMode,
    state: DispatcherState,
    store: ReferenceStore,
    aggregate: AggregateEngine,
    hash_listener: bool,
    page_loaded: bool,
    static_scan_done: bool,
}

impl Dispatcher {
    /// Create an inactive dispatcher. The page mode is fixed here.
    pub fn new(document: Document, config: &EngineConfig) -> Self {
        let mode = PageMode::detect(&document.location(), &config.static_listing_markers);
        info!(mode = ?mode, "Dispatcher created");
        Self {
            document,
            mode,
            state: DispatcherState::Inactive,
            store: ReferenceStore::new(),
            aggregate: AggregateEngine::new(),
            hash_listener: false,
            page_loaded: false,
            static_scan_done: false,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn aggregate(&self) -> &AggregateEngine {
        &self.aggregate
    }

    /// Whether hash changes are being listened to.
    pub fn hash_listener_installed(&self) -> bool {
        self.hash_listener
    }

    /// Feed one host event.
    pub fn handle(&mut self, event: HostEvent) {
        if self.state == DispatcherState::Disposed {
            debug!(event = ?event, "Dispatcher disposed, ignoring event");
            return;
        }
        match event {
            HostEvent::DocumentReady => {
                if self.mode == PageMode::Interactive {
                    self.start_observing();
                }
            }
            HostEvent::PageLoad => {
                self.page_loaded = true;
                self.maybe_scan_static();
            }
            HostEvent::HashChange => self.on_hash_change(),
            HostEvent::Mutations(records) => self.process_batch(records),
            HostEvent::DatasetLoaded(result) => self.on_dataset_settled(result),
        }
    }

    /// Subscribe to mutation batches.
    pub fn start_observing(&mut self) {
        match self.state {
            DispatcherState::Inactive => {
                self.state = DispatcherState::Observing;
                info!("Mutation observer installed");
            }
            DispatcherState::Observing => debug!("Already observing"),
            DispatcherState::Disposed => warn!("Cannot observe after dispose"),
        }
    }

    /// Zero the aggregate after navigation.
    ///
    /// Rows counted so far become inert wherever they are, attached or
    /// already detached, so a later removal of a stale row subtracts nothing.
    /// Their suffix text stays.
    pub fn reset(&mut self) {
        self.aggregate.reset();
        for node in self.document.body().inclusive_descendants() {
            tracker::expire_if_stale(&node, &self.aggregate);
        }
        info!("Aggregate reset");
    }

    /// Stop processing events for good.
    pub fn dispose(&mut self) {
        if self.state != DispatcherState::Disposed {
            self.state = DispatcherState::Disposed;
            info!("Dispatcher disposed");
        }
    }

    /// Write the total into the page.
    pub fn render(&mut self) -> bool {
        self.aggregate.render(&self.document)
    }

    fn on_dataset_settled(&mut self, result: Result<ReferenceDataset, DatasetError>) {
        match result {
            Ok(dataset) => {
                info!(entries = dataset.len(), "FCE data loaded");
                self.store.install(dataset);
            }
            Err(e) => self.store.mark_failed(&e),
        }
        if !self.hash_listener {
            self.hash_listener = true;
            debug!("Hash change listener installed");
        }
        self.maybe_scan_static();
    }

    fn on_hash_change(&mut self) {
        if self.mode == PageMode::StaticListing {
            debug!("Static listing is scanned once, ignoring navigation");
            return;
        }
        if !self.hash_listener {
            debug!("Hash change before dataset settled, ignoring");
            return;
        }
        match self.state {
            DispatcherState::Observing => {
                self.reset();
                self.render();
            }
            DispatcherState::Inactive => self.start_observing(),
            DispatcherState::Disposed => {}
        }
    }

    fn maybe_scan_static(&mut self) {
        if self.mode != PageMode::StaticListing || self.static_scan_done || !self.page_loaded {
            return;
        }
        if !self.store.is_ready() && !self.store.is_failed() {
            return;
        }
        self.static_scan_done = true;

        let summary = scan_static_listing(&self.document, &self.store);
        info!(
            courses = summary.courses.len(),
            total = summary.total(),
            "Static listing scanned"
        );
        self.aggregate.reset();
        self.aggregate.add(summary.total());
        for id in summary.missing.ids() {
            self.aggregate.missing_mut().insert(id.clone());
        }
        self.render();
    }

    fn process_batch(&mut self, records: Vec<MutationRecord>) {
        if self.state != DispatcherState::Observing {
            debug!(records = records.len(), "Not observing, dropping batch");
            return;
        }
        for record in &records {
            for added in &record.added {
                for node in added.inclusive_descendants() {
                    match self.route_added(&node) {
                        Ok(()) => {}
                        Err(EngineError::Match(e)) => debug!(error = %e, "Skipping node"),
                        Err(e) => warn!(error = %e, node = ?node, "Failed to process added node"),
                    }
                }
            }
            for removed in &record.removed {
                for node in removed.inclusive_descendants() {
                    if !tracker::is_counted(&node) {
                        continue;
                    }
                    match tracker::reverse_annotation(&node, &mut self.aggregate) {
                        Ok(_) => {}
                        Err(e @ EngineError::StaleAnnotation { .. }) => {
                            debug!(error = %e, "Removed row was counted before navigation")
                        }
                        Err(e) => warn!(error = %e, node = ?node, "Failed to reverse removed node"),
                    }
                }
            }
            self.aggregate.commit();
        }
        if self.aggregate.is_dirty() {
            self.render();
        }
    }

    fn route_added(&mut self, node: &Node) -> EngineResult<()> {
        let Some(role) = NodeRole::classify(node) else {
            return Ok(());
        };
        match role {
            NodeRole::DetailPopup => {
                if let Some(popup) = DetailPopupMatcher.extract(node)? {
                    tracker::annotate_detail(&popup.target, &popup.course_id, &self.store);
                }
            }
            NodeRole::CalendarEntry => {
                debug!("Calendar entry rendered");
                self.render();
            }
            NodeRole::CourseRow => {
                tracker::expire_if_stale(node, &self.aggregate);
                if let Some(row) = CourseRowMatcher.extract(node)? {
                    let outcome = tracker::try_annotate(
                        node,
                        &row.course_id,
                        Some(f64::from(row.declared_hours)),
                        &self.store,
                        &mut self.aggregate,
                    );
                    if outcome == AnnotateOutcome::AlreadyAnnotated {
                        debug!(course = %row.course_id, "Course row already annotated");
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("total", &self.aggregate.total())
            .field("hash_listener", &self.hash_listener)
            .finish()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
