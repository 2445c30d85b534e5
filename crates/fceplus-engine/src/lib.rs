//! Mutation-driven course annotation engine.
//!
//! The host planner re-renders by swapping DOM subtrees, and the only signal
//! it gives is the stream of mutations. The engine watches that stream,
//! recognizes the course row, detail popup and calendar entry patterns,
//! annotates rows with their average hours from the reference dataset, and
//! keeps a running total in the schedule header that survives insertions,
//! removals, duplicate fires and navigation.
//!
//! ```text
//! HostEvent ──► Dispatcher ──► matcher ──► tracker ──► AggregateEngine ──► render
//!                   ▲
//!   dataset fetch ──┘ (Session multiplexes both)
//! ```

pub mod aggregate;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod page_mode;
pub mod session;
pub mod tracker;

pub use aggregate::{AggregateEngine, MissingReferenceSet, TOTAL_ID};
pub use config::EngineConfig;
pub use dispatcher::{Dispatcher, DispatcherState, HostEvent};
pub use error::{ConfigError, EngineError, EngineResult, MatchFailure};
pub use matcher::{NodeRole, PatternMatcher};
pub use page_mode::{scan_static_listing, PageMode, StaticSummary};
pub use session::{Session, SessionHandle};
pub use tracker::{AnnotateOutcome, Annotation, HoursSource};
