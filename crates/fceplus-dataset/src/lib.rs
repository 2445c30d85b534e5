//! Reference dataset for fceplus.
//!
//! The dataset maps a course identifier to the average hours per week
//! students reported spending on it. It is published as a single JSON
//! object keyed by course id:
//!
//! ```json
//! {"15780": {"hrs": 10.5, "year": "2017", "instructor": "..."}, ...}
//! ```
//!
//! Only `hrs` is read. A per-entry shape mismatch yields an entry without an
//! average rather than an error; only transport failures and a payload that
//! is not a JSON object are errors.

mod client;
mod course_id;
mod dataset;
mod error;
mod store;

pub use client::{DatasetClient, DEFAULT_DATASET_URL};
pub use course_id::CourseId;
pub use dataset::{ReferenceDataset, ReferenceEntry};
pub use error::DatasetError;
pub use store::{Lookup, ReferenceStore};
