//! Persistent job store: records, lifecycle transitions, and disk-backed
//! storage for subprocess jobs.

pub mod model;
pub mod store;

pub use model::{JobRecord, JobStatus};
pub use store::JobStore;
