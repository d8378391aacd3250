//! Snapshot Reconciler
//!
//! ## Responsibilities
//!
//! - Diff each bridge snapshot against the tracked device records
//! - Drive registry registration and unregistration concurrently
//! - Commit confirmed changes to the store in a single batch
//! - Contain per-device and per-half failures so no snapshot, however
//!   malformed or ill-timed, takes the daemon down
//!
//! The reconciler is the only writer of the device store. Snapshots are
//! consumed from a bounded queue strictly one at a time, so cycles never
//! overlap and a state left behind by a failed half is retried naturally
//! on the next publish.

mod service;
mod types;

pub use service::{diff_snapshot, ReconcilerService};
pub use types::{CycleReport, NormalizationFailure, SnapshotDiff};
