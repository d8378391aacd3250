//! Local Device Store
//!
//! ## Responsibilities
//!
//! - Durable mapping from registry-assigned IDs to the raw devices that
//!   produced them
//! - Atomic batch mutation for cycle commits
//! - Full enumeration for the reconciler's current-state view
//!
//! Mutation goes through the reconcile worker only; the HTTP surface
//! reads, never writes. There is no eviction and no querying beyond full
//! scan.

mod repository;
mod types;

pub use repository::DeviceStore;
pub use types::{DeviceRecord, StoreOp};
