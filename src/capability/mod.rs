//! Capability Normalizer
//!
//! ## Responsibilities
//!
//! - Resolve vendor access bitmasks through a fixed table
//! - Flatten `light`/`switch` wrapper nodes depth-first
//! - Map leaf nodes onto the registry's flat capability inputs,
//!   forwarding only the documented fields per kind
//!
//! Normalization is pure: no I/O, no shared state. Failures are scoped to
//! the one device being normalized and are isolated by the reconciler.

mod normalize;
mod types;

pub use normalize::{map_access, normalize_device, normalize_exposes};
pub use types::*;
