//! Registry Sync Client
//!
//! ## Responsibilities
//!
//! - Issue the registry's two batch mutations over GraphQL/HTTP
//! - Decode the response envelope, surfacing GraphQL errors as typed
//!   failures
//! - Validate positional correlation of registration responses
//!
//! Failures here are fatal to one half of a reconciliation cycle and are
//! contained by the reconciler; they never abort the process.

mod client;
mod types;

pub use client::RegistryClient;
pub use types::{GraphqlError, RegisteredDevice, RegistryError};
