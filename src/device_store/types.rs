//! Device store records

use crate::bridge::BridgeDevice;
use serde::{Deserialize, Serialize};

/// A registration confirmed by the registry.
///
/// Created only by a successful registration response, deleted only by a
/// confirmed unregistration. Immutable between reconciliation cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Opaque ID assigned by the registry.
    pub registry_id: String,
    /// Raw snapshot entry that produced the registration.
    pub device: BridgeDevice,
}

/// One mutation of an atomic batch.
#[derive(Debug, Clone)]
pub enum StoreOp {
    Set(DeviceRecord),
    Delete(String),
}
