//! Reconciliation cycle types

use crate::bridge::BridgeDevice;

/// What one snapshot means against the tracked records.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiff {
    /// Supported devices present on the network but not yet tracked,
    /// in snapshot order.
    pub to_register: Vec<BridgeDevice>,
    /// Registry IDs of tracked devices whose address left the network.
    pub to_unregister: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.to_register.is_empty() && self.to_unregister.is_empty()
    }
}

/// One device the normalizer rejected during a cycle.
#[derive(Debug, Clone)]
pub struct NormalizationFailure {
    pub ieee_address: String,
    pub friendly_name: String,
    pub error: String,
}

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub snapshot_devices: usize,
    pub registered: usize,
    pub unregistered: usize,
    pub normalization_failures: Vec<NormalizationFailure>,
    pub register_error: Option<String>,
    pub unregister_error: Option<String>,
}

impl CycleReport {
    /// True when the cycle changed nothing and hit no failures.
    pub fn is_noop(&self) -> bool {
        self.registered == 0
            && self.unregistered == 0
            && self.normalization_failures.is_empty()
            && self.register_error.is_none()
            && self.unregister_error.is_none()
    }
}
