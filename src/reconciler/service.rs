//! Reconciliation engine

use super::types::{CycleReport, NormalizationFailure, SnapshotDiff};
use crate::bridge::BridgeDevice;
use crate::capability::{normalize_device, DeviceInput};
use crate::device_store::{DeviceRecord, DeviceStore, StoreOp};
use crate::registry_client::{RegistryClient, RegistryError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Diff a bridge snapshot against the tracked records.
///
/// Registration candidates keep snapshot order. A device present in the
/// snapshot keeps its tracked record alive even when `supported` is
/// false; only an address that left the network entirely is a removal.
pub fn diff_snapshot(snapshot: &[BridgeDevice], records: &[DeviceRecord]) -> SnapshotDiff {
    let tracked: HashSet<&str> = records
        .iter()
        .map(|r| r.device.ieee_address.as_str())
        .collect();
    let present: HashSet<&str> = snapshot.iter().map(|d| d.ieee_address.as_str()).collect();

    let to_register = snapshot
        .iter()
        .filter(|d| d.supported && !tracked.contains(d.ieee_address.as_str()))
        .cloned()
        .collect();

    let to_unregister = records
        .iter()
        .filter(|r| !present.contains(r.device.ieee_address.as_str()))
        .map(|r| r.registry_id.clone())
        .collect();

    SnapshotDiff {
        to_register,
        to_unregister,
    }
}

// ========================================
// Reconciler Service
// ========================================

/// Drives the registry and the local store toward each bridge snapshot.
///
/// The service owns all store writes; other components only read. Cycles
/// run strictly one at a time off the snapshot queue.
pub struct ReconcilerService {
    store: DeviceStore,
    registry: Arc<RegistryClient>,
}

impl ReconcilerService {
    pub fn new(store: DeviceStore, registry: Arc<RegistryClient>) -> Self {
        Self { store, registry }
    }

    /// Run one reconciliation cycle against a bridge snapshot.
    ///
    /// Registration and unregistration run concurrently; each half either
    /// fully succeeds or leaves its records untouched for the next cycle.
    /// Confirmed changes from both halves land in the store as one batch.
    /// `Err` is reserved for store failures, which abort the whole cycle.
    pub async fn reconcile(&self, snapshot: &[BridgeDevice]) -> crate::Result<CycleReport> {
        let records = self.store.values().await?;
        let diff = diff_snapshot(snapshot, &records);

        let mut report = CycleReport {
            snapshot_devices: snapshot.len(),
            ..CycleReport::default()
        };

        if diff.is_empty() {
            return Ok(report);
        }

        // Normalize per device so one rejected device never blocks the batch.
        let mut candidates: Vec<BridgeDevice> = Vec::new();
        let mut inputs: Vec<DeviceInput> = Vec::new();
        for device in &diff.to_register {
            match normalize_device(device) {
                Ok(input) => {
                    candidates.push(device.clone());
                    inputs.push(input);
                }
                Err(e) => {
                    warn!(
                        ieee_address = %device.ieee_address,
                        friendly_name = %device.friendly_name,
                        error = %e,
                        "Reconciler: Skipping device the registry schema cannot express"
                    );
                    report.normalization_failures.push(NormalizationFailure {
                        ieee_address: device.ieee_address.clone(),
                        friendly_name: device.friendly_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let (register_result, unregister_result) = tokio::join!(
            self.register_half(&candidates, &inputs),
            self.unregister_half(&diff.to_unregister),
        );

        let mut ops: Vec<StoreOp> = Vec::new();
        match register_result {
            Ok(set_ops) => {
                report.registered = set_ops.len();
                ops.extend(set_ops);
            }
            Err(e) => {
                error!(error = %e, "Reconciler: Register half failed, records unchanged until next cycle");
                report.register_error = Some(e.to_string());
            }
        }
        match unregister_result {
            Ok(delete_ops) => {
                report.unregistered = delete_ops.len();
                ops.extend(delete_ops);
            }
            Err(e) => {
                error!(error = %e, "Reconciler: Unregister half failed, records unchanged until next cycle");
                report.unregister_error = Some(e.to_string());
            }
        }

        if !ops.is_empty() {
            self.store.batch_apply(ops).await?;
        }

        Ok(report)
    }

    /// Register new devices and turn the confirmations into store writes.
    ///
    /// `devices` and `inputs` are parallel: `inputs[i]` is the normalized
    /// form of `devices[i]`, and the registry response correlates with
    /// them by position.
    async fn register_half(
        &self,
        devices: &[BridgeDevice],
        inputs: &[DeviceInput],
    ) -> Result<Vec<StoreOp>, RegistryError> {
        if devices.is_empty() {
            return Ok(Vec::new());
        }

        let registered = self.registry.register_many(inputs).await?;
        Ok(devices
            .iter()
            .zip(registered)
            .map(|(device, confirmation)| {
                StoreOp::Set(DeviceRecord {
                    registry_id: confirmation.id,
                    device: device.clone(),
                })
            })
            .collect())
    }

    /// Unregister departed devices, deleting only the IDs the registry
    /// confirmed.
    async fn unregister_half(&self, ids: &[String]) -> Result<Vec<StoreOp>, RegistryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let deleted = self.registry.unregister_many(ids).await?;
        Ok(deleted.into_iter().map(StoreOp::Delete).collect())
    }

    /// Spawn the serial worker that drains the snapshot queue.
    ///
    /// One cycle at a time; the queue bound is enforced on the publishing
    /// side, so a slow registry backs pressure up to the MQTT gateway.
    pub fn start(self: Arc<Self>, mut snapshots: mpsc::Receiver<Vec<BridgeDevice>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Reconciler: Worker started");
            while let Some(snapshot) = snapshots.recv().await {
                match self.reconcile(&snapshot).await {
                    Ok(report) if report.is_noop() => {
                        debug!(
                            devices = report.snapshot_devices,
                            "Reconciler: Snapshot already in sync"
                        );
                    }
                    Ok(report) => {
                        info!(
                            devices = report.snapshot_devices,
                            registered = report.registered,
                            unregistered = report.unregistered,
                            skipped = report.normalization_failures.len(),
                            "Reconciler: Cycle complete"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Reconciler: Cycle aborted on store failure");
                    }
                }
            }
            info!("Reconciler: Snapshot channel closed, worker stopping");
        })
    }
}
