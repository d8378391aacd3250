//! Zigbee2MQTT Registry Controller
//!
//! Keeps a device registry in sync with the devices paired to a
//! Zigbee2MQTT bridge.
//!
//! ## Architecture (6 Components)
//!
//! 1. MqttGateway - Broker session, snapshot intake, set commands
//! 2. CapabilityNormalizer - Vendor expose tree to registry inputs
//! 3. Reconciler - Snapshot diffing and registry synchronization
//! 4. DeviceStore - Persistent record of registered devices
//! 5. RegistryClient - GraphQL batch registration calls
//! 6. WebAPI - Health and device inspection endpoints
//!
//! ## Design Principles
//!
//! - The registry and the local store only change together: a record is
//!   written exactly when the registry confirmed the registration
//! - One snapshot at a time: cycles are serialized over a bounded queue
//! - Failures stay scoped: a bad device, a failed call or a lost broker
//!   session degrades one cycle, never the process

pub mod bridge;
pub mod capability;
pub mod device_store;
pub mod error;
pub mod models;
pub mod mqtt_gateway;
pub mod reconciler;
pub mod registry_client;
pub mod state;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
