//! Application state
//!
//! Holds all shared components and state

use crate::device_store::DeviceStore;
use crate::mqtt_gateway::MqttGateway;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database URL
    pub database_url: String,
    /// MQTT broker host
    pub mqtt_host: String,
    /// MQTT broker port
    pub mqtt_port: u16,
    /// Zigbee2MQTT base topic
    pub root_topic: String,
    /// Device registry GraphQL endpoint
    pub registry_endpoint: String,
    /// Controller name reported with every registration
    pub controller_name: String,
    /// Per-call registry timeout in seconds
    pub registry_timeout_sec: u64,
    /// Server port
    pub port: u16,
    /// Server host
    pub host: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://z2m-controller.db?mode=rwc".to_string()),
            mqtt_host: std::env::var("MQTT_HOST").unwrap_or_else(|_| "localhost".to_string()),
            mqtt_port: std::env::var("MQTT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1883),
            root_topic: std::env::var("ROOT_TOPIC")
                .unwrap_or_else(|_| "zigbee2mqtt".to_string()),
            registry_endpoint: std::env::var("REGISTRY_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4000".to_string()),
            controller_name: std::env::var("CONTROLLER_NAME")
                .unwrap_or_else(|_| "service.controller.zigbee2mqtt".to_string()),
            registry_timeout_sec: std::env::var("REGISTRY_TIMEOUT_SEC")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }
}

/// Application state shared across handlers
///
/// Handlers get read access to the store; every write goes through the
/// reconciler, which is owned by its worker task and deliberately absent
/// here.
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Tracked device records (read-only from here)
    pub store: DeviceStore,
    /// Broker handle for set commands
    pub mqtt: Arc<MqttGateway>,
    /// Broker session state, maintained by the event loop
    pub mqtt_connected: Arc<AtomicBool>,
}
