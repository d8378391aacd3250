//! MQTT Gateway
//!
//! ## Responsibilities
//!
//! - Maintain the broker session and resubscribe on every reconnect
//! - Decode `{root_topic}/bridge/devices` publishes into snapshots and
//!   feed them to the reconciler through a bounded queue
//!
//! The bridge publishes the device list retained and republishes it on
//! every network change, so a dropped or missed snapshot is recovered by
//! the next publish. That makes it safe to drop on a full queue and to
//! ignore malformed payloads.

use crate::bridge::BridgeDevice;
use crate::state::AppConfig;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const MQTT_CLIENT_ID: &str = "z2m-registry-controller";

/// Handle for talking to the broker.
#[derive(Clone)]
pub struct MqttGateway {
    client: AsyncClient,
    root_topic: String,
}

impl MqttGateway {
    /// Open a broker session. The returned event loop must be polled by
    /// `spawn_event_loop` for anything to flow.
    pub fn connect(config: &AppConfig) -> (Self, EventLoop) {
        let mut options = MqttOptions::new(MQTT_CLIENT_ID, config.mqtt_host.clone(), config.mqtt_port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, event_loop) = AsyncClient::new(options, 64);
        let gateway = Self {
            client,
            root_topic: config.root_topic.clone(),
        };
        (gateway, event_loop)
    }

    pub fn devices_topic(&self) -> String {
        format!("{}/bridge/devices", self.root_topic)
    }

    fn set_topic(&self, friendly_name: &str) -> String {
        format!("{}/{}/set", self.root_topic, friendly_name)
    }

    async fn subscribe_devices(&self) -> crate::Result<()> {
        self.client
            .subscribe(self.devices_topic(), QoS::AtLeastOnce)
            .await
            .map_err(|e| crate::Error::Mqtt(e.to_string()))
    }

    /// Publish a state change to one device's `set` topic.
    pub async fn publish_set(
        &self,
        friendly_name: &str,
        payload: &serde_json::Value,
    ) -> crate::Result<()> {
        let topic = self.set_topic(friendly_name);
        info!(topic = %topic, "MqttGateway: Publishing set command");

        self.client
            .publish(topic, QoS::AtLeastOnce, false, serde_json::to_vec(payload)?)
            .await
            .map_err(|e| crate::Error::Mqtt(e.to_string()))
    }
}

/// Drive the broker session forever.
///
/// Snapshots go to `snapshots` with `try_send`: when the reconciler is
/// mid-cycle and the queue is full, the publish is dropped and the next
/// retained publish covers it. `connected` mirrors the session state for
/// the health endpoint.
pub fn spawn_event_loop(
    gateway: Arc<MqttGateway>,
    mut event_loop: EventLoop,
    snapshots: mpsc::Sender<Vec<BridgeDevice>>,
    connected: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("MqttGateway: Event loop started");
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connected.store(true, Ordering::Relaxed);
                    info!(
                        topic = %gateway.devices_topic(),
                        "MqttGateway: Connected, subscribing to device snapshots"
                    );
                    if let Err(e) = gateway.subscribe_devices().await {
                        error!(error = %e, "MqttGateway: Subscribe failed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic != gateway.devices_topic() {
                        continue;
                    }
                    let snapshot: Vec<BridgeDevice> =
                        match serde_json::from_slice(&publish.payload) {
                            Ok(snapshot) => snapshot,
                            Err(e) => {
                                warn!(error = %e, "MqttGateway: Ignoring malformed device snapshot");
                                continue;
                            }
                        };

                    debug!(devices = snapshot.len(), "MqttGateway: Device snapshot received");
                    match snapshots.try_send(snapshot) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            warn!("MqttGateway: Snapshot queue full, dropping publish");
                        }
                        Err(TrySendError::Closed(_)) => {
                            error!("MqttGateway: Snapshot queue closed, stopping event loop");
                            break;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    connected.store(false, Ordering::Relaxed);
                    error!(error = %e, "MqttGateway: Connection lost, retrying");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    })
}
