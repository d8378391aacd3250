//! Registry GraphQL client

use super::types::{GraphqlError, RegisteredDevice, RegistryError};
use crate::capability::DeviceInput;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Registry mutation documents.
mod mutations {
    pub const REGISTER_MANY: &str = r#"
        mutation RegisterZigbeeDevices(
            $devices: [CreateDeviceInputDevice!]!
            $controller: String!
        ) {
            registerManyDevices(input: { devices: $devices, controller: $controller }) {
                id
            }
        }
    "#;

    pub const UNREGISTER_MANY: &str = r#"
        mutation UnregisterZigbeeDevices($devices: [UnregisterDeviceInputDevice!]!) {
            unregisterManyDevices(input: { devices: $devices }) {
                deletedDeviceIds
            }
        }
    "#;
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterManyData {
    register_many_devices: Vec<RegisteredDevice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnregisterManyData {
    unregister_many_devices: UnregisterManyResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnregisterManyResult {
    deleted_device_ids: Vec<String>,
}

/// Device registry client.
#[derive(Clone)]
pub struct RegistryClient {
    http: Client,
    endpoint: String,
    controller: String,
}

impl RegistryClient {
    /// Create new client.
    ///
    /// `timeout` bounds every call; a timed-out call fails like any other
    /// transport error.
    pub fn new(endpoint: String, controller: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            endpoint,
            controller,
        }
    }

    /// Register a batch of devices, returning their registry IDs.
    ///
    /// The response correlates positionally with `devices`: entry `i` is
    /// the registration of `devices[i]`. Ordering is a documented contract
    /// of the registry; the client can only validate lengths, and a
    /// mismatch is fatal for the call.
    pub async fn register_many(
        &self,
        devices: &[DeviceInput],
    ) -> Result<Vec<RegisteredDevice>, RegistryError> {
        info!(count = devices.len(), "RegistryClient: Registering devices");

        let data: RegisterManyData = self
            .call(
                mutations::REGISTER_MANY,
                json!({ "devices": devices, "controller": self.controller }),
            )
            .await?;

        let registered = data.register_many_devices;
        if registered.len() != devices.len() {
            warn!(
                sent = devices.len(),
                received = registered.len(),
                "RegistryClient: Registration response length mismatch"
            );
            return Err(RegistryError::Correlation {
                sent: devices.len(),
                received: registered.len(),
            });
        }

        Ok(registered)
    }

    /// Unregister a batch of registry IDs, returning the IDs the registry
    /// confirmed deleted.
    pub async fn unregister_many(&self, ids: &[String]) -> Result<Vec<String>, RegistryError> {
        info!(count = ids.len(), "RegistryClient: Unregistering devices");

        let devices: Vec<serde_json::Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        let data: UnregisterManyData = self
            .call(mutations::UNREGISTER_MANY, json!({ "devices": devices }))
            .await?;

        Ok(data.unregister_many_devices.deleted_device_ids)
    }

    /// POST one GraphQL document and decode the envelope.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, RegistryError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse<T> = response.json().await?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                debug!(count = errors.len(), "RegistryClient: GraphQL errors in response");
                return Err(RegistryError::Graphql {
                    messages: errors.into_iter().map(|e| e.message).collect(),
                });
            }
        }

        envelope.data.ok_or(RegistryError::MissingData)
    }
}
