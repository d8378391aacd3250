//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Request validation
//! - Response formatting
//!
//! The API only reads device records; all writes stay with the
//! reconciler. Set commands go out through the MQTT gateway and take
//! effect when the bridge applies them.

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::atomic::Ordering;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let tracked = state.store.keys().await;

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        db_connected: tracked.is_ok(),
        mqtt_connected: state.mqtt_connected.load(Ordering::Relaxed),
        tracked_devices: tracked.map(|keys| keys.len()).unwrap_or(0),
    };

    Json(response)
}
