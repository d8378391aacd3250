//! API Routes

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::models::ApiResponse;
use crate::state::AppState;
use crate::Error;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Devices
        .route("/api/devices", get(list_devices))
        .route("/api/devices/:id", get(get_device))
        .route("/api/devices/:id/set", post(set_device))
        .with_state(state)
}

// ========================================
// Device Handlers
// ========================================

async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.values().await {
        Ok(records) => Json(ApiResponse::success(records)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_device(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.store.get(&id).await {
        Ok(Some(record)) => Json(ApiResponse::success(record)).into_response(),
        Ok(None) => Error::NotFound(format!("No tracked device with id {}", id)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Forward a state change to the device's `set` topic.
///
/// The bridge applies the change and republishes the device list, so the
/// local record updates through the normal snapshot path, not here.
async fn set_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    if let Err(e) = validate_set_payload(&payload) {
        return e.into_response();
    }

    let record = match state.store.get(&id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Error::NotFound(format!("No tracked device with id {}", id)).into_response()
        }
        Err(e) => return e.into_response(),
    };

    match state
        .mqtt
        .publish_set(&record.device.friendly_name, &payload)
        .await
    {
        Ok(()) => Json(ApiResponse::success(json!({
            "friendly_name": record.device.friendly_name
        })))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

fn validate_set_payload(payload: &serde_json::Value) -> crate::Result<()> {
    match payload.as_object() {
        Some(object) if !object.is_empty() => Ok(()),
        _ => Err(Error::Validation(
            "Set payload must be a non-empty JSON object".to_string(),
        )),
    }
}
