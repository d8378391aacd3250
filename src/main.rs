//! Zigbee2MQTT Registry Controller
//!
//! Main entry point for the controller daemon.

use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use z2m_registry_controller::{
    device_store::DeviceStore,
    mqtt_gateway::{self, MqttGateway},
    reconciler::ReconcilerService,
    registry_client::RegistryClient,
    state::{AppConfig, AppState},
    web_api,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "z2m_registry_controller=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Zigbee2MQTT Registry Controller v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        database_url = %config.database_url,
        mqtt_host = %config.mqtt_host,
        mqtt_port = config.mqtt_port,
        root_topic = %config.root_topic,
        registry_endpoint = %config.registry_endpoint,
        controller_name = %config.controller_name,
        "Configuration loaded"
    );

    // Create database pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;

    let store = DeviceStore::new(pool);
    store.init().await?;
    tracing::info!("DeviceStore initialized");

    let registry = Arc::new(RegistryClient::new(
        config.registry_endpoint.clone(),
        config.controller_name.clone(),
        Duration::from_secs(config.registry_timeout_sec),
    ));
    let reconciler = Arc::new(ReconcilerService::new(store.clone(), registry));
    tracing::info!("ReconcilerService initialized");

    // Wire the snapshot path: broker -> bounded queue -> serial worker
    let (gateway, event_loop) = MqttGateway::connect(&config);
    let mqtt = Arc::new(gateway);
    let mqtt_connected = Arc::new(AtomicBool::new(false));
    let (snapshot_tx, snapshot_rx) = tokio::sync::mpsc::channel(8);

    mqtt_gateway::spawn_event_loop(mqtt.clone(), event_loop, snapshot_tx, mqtt_connected.clone());
    reconciler.start(snapshot_rx);
    tracing::info!("MQTT event loop and reconciler worker started");

    // Create application state
    let state = AppState {
        config,
        store,
        mqtt,
        mqtt_connected,
    };

    let app = web_api::create_router(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
