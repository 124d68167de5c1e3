// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fleet_trip_analytics::application::analytics_service::TripAnalyticsService;
use fleet_trip_analytics::application::streaming_service::StreamingAnalyticsService;
use fleet_trip_analytics::infrastructure::config::{load_analytics_config, load_influx_config};
use fleet_trip_analytics::infrastructure::influx_repository::InfluxRepository;
use fleet_trip_analytics::presentation::app_state::AppState;
use fleet_trip_analytics::presentation::handlers::{
    device_idle, device_report, device_trips, fleet_report, fleet_statistics, health_check,
    list_devices, stream_fleet,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let influx_config = load_influx_config().context("Failed to load config/influx")?;
    let analytics_config = load_analytics_config().context("Failed to load config/analytics")?;

    // Create data source (infrastructure layer)
    let influx = influx_config.influx;
    let repository = Arc::new(InfluxRepository::new(
        influx.host,
        influx.token,
        influx.database,
        influx.retention_policy,
        influx.measurement,
        influx.device_tag,
    ));

    let addr: SocketAddr = analytics_config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", analytics_config.server.bind_address))?;

    // Create services (application layer)
    let analytics_service = TripAnalyticsService::new(repository, analytics_config);
    let streaming_service = StreamingAnalyticsService::new(analytics_service.clone());

    let state = Arc::new(AppState {
        analytics_service,
        streaming_service,
    });

    // Build router (presentation layer)
    // Responses are compressed by the handlers themselves, so no CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/devices", get(list_devices))
        .route("/devices/:id/trips", get(device_trips))
        .route("/devices/:id/idle", get(device_idle))
        .route("/devices/:id/report", get(device_report))
        .route("/fleet/statistics", get(fleet_statistics))
        .route("/fleet/report", get(fleet_report))
        .route("/fleet/stream", get(stream_fleet))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Starting fleet-trip-analytics service on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
