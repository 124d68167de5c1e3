// HTTP request handlers
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::views::{
    trip_views, DeviceReportView, FleetReportView, FleetStatisticsView, IdleSummaryView,
    StreamMessageView,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<i32>,
}

impl RangeQuery {
    fn hours_or(&self, default_hours: i32) -> i32 {
        self.hours.filter(|h| *h > 0).unwrap_or(default_hours)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn respond(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// List all devices with telemetry
pub async fn list_devices(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);

    match state.analytics_service.list_devices().await {
        Ok(devices) => respond(json_response(&devices, compress).await),
        Err(e) => {
            tracing::error!("Error listing devices: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Trips detected for one device
pub async fn device_trips(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.analytics_service;
    let hours = query.hours_or(service.settings().server.default_hours);

    match service.device_report(&id, hours).await {
        Ok(report) => {
            let views = trip_views(&report.trips, &service.settings().fuel);
            respond(json_response(&views, accepts_brotli(&headers)).await)
        }
        Err(e) => {
            tracing::error!("Error building trips for {}: {:#}", id, e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Idle vs moving time for one device
pub async fn device_idle(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.analytics_service;
    let hours = query.hours_or(service.settings().server.default_hours);

    match service.device_report(&id, hours).await {
        Ok(report) => {
            let view = IdleSummaryView::from(&report.idle);
            respond(json_response(&view, accepts_brotli(&headers)).await)
        }
        Err(e) => {
            tracing::error!("Error building idle summary for {}: {:#}", id, e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Trips, idle summary and statistics for one device
pub async fn device_report(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.analytics_service;
    let hours = query.hours_or(service.settings().server.default_hours);

    match service.device_report(&id, hours).await {
        Ok(report) => {
            let view = DeviceReportView::new(&report, &service.settings().fuel);
            respond(json_response(&view, accepts_brotli(&headers)).await)
        }
        Err(e) => {
            tracing::error!("Error building report for {}: {:#}", id, e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Fleet-wide statistics over every device's trips
pub async fn fleet_statistics(
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.analytics_service;
    let hours = query.hours_or(service.settings().server.default_hours);

    match service.fleet_report(hours).await {
        Ok(report) => {
            let view = FleetStatisticsView::from(&report.statistics);
            respond(json_response(&view, accepts_brotli(&headers)).await)
        }
        Err(e) => {
            tracing::error!("Error building fleet statistics: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Every device report plus fleet statistics
pub async fn fleet_report(
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.analytics_service;
    let hours = query.hours_or(service.settings().server.default_hours);

    match service.fleet_report(hours).await {
        Ok(report) => {
            let view = FleetReportView::new(&report, &service.settings().fuel);
            respond(json_response(&view, accepts_brotli(&headers)).await)
        }
        Err(e) => {
            tracing::error!("Error building fleet report: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Stream device reports as they complete (progressive loading)
pub async fn stream_fleet(
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let settings = state.analytics_service.settings().clone();
    let hours = query.hours_or(settings.server.default_hours);
    let compress = accepts_brotli(&headers);

    let mut messages = state.streaming_service.stream_fleet(hours).await;

    // Convert each message to its view as it arrives
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            if tx.send(StreamMessageView::new(msg, &settings.fuel)).await.is_err() {
                break;
            }
        }
    });

    stream_from_receiver(rx, compress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analytics_service::tests::fleet_source;
    use crate::application::analytics_service::TripAnalyticsService;
    use crate::application::streaming_service::StreamingAnalyticsService;
    use crate::infrastructure::config::AnalyticsSettings;
    use axum::http::header;

    fn state() -> Arc<AppState> {
        let analytics_service = TripAnalyticsService::new(fleet_source(), AnalyticsSettings::default());
        Arc::new(AppState {
            streaming_service: StreamingAnalyticsService::new(analytics_service.clone()),
            analytics_service,
        })
    }

    fn no_range() -> Query<RangeQuery> {
        Query(RangeQuery { hours: None })
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_hours_fallback() {
        assert_eq!(RangeQuery { hours: None }.hours_or(24), 24);
        assert_eq!(RangeQuery { hours: Some(0) }.hours_or(24), 24);
        assert_eq!(RangeQuery { hours: Some(6) }.hours_or(24), 6);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_bad_gateway() {
        let state = state();

        let trips = device_trips(Path("ghost".to_string()), no_range(), HeaderMap::new(), State(state.clone())).await;
        assert_eq!(trips.status(), StatusCode::BAD_GATEWAY);

        let report = device_report(Path("ghost".to_string()), no_range(), HeaderMap::new(), State(state)).await;
        assert_eq!(report.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_device_trips_body() {
        let response = device_trips(Path("truck-1".to_string()), no_range(), HeaderMap::new(), State(state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());

        let body = json_body(response).await;
        let trips = body.as_array().unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0]["deviceId"], "truck-1");
        assert_eq!(trips[0]["durationSec"], 180);
        assert_eq!(trips[0]["points"].as_array().map(Vec::len), Some(4));
        assert!(trips[0].get("fuelLiters").is_some());
    }

    #[tokio::test]
    async fn test_brotli_when_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, "gzip, br".parse().unwrap());

        let response = device_report(Path("truck-1".to_string()), no_range(), headers, State(state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_fleet_statistics_skips_failed_devices() {
        let response = fleet_statistics(no_range(), HeaderMap::new(), State(state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["totalTrips"], 2);
        assert_eq!(body["totalDurationSec"], 420);
    }
}
