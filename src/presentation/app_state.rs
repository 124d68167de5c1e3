// Application state for HTTP handlers
use crate::application::analytics_service::TripAnalyticsService;
use crate::application::streaming_service::StreamingAnalyticsService;

#[derive(Clone)]
pub struct AppState {
    pub analytics_service: TripAnalyticsService,
    pub streaming_service: StreamingAnalyticsService,
}
