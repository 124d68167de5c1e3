// Trip domain model
use super::telemetry::{GeoPoint, TelemetrySample};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub device_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_location: Option<GeoPoint>,
    pub end_location: Option<GeoPoint>,
    pub points: Vec<TelemetrySample>,
    pub distance_km: f64,
    pub duration_sec: i64,
    pub avg_speed_kph: f64,
    pub max_speed_kph: f64,
}

impl Trip {
    /// Stable identifier so repeated runs over the same samples agree.
    pub fn make_id(device_id: &str, start_time: DateTime<Utc>) -> String {
        format!("{}-{}", device_id, start_time.timestamp_millis())
    }
}
