// Telemetry sample domain model
use chrono::{DateTime, Utc};

/// Coordinates at or below this magnitude are a "no GPS fix" placeholder.
const MIN_COORDINATE_MAGNITUDE: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single position report from a tracked device.
///
/// `device_time` is the clock reported by the device itself and wins over the
/// ingestion `timestamp` whenever both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub device_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub device_time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_kph: f64,
}

impl TelemetrySample {
    pub fn new(
        device_id: String,
        timestamp: Option<DateTime<Utc>>,
        device_time: Option<DateTime<Utc>>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        speed_kph: f64,
    ) -> Self {
        Self {
            device_id,
            timestamp,
            device_time,
            latitude,
            longitude,
            speed_kph,
        }
    }

    pub fn effective_time(&self) -> Option<DateTime<Utc>> {
        self.device_time.or(self.timestamp)
    }

    /// Latitude/longitude pair, if both are present and finite.
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(GeoPoint::new(lat, lon))
            }
            _ => None,
        }
    }

    /// True when the sample carries a real GPS fix.
    pub fn has_valid_position(&self) -> bool {
        self.position().is_some_and(|p| {
            p.latitude.abs() > MIN_COORDINATE_MAGNITUDE && p.longitude.abs() > MIN_COORDINATE_MAGNITUDE
        })
    }
}
