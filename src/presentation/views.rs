// JSON views of the analytics results
use crate::application::streaming_service::FleetStreamMessage;
use crate::domain::format::{format_distance, format_duration};
use crate::domain::fuel::FuelModel;
use crate::domain::report::{DeviceReport, FleetReport};
use crate::domain::statistics::{round2, FleetTripStatistics, IdleTimeSummary};
use crate::domain::telemetry::{GeoPoint, TelemetrySample};
use crate::domain::trip::Trip;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
pub struct GeoPointView {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for GeoPointView {
    fn from(p: GeoPoint) -> Self {
        Self {
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPointView {
    pub time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_kph: f64,
}

impl From<&TelemetrySample> for TripPointView {
    fn from(s: &TelemetrySample) -> Self {
        Self {
            time: s.effective_time(),
            latitude: s.latitude,
            longitude: s.longitude,
            speed_kph: s.speed_kph,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    pub id: String,
    pub device_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_location: Option<GeoPointView>,
    pub end_location: Option<GeoPointView>,
    pub points: Vec<TripPointView>,
    pub distance_km: f64,
    pub duration_sec: i64,
    pub avg_speed_kph: f64,
    pub max_speed_kph: f64,
    pub fuel_liters: f64,
    pub distance_text: String,
    pub duration_text: String,
}

impl TripView {
    pub fn new(trip: &Trip, fuel_model: &FuelModel) -> Self {
        Self {
            id: trip.id.clone(),
            device_id: trip.device_id.clone(),
            start_time: trip.start_time,
            end_time: trip.end_time,
            start_location: trip.start_location.map(GeoPointView::from),
            end_location: trip.end_location.map(GeoPointView::from),
            points: trip.points.iter().map(TripPointView::from).collect(),
            distance_km: round2(trip.distance_km),
            duration_sec: trip.duration_sec,
            avg_speed_kph: round2(trip.avg_speed_kph),
            max_speed_kph: round2(trip.max_speed_kph),
            fuel_liters: fuel_model.estimate(trip.distance_km, trip.avg_speed_kph),
            distance_text: format_distance(trip.distance_km),
            duration_text: format_duration(trip.duration_sec),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleSummaryView {
    pub idle_time_sec: i64,
    pub moving_time_sec: i64,
    pub total_time_sec: i64,
    pub idle_percentage: u32,
    pub moving_percentage: u32,
    pub idle_text: String,
    pub moving_text: String,
}

impl From<&IdleTimeSummary> for IdleSummaryView {
    fn from(s: &IdleTimeSummary) -> Self {
        Self {
            idle_time_sec: s.idle_time_sec,
            moving_time_sec: s.moving_time_sec,
            total_time_sec: s.total_time_sec,
            idle_percentage: s.idle_percentage,
            moving_percentage: s.moving_percentage,
            idle_text: format_duration(s.idle_time_sec),
            moving_text: format_duration(s.moving_time_sec),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStatisticsView {
    pub total_trips: usize,
    pub total_distance_km: f64,
    pub total_duration_sec: i64,
    pub avg_distance_km: f64,
    pub avg_duration_sec: i64,
    pub avg_speed_kph: f64,
    pub max_speed_kph: f64,
    pub total_fuel_liters: f64,
    pub total_distance_text: String,
    pub total_duration_text: String,
    pub avg_distance_text: String,
    pub avg_duration_text: String,
}

impl From<&FleetTripStatistics> for FleetStatisticsView {
    fn from(s: &FleetTripStatistics) -> Self {
        Self {
            total_trips: s.total_trips,
            total_distance_km: s.total_distance_km,
            total_duration_sec: s.total_duration_sec,
            avg_distance_km: s.avg_distance_km,
            avg_duration_sec: s.avg_duration_sec,
            avg_speed_kph: s.avg_speed_kph,
            max_speed_kph: round2(s.max_speed_kph),
            total_fuel_liters: s.total_fuel_liters,
            total_distance_text: format_distance(s.total_distance_km),
            total_duration_text: format_duration(s.total_duration_sec),
            avg_distance_text: format_distance(s.avg_distance_km),
            avg_duration_text: format_duration(s.avg_duration_sec),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReportView {
    pub device_id: String,
    pub trips: Vec<TripView>,
    pub idle: IdleSummaryView,
    pub statistics: FleetStatisticsView,
}

impl DeviceReportView {
    pub fn new(report: &DeviceReport, fuel_model: &FuelModel) -> Self {
        Self {
            device_id: report.device_id.clone(),
            trips: trip_views(&report.trips, fuel_model),
            idle: IdleSummaryView::from(&report.idle),
            statistics: FleetStatisticsView::from(&report.statistics),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetReportView {
    pub devices: Vec<DeviceReportView>,
    pub statistics: FleetStatisticsView,
}

impl FleetReportView {
    pub fn new(report: &FleetReport, fuel_model: &FuelModel) -> Self {
        Self {
            devices: report
                .devices
                .iter()
                .map(|d| DeviceReportView::new(d, fuel_model))
                .collect(),
            statistics: FleetStatisticsView::from(&report.statistics),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessageView {
    #[serde(rename_all = "camelCase")]
    Started { device_ids: Vec<String> },
    Device { report: DeviceReportView },
    #[serde(rename_all = "camelCase")]
    DeviceFailed { device_id: String, reason: String },
    #[serde(rename_all = "camelCase")]
    Complete { devices: usize, duration_ms: i64 },
}

impl StreamMessageView {
    pub fn new(msg: FleetStreamMessage, fuel_model: &FuelModel) -> Self {
        match msg {
            FleetStreamMessage::Started { device_ids } => Self::Started { device_ids },
            FleetStreamMessage::Device(report) => Self::Device {
                report: DeviceReportView::new(&report, fuel_model),
            },
            FleetStreamMessage::DeviceFailed { device_id, reason } => {
                Self::DeviceFailed { device_id, reason }
            }
            FleetStreamMessage::Complete {
                devices,
                duration_ms,
            } => Self::Complete {
                devices,
                duration_ms,
            },
        }
    }
}

pub fn trip_views(trips: &[Trip], fuel_model: &FuelModel) -> Vec<TripView> {
    trips.iter().map(|t| TripView::new(t, fuel_model)).collect()
}
