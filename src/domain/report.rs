// Per-device and fleet analytics reports
use super::statistics::{FleetTripStatistics, IdleTimeSummary};
use super::trip::Trip;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub device_id: String,
    pub trips: Vec<Trip>,
    pub idle: IdleTimeSummary,
    pub statistics: FleetTripStatistics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetReport {
    pub devices: Vec<DeviceReport>,
    pub statistics: FleetTripStatistics,
}
