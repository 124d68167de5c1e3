// Derived summary views

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdleTimeSummary {
    pub idle_time_sec: i64,
    pub moving_time_sec: i64,
    pub total_time_sec: i64,
    pub idle_percentage: u32,
    pub moving_percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetTripStatistics {
    pub total_trips: usize,
    pub total_distance_km: f64,
    pub total_duration_sec: i64,
    pub avg_distance_km: f64,
    pub avg_duration_sec: i64,
    pub avg_speed_kph: f64,
    pub max_speed_kph: f64,
    pub total_fuel_liters: f64,
}

/// Round to two decimal places, the precision used for every reported figure.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(0.0), 0.0);
    }
}
