// Fleet-wide trip statistics
use super::fuel::FuelModel;
use super::statistics::{round2, FleetTripStatistics};
use super::trip::Trip;

/// Reduce a set of trips, possibly from many devices, into fleet totals.
///
/// Fuel is re-estimated per trip with `fuel_model`.
pub fn aggregate<'a, I>(trips: I, fuel_model: &FuelModel) -> FleetTripStatistics
where
    I: IntoIterator<Item = &'a Trip>,
{
    let trips: Vec<&Trip> = trips.into_iter().collect();
    if trips.is_empty() {
        return FleetTripStatistics::default();
    }

    let count = trips.len();
    let total_distance: f64 = trips.iter().map(|t| t.distance_km).sum();
    let total_duration_sec: i64 = trips.iter().map(|t| t.duration_sec).sum();

    let moving_speeds: Vec<f64> = trips
        .iter()
        .map(|t| t.avg_speed_kph)
        .filter(|speed| *speed > 0.0)
        .collect();
    let avg_speed_kph = if moving_speeds.is_empty() {
        0.0
    } else {
        moving_speeds.iter().sum::<f64>() / moving_speeds.len() as f64
    };

    let max_speed_kph = trips.iter().map(|t| t.max_speed_kph).fold(0.0, f64::max);
    let total_fuel: f64 = trips
        .iter()
        .map(|t| fuel_model.estimate(t.distance_km, t.avg_speed_kph))
        .sum();

    FleetTripStatistics {
        total_trips: count,
        total_distance_km: round2(total_distance),
        total_duration_sec,
        avg_distance_km: round2(total_distance / count as f64),
        avg_duration_sec: (total_duration_sec as f64 / count as f64).round() as i64,
        avg_speed_kph: round2(avg_speed_kph),
        max_speed_kph,
        total_fuel_liters: round2(total_fuel),
    }
}
