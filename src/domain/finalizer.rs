// Trip finalization - metrics for a closed candidate run
use super::geodesy::haversine_km;
use super::segmentation::TripDetectionConfig;
use super::telemetry::TelemetrySample;
use super::trip::Trip;

/// Build a [`Trip`] from a candidate point run, or reject it.
///
/// Rejected when the run is shorter than `min_trip_points`, when either end
/// has no timestamp, or when the accumulated distance is below
/// `min_trip_distance_km`.
pub fn finalize_trip(points: Vec<TelemetrySample>, config: &TripDetectionConfig) -> Option<Trip> {
    if points.len() < config.min_trip_points {
        return None;
    }

    let first = points.first()?;
    let last = points.last()?;
    let start_time = first.effective_time()?;
    let end_time = last.effective_time()?;

    let distance_km = track_distance_km(&points);
    if distance_km < config.min_trip_distance_km {
        tracing::trace!(distance_km, "dropping trip below minimum distance");
        return None;
    }

    let device_id = first.device_id.clone();
    let trip = Trip {
        id: Trip::make_id(&device_id, start_time),
        device_id,
        start_time,
        end_time,
        start_location: first.position(),
        end_location: last.position(),
        duration_sec: (end_time - start_time).num_seconds().max(0),
        avg_speed_kph: average_moving_speed(&points),
        max_speed_kph: max_speed(&points),
        distance_km,
        points,
    };

    tracing::debug!(
        trip_id = %trip.id,
        points = trip.points.len(),
        distance_km = trip.distance_km,
        "trip finalized"
    );
    Some(trip)
}

/// Sum of great-circle legs between consecutive samples.
///
/// A leg touching a sample without coordinates contributes nothing; the next
/// leg still starts at the following index rather than the last good fix.
pub fn track_distance_km(points: &[TelemetrySample]) -> f64 {
    points
        .windows(2)
        .map(|pair| match (pair[0].position(), pair[1].position()) {
            (Some(from), Some(to)) => haversine_km(from, to),
            _ => 0.0,
        })
        .sum()
}

/// Mean of the strictly positive speeds, or 0 when there are none.
pub fn average_moving_speed(points: &[TelemetrySample]) -> f64 {
    let (sum, count) = points
        .iter()
        .map(|p| p.speed_kph)
        .filter(|speed| *speed > 0.0)
        .fold((0.0, 0usize), |(sum, count), speed| (sum + speed, count + 1));

    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn max_speed(points: &[TelemetrySample]) -> f64 {
    points.iter().map(|p| p.speed_kph).fold(0.0, f64::max)
}
