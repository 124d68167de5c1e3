// Great-circle distance helpers
use super::telemetry::GeoPoint;
use geo::{Distance, Haversine, Point};

/// Haversine distance between two positions, in kilometres.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let origin = Point::new(from.longitude, from.latitude);
    let destination = Point::new(to.longitude, to.latitude);
    Haversine::distance(origin, destination) / 1000.0
}
