// Display formatting for durations and distances
use super::statistics::round2;

/// Compact duration such as `"1h 5m"` or `"2m 30s"`.
///
/// Seconds are only shown for durations under an hour.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0m".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 && hours == 0 {
        parts.push(format!("{}s", secs));
    }
    parts.join(" ")
}

/// Metres below one kilometre, otherwise kilometres with up to two decimals.
pub fn format_distance(km: f64) -> String {
    if !(km > 0.0) {
        return "0 km".to_string();
    }
    if km < 1.0 {
        return format!("{} m", (km * 1000.0).round() as i64);
    }
    format!("{} km", round2(km))
}
