// Idle vs moving time budget
use super::ingest::order_samples;
use super::statistics::IdleTimeSummary;
use super::telemetry::TelemetrySample;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Speed at or below which an interval counts as idle (km/h).
    pub idle_threshold_kph: f64,
    /// Intervals longer than this are reporting outages and are not counted.
    pub outage_threshold_sec: i64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            idle_threshold_kph: 5.0,
            outage_threshold_sec: 3600,
        }
    }
}

/// Split the covered time into idle and moving buckets.
///
/// Coordinates are not inspected: a sample without a fix still reports speed.
/// Each interval is attributed by the speed at its closing sample.
pub fn classify_idle_time(samples: &[TelemetrySample], config: &IdleConfig) -> IdleTimeSummary {
    let timed: Vec<_> = order_samples(samples)
        .into_iter()
        .filter_map(|s| s.effective_time().map(|t| (t, s.speed_kph)))
        .collect();

    if timed.len() < 2 {
        return IdleTimeSummary::default();
    }

    let outage_ms = config.outage_threshold_sec.saturating_mul(1000);
    let (idle_ms, moving_ms) = timed
        .windows(2)
        .fold((0i64, 0i64), |(idle, moving), pair| {
            let (prev_time, _) = pair[0];
            let (curr_time, curr_speed) = pair[1];
            let diff_ms = (curr_time - prev_time).num_milliseconds();

            if diff_ms > outage_ms {
                (idle, moving)
            } else if curr_speed <= config.idle_threshold_kph {
                (idle + diff_ms, moving)
            } else {
                (idle, moving + diff_ms)
            }
        });

    let idle_time_sec = idle_ms / 1000;
    let moving_time_sec = moving_ms / 1000;
    let total_time_sec = idle_time_sec + moving_time_sec;

    IdleTimeSummary {
        idle_time_sec,
        moving_time_sec,
        total_time_sec,
        idle_percentage: percentage(idle_time_sec, total_time_sec),
        moving_percentage: percentage(moving_time_sec, total_time_sec),
    }
}

fn percentage(part: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::sample;

    #[test]
    fn test_idle_and_moving_split() {
        let samples = vec![
            sample(0, 37.0, -122.0, 0.0),
            sample(300, 37.0, -122.0, 2.0),
            sample(600, 37.0, -122.01, 50.0),
            sample(1200, 37.0, -122.02, 60.0),
        ];

        let summary = classify_idle_time(&samples, &IdleConfig::default());

        assert_eq!(summary.idle_time_sec, 300);
        assert_eq!(summary.moving_time_sec, 900);
        assert_eq!(summary.total_time_sec, 1200);
        assert_eq!(summary.idle_percentage, 25);
        assert_eq!(summary.moving_percentage, 75);
    }

    #[test]
    fn test_outage_intervals_are_excluded() {
        let samples = vec![
            sample(0, 37.0, -122.0, 0.0),
            sample(600, 37.0, -122.0, 0.0),
            sample(600 + 3601, 37.0, -122.1, 40.0),
        ];

        let summary = classify_idle_time(&samples, &IdleConfig::default());
        assert_eq!(summary.idle_time_sec, 600);
        assert_eq!(summary.moving_time_sec, 0);
        assert_eq!(summary.idle_percentage, 100);
    }

    #[test]
    fn test_no_fix_samples_still_count() {
        let samples = vec![sample(0, 0.0, 0.0, 30.0), sample(120, 0.0, 0.0, 30.0)];

        let summary = classify_idle_time(&samples, &IdleConfig::default());
        assert_eq!(summary.moving_time_sec, 120);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(classify_idle_time(&[], &IdleConfig::default()), IdleTimeSummary::default());

        let single = vec![sample(0, 37.0, -122.0, 30.0)];
        assert_eq!(classify_idle_time(&single, &IdleConfig::default()), IdleTimeSummary::default());

        let same_instant = vec![sample(0, 37.0, -122.0, 30.0), sample(0, 37.0, -122.0, 0.0)];
        let summary = classify_idle_time(&same_instant, &IdleConfig::default());
        assert_eq!(summary.total_time_sec, 0);
        assert_eq!(summary.idle_percentage, 0);
        assert_eq!(summary.moving_percentage, 0);
    }

    #[test]
    fn test_huge_outage_threshold_counts_every_interval() {
        let config = IdleConfig {
            outage_threshold_sec: i64::MAX,
            ..IdleConfig::default()
        };
        let samples = vec![sample(0, 37.0, -122.0, 0.0), sample(7200, 37.0, -122.0, 0.0)];

        let summary = classify_idle_time(&samples, &config);
        assert_eq!(summary.idle_time_sec, 7200);
    }

    #[test]
    fn test_unordered_input() {
        let samples = vec![
            sample(600, 37.0, -122.01, 50.0),
            sample(0, 37.0, -122.0, 0.0),
            sample(300, 37.0, -122.0, 2.0),
        ];

        let summary = classify_idle_time(&samples, &IdleConfig::default());
        assert_eq!(summary.idle_time_sec, 300);
        assert_eq!(summary.moving_time_sec, 300);
    }
}
