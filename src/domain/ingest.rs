// Chronological ordering of raw telemetry
use super::telemetry::TelemetrySample;

/// Orders samples by effective time without dropping any of them.
///
/// The sort is stable, so samples sharing a timestamp keep their input order.
/// Samples with no timestamp at all are placed after every timed sample.
pub fn order_samples(samples: &[TelemetrySample]) -> Vec<&TelemetrySample> {
    let mut ordered: Vec<&TelemetrySample> = samples.iter().collect();
    ordered.sort_by_key(|s| {
        let time = s.effective_time();
        (time.is_none(), time)
    });
    ordered
}
