// Trip segmentation - single-pass state machine over ordered samples

use super::finalizer::finalize_trip;
use super::ingest::order_samples;
use super::telemetry::TelemetrySample;
use super::trip::Trip;
use serde::Deserialize;

/// Thresholds that decide where trips start and end.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TripDetectionConfig {
    /// Speed at or below which the device counts as stationary (km/h).
    pub idle_threshold_kph: f64,
    /// Largest gap between two moving samples of the same trip (seconds).
    pub time_gap_threshold_sec: i64,
    /// Candidates with fewer accepted points are noise, not trips. Values
    /// below 3 are allowed for sparse fleets and yield shorter point runs.
    pub min_trip_points: usize,
    /// Finalized trips shorter than this are dropped (km).
    pub min_trip_distance_km: f64,
}

impl Default for TripDetectionConfig {
    fn default() -> Self {
        Self {
            idle_threshold_kph: 5.0,
            time_gap_threshold_sec: 300,
            min_trip_points: 3,
            min_trip_distance_km: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SegmentState {
    #[default]
    NoActiveTrip,
    InTrip(Vec<TelemetrySample>),
}

/// Advance the segmenter by one sample.
///
/// Returns the next state and, when a candidate closes with enough points,
/// the candidate's point run. Samples without a GPS fix or a timestamp leave
/// the state untouched, so the gap is always measured against the last
/// accepted point.
pub fn transition(
    state: SegmentState,
    sample: &TelemetrySample,
    config: &TripDetectionConfig,
) -> (SegmentState, Option<Vec<TelemetrySample>>) {
    let Some(time) = sample.effective_time() else {
        return (state, None);
    };
    if !sample.has_valid_position() {
        return (state, None);
    }

    let is_moving = sample.speed_kph > config.idle_threshold_kph;

    match (state, is_moving) {
        (SegmentState::NoActiveTrip, true) => (SegmentState::InTrip(vec![sample.clone()]), None),
        (SegmentState::NoActiveTrip, false) => (SegmentState::NoActiveTrip, None),
        (SegmentState::InTrip(mut points), true) => {
            let gap_ms = points
                .last()
                .and_then(|last| last.effective_time())
                .map(|last| (time - last).num_milliseconds())
                .unwrap_or(0);

            if gap_ms > config.time_gap_threshold_sec.saturating_mul(1000) {
                tracing::trace!(gap_ms, "time gap splits candidate trip");
                let emitted = keep_if_long_enough(points, config);
                (SegmentState::InTrip(vec![sample.clone()]), emitted)
            } else {
                points.push(sample.clone());
                (SegmentState::InTrip(points), None)
            }
        }
        (SegmentState::InTrip(points), false) => {
            (SegmentState::NoActiveTrip, keep_if_long_enough(points, config))
        }
    }
}

fn keep_if_long_enough(
    points: Vec<TelemetrySample>,
    config: &TripDetectionConfig,
) -> Option<Vec<TelemetrySample>> {
    if points.len() >= config.min_trip_points {
        Some(points)
    } else {
        tracing::trace!(points = points.len(), "discarding short candidate");
        None
    }
}

/// Incremental segmenter for callers that receive samples one at a time.
///
/// Samples must be pushed in chronological order.
#[derive(Debug, Clone, Default)]
pub struct TripSegmenter {
    config: TripDetectionConfig,
    state: SegmentState,
}

impl TripSegmenter {
    pub fn new(config: TripDetectionConfig) -> Self {
        Self {
            config,
            state: SegmentState::NoActiveTrip,
        }
    }

    pub fn state(&self) -> &SegmentState {
        &self.state
    }

    /// Feed one sample; returns a trip when this sample closed one.
    pub fn push(&mut self, sample: &TelemetrySample) -> Option<Trip> {
        let state = std::mem::take(&mut self.state);
        let (next, emitted) = transition(state, sample, &self.config);
        self.state = next;
        emitted.and_then(|points| finalize_trip(points, &self.config))
    }

    /// Close the stream, emitting the open candidate if it qualifies.
    pub fn finish(self) -> Option<Trip> {
        match self.state {
            SegmentState::InTrip(points) => {
                keep_if_long_enough(points, &self.config).and_then(|p| finalize_trip(p, &self.config))
            }
            SegmentState::NoActiveTrip => None,
        }
    }
}

/// Detect every trip in an unordered batch of samples.
pub fn detect_trips(samples: &[TelemetrySample], config: &TripDetectionConfig) -> Vec<Trip> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut segmenter = TripSegmenter::new(config.clone());
    let mut trips: Vec<Trip> = order_samples(samples)
        .into_iter()
        .filter_map(|sample| segmenter.push(sample))
        .collect();
    trips.extend(segmenter.finish());

    tracing::debug!(samples = samples.len(), trips = trips.len(), "trip detection complete");
    trips
}
