use lazy_static::lazy_static;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter_vec, Encoder, GaugeVec,
    Histogram, IntCounterVec, TextEncoder,
};
use std::time::Instant;

use crate::models::EventState;

lazy_static! {
    // Sampling cycles
    pub static ref SAMPLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "graphite_producer_samples_total",
        "Number of emitted events by state",
        &["state"]
    ).unwrap();

    pub static ref SAMPLE_DURATION: Histogram = register_histogram!(
        "graphite_producer_sample_duration_seconds",
        "Time from request start to event emission",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]
    ).unwrap();

    pub static ref LAST_METRIC: GaugeVec = register_gauge_vec!(
        "graphite_producer_last_metric",
        "Aggregate value of the last successful sample",
        &["service"]
    ).unwrap();
}

pub struct SampleTimer {
    start: Instant,
}

impl SampleTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SampleTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SampleTimer {
    fn drop(&mut self) {
        SAMPLE_DURATION.observe(self.start.elapsed().as_secs_f64());
    }
}

pub fn record_sample(state: EventState) {
    SAMPLES_TOTAL.with_label_values(&[state.as_str()]).inc();
}

pub fn record_metric(service: &str, value: f64) {
    LAST_METRIC.with_label_values(&[service]).set(value);
}

/// Renders the default registry in the prometheus text format.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&prometheus::gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sample_counts_by_state() {
        let before = SAMPLES_TOTAL.with_label_values(&["critical"]).get();
        record_sample(EventState::Critical);
        assert!(SAMPLES_TOTAL.with_label_values(&["critical"]).get() > before);
    }

    #[test]
    fn test_record_metric_per_service() {
        record_metric("metrics-test/a", 3.5);
        record_metric("metrics-test/b", -1.0);
        assert_eq!(LAST_METRIC.with_label_values(&["metrics-test/a"]).get(), 3.5);
        assert_eq!(LAST_METRIC.with_label_values(&["metrics-test/b"]).get(), -1.0);
    }

    #[test]
    fn test_gather_text_contains_families() {
        record_sample(EventState::Ok);
        drop(SampleTimer::new());
        let text = gather_text();
        assert!(text.contains("graphite_producer_samples_total"));
        assert!(text.contains("graphite_producer_sample_duration_seconds"));
    }
}
