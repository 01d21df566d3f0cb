//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_int_gauge_with_registry, CounterVec, Encoder, HistogramVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::gate::Phase;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records the current auth check phase.
    fn record_phase(&self, phase: Phase);

    /// Records the result and duration of the startup identity lookup.
    fn record_lookup(&self, result: &str, duration_secs: f64);

    /// Records how long a navigation waited at the auth gate.
    fn record_gate_wait(&self, outcome: &str, duration_secs: f64);

    /// Records the final decision for a navigation.
    fn record_navigation(&self, decision: &str);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    auth_phase: IntGauge,
    lookup_total: CounterVec,
    lookup_duration_seconds: HistogramVec,

    gate_wait_seconds: HistogramVec,
    navigations_total: CounterVec,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let auth_phase = register_int_gauge_with_registry!(
            Opts::new(
                "auth_phase",
                "Auth check phase (0 = unchecked, 1 = checking, 2 = done)"
            ),
            registry.clone()
        )
        .expect("Failed to register auth_phase");

        let lookup_total = register_counter_vec_with_registry!(
            Opts::new("identity_lookup_total", "Startup identity lookups by result"),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register identity_lookup_total");

        let lookup_duration_seconds = register_histogram_vec_with_registry!(
            "identity_lookup_duration_seconds",
            "Startup identity lookup duration in seconds",
            &["result"],
            vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            registry.clone()
        )
        .expect("Failed to register identity_lookup_duration_seconds");

        let gate_wait_seconds = register_histogram_vec_with_registry!(
            "gate_wait_seconds",
            "Time navigations spent suspended at the auth gate",
            &["outcome"],
            vec![0.0, 0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            registry.clone()
        )
        .expect("Failed to register gate_wait_seconds");

        let navigations_total = register_counter_vec_with_registry!(
            Opts::new("gate_navigations_total", "Navigations by final decision"),
            &["decision"],
            registry.clone()
        )
        .expect("Failed to register gate_navigations_total");

        Metrics {
            registry,
            auth_phase,
            lookup_total,
            lookup_duration_seconds,
            gate_wait_seconds,
            navigations_total,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_phase(&self, phase: Phase) {
        self.auth_phase.set(phase.as_gauge());
    }

    fn record_lookup(&self, result: &str, duration_secs: f64) {
        self.lookup_total.with_label_values(&[result]).inc();
        self.lookup_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    fn record_gate_wait(&self, outcome: &str, duration_secs: f64) {
        self.gate_wait_seconds
            .with_label_values(&[outcome])
            .observe(duration_secs);
    }

    fn record_navigation(&self, decision: &str) {
        self.navigations_total.with_label_values(&[decision]).inc();
    }
}
