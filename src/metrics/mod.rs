//! Metrics collection and exposition for Prometheus.
//!
//! Records the auth check lifecycle and navigation decisions.

mod recorder;

pub use recorder::{Metrics, MetricsRecorder};
