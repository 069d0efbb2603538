// Rewrite Prometheus metrics
//
// Provides:
// - Rewrite outcome counters (rewritten, or the rejection kind)
// - Rewrite latency histogram
// - Configuration store failure counter

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Global metrics registry for the rewrite pipeline
pub struct RewriteMetrics {
    /// Rewrites by outcome ("rewritten" or an error kind)
    pub outcomes: IntCounterVec,

    /// Time spent fetching config and rewriting (in seconds)
    pub duration: Histogram,

    /// Configuration fetch failures
    pub config_fetch_failures: IntCounter,
}

/// Global singleton instance of metrics
static METRICS: OnceLock<RewriteMetrics> = OnceLock::new();

impl RewriteMetrics {
    /// Initialize and return the global metrics instance
    ///
    /// Subsequent calls return the same instance.
    pub fn global() -> &'static Self {
        METRICS.get_or_init(|| {
            let outcomes = register_int_counter_vec!(
                "kagami_rewrites_total",
                "Total number of rewrite attempts by outcome",
                &["outcome"] // rewritten, malformed_uri, signature_invalid, ...
            )
            .expect("Failed to register kagami_rewrites_total metric");

            let duration = register_histogram!(
                "kagami_rewrite_duration_seconds",
                "Duration of request rewriting in seconds",
                vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1] // 10μs to 100ms
            )
            .expect("Failed to register kagami_rewrite_duration_seconds metric");

            let config_fetch_failures = register_int_counter!(
                "kagami_config_fetch_failures_total",
                "Total number of failed configuration store fetches"
            )
            .expect("Failed to register kagami_config_fetch_failures_total metric");

            RewriteMetrics {
                outcomes,
                duration,
                config_fetch_failures,
            }
        })
    }

    /// Record a successful rewrite
    pub fn record_rewritten(&self, seconds: f64) {
        self.outcomes.with_label_values(&["rewritten"]).inc();
        self.duration.observe(seconds);
    }

    /// Record a rejected request by error kind
    pub fn record_rejected(&self, kind: &str, seconds: f64) {
        self.outcomes.with_label_values(&[kind]).inc();
        self.duration.observe(seconds);
        if kind == "config_unavailable" {
            self.config_fetch_failures.inc();
        }
    }

    /// Count for a given outcome label
    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.outcomes.with_label_values(&[outcome]).get()
    }

    /// Export all registered metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
