//! Prometheus metrics for engine and API monitoring.
//!
//! This module provides metrics for:
//! - Arbitrage computations and detected opportunities
//! - Engine validation failures by error class
//! - Odds ingestion
//! - Computation and HTTP request latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Arbitrage computation latency metric name.
pub const METRIC_COMPUTATION_LATENCY: &str = "arbitrage_computation_latency_ms";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Computations counter metric name.
pub const METRIC_COMPUTATIONS: &str = "arbitrage_computations_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "arbitrage_opportunities_detected_total";
/// Engine errors counter metric name.
pub const METRIC_ENGINE_ERRORS: &str = "engine_errors_total";
/// Odds upserts counter metric name.
pub const METRIC_ODDS_UPSERTS: &str = "odds_upserts_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_COMPUTATION_LATENCY,
        "Time to select best odds and allocate stakes in milliseconds"
    );
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    describe_counter!(
        METRIC_COMPUTATIONS,
        "Total number of successful arbitrage computations"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of arbitrage opportunities detected"
    );
    describe_counter!(
        METRIC_ENGINE_ERRORS,
        "Total number of rejected engine inputs by error class"
    );
    describe_counter!(
        METRIC_ODDS_UPSERTS,
        "Total number of bookmaker odds rows ingested"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Increment computations counter.
pub fn inc_computations() {
    counter!(METRIC_COMPUTATIONS).increment(1);
}

/// Increment opportunities detected counter.
pub fn inc_opportunities_detected() {
    counter!(METRIC_OPPORTUNITIES_DETECTED).increment(1);
}

/// Increment engine errors counter for an error class.
pub fn inc_engine_errors(code: &'static str) {
    counter!(METRIC_ENGINE_ERRORS, "code" => code).increment(1);
}

/// Increment odds upserts counter.
pub fn inc_odds_upserts() {
    counter!(METRIC_ODDS_UPSERTS).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped, so early returns count too.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    endpoint: Option<&'static str>,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            endpoint: None,
        }
    }

    /// Label the recorded sample with an API endpoint.
    pub fn with_endpoint(mut self, endpoint: &'static str) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.elapsed_ms();
        match self.endpoint {
            Some(endpoint) => histogram!(self.metric_name, "endpoint" => endpoint).record(latency_ms),
            None => histogram!(self.metric_name).record(latency_ms),
        }
    }
}

/// Create a latency timer for arbitrage computation.
pub fn timer_computation() -> LatencyTimer {
    LatencyTimer::new(METRIC_COMPUTATION_LATENCY)
}

/// Create a latency timer for one HTTP request.
pub fn timer_http(endpoint: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_HTTP_REQUEST_LATENCY).with_endpoint(endpoint)
}
