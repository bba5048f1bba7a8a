//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the DocBridge server:
//! - HTTP request metrics (latency, counts, errors)
//! - Job and session gauges (collected dynamically)
//! - Core metrics (jobs, handshake, upstream calls) registered from the core crate

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "docbridge_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("docbridge_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "docbridge_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Job and Session Metrics (collected dynamically)
// =============================================================================

/// Whether an integration job is in flight (1) or not (0).
pub static JOB_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "docbridge_job_running",
        "Whether an integration job is currently running",
    )
    .unwrap()
});

/// Finished jobs held in history.
pub static JOB_HISTORY_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "docbridge_job_history_size",
        "Number of finished jobs kept in history",
    )
    .unwrap()
});

/// Stored launch sessions, including expired ones not yet swept.
pub static SESSIONS_STORED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "docbridge_sessions_stored",
        "Number of launch sessions currently stored",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Jobs and sessions
    registry.register(Box::new(JOB_RUNNING.clone())).unwrap();
    registry
        .register(Box::new(JOB_HISTORY_SIZE.clone()))
        .unwrap();
    registry
        .register(Box::new(SESSIONS_STORED.clone()))
        .unwrap();

    // Core metrics (jobs, handshake, upstream calls)
    for metric in docbridge_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the orchestrator and session
/// store at scrape time.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let orchestrator = state.orchestrator();
    let status = orchestrator.status().await;
    JOB_RUNNING.set(if status.running { 1 } else { 0 });
    JOB_HISTORY_SIZE.set(orchestrator.history().await.len() as i64);

    if let Ok(count) = state.sessions().len() {
        SESSIONS_STORED.set(count as i64);
    }
}

/// Normalize a path for metric labels (replace IDs and loan numbers with placeholders).
pub fn normalize_path(path: &str) -> String {
    static UUID: Lazy<regex_lite::Regex> = Lazy::new(|| {
        regex_lite::Regex::new(
            r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        )
        .unwrap()
    });
    static LOAN: Lazy<regex_lite::Regex> =
        Lazy::new(|| regex_lite::Regex::new(r"/documents/[^/]+").unwrap());

    let result = UUID.replace_all(path, "{id}");
    let result = LOAN.replace_all(&result, "/documents/{loan}");
    result.to_string()
}
