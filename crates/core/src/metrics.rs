//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Integration jobs (starts, outcomes, durations, failing steps)
//! - Launch handshake (sessions, rejected requests)
//! - Upstream document service calls

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Integration Jobs
// =============================================================================

/// Jobs started by mode.
pub static JOBS_STARTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("docbridge_jobs_started_total", "Total integration jobs started"),
        &["mode"], // "simulated", "live", "ticket-launched", "document-upload"
    )
    .unwrap()
});

/// Jobs finished by mode and result.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "docbridge_jobs_finished_total",
            "Total integration jobs that reached a terminal status",
        ),
        &["mode", "result"], // result: "completed", "failed"
    )
    .unwrap()
});

/// Wall-clock job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "docbridge_job_duration_seconds",
            "Duration of integration jobs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Step failures by step name.
pub static STEP_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "docbridge_step_failures_total",
            "Pipeline steps that ended in failure",
        ),
        &["step"],
    )
    .unwrap()
});

/// Documents moved through the pipeline, by stage.
pub static DOCUMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "docbridge_documents_total",
            "Documents received, processed and returned",
        ),
        &["stage"], // "received", "processed", "returned"
    )
    .unwrap()
});

// =============================================================================
// Launch Handshake
// =============================================================================

/// Launch sessions created.
pub static SESSIONS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "docbridge_sessions_created_total",
        "Total launch sessions created",
    )
    .unwrap()
});

/// Launch sessions removed by the sweeper.
pub static SESSIONS_SWEPT: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "docbridge_sessions_swept_total",
        "Expired launch sessions removed by the sweeper",
    )
    .unwrap()
});

/// Rejected launch requests by reason.
pub static HANDSHAKE_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "docbridge_handshake_rejections_total",
            "Launch requests answered with an error response",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Upstream Document Service
// =============================================================================

/// Upstream request duration by operation.
pub static UPSTREAM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "docbridge_upstream_request_duration_seconds",
            "Duration of requests to the document service",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

/// Upstream requests by operation and result.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "docbridge_upstream_requests_total",
            "Total requests to the document service",
        ),
        &["operation", "result"], // result: "success", "error", "timeout"
    )
    .unwrap()
});

/// All core metrics, for registration with a server registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_STARTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(STEP_FAILURES.clone()),
        Box::new(DOCUMENTS_TOTAL.clone()),
        // Handshake
        Box::new(SESSIONS_CREATED.clone()),
        Box::new(SESSIONS_SWEPT.clone()),
        Box::new(HANDSHAKE_REJECTIONS.clone()),
        // Upstream
        Box::new(UPSTREAM_REQUEST_DURATION.clone()),
        Box::new(UPSTREAM_REQUESTS.clone()),
    ]
}
