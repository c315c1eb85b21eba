//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the reelog server:
//! - HTTP request metrics (latency, counts)
//! - Cached content and activity totals (collected dynamically)
//! - Core metrics (content cache, catalogs, watched mutations, images)

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
            "reelog_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelog_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelog_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Storage Metrics (collected dynamically)
// =============================================================================

/// Cached content rows.
pub static CONTENT_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("reelog_content_entries", "Number of cached content titles").unwrap()
});

/// Activity log entries.
pub static ACTIVITY_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("reelog_activity_entries", "Number of activity log entries").unwrap()
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

    // Storage
    registry
        .register(Box::new(CONTENT_ENTRIES.clone()))
        .unwrap();
    registry
        .register(Box::new(ACTIVITY_ENTRIES.clone()))
        .unwrap();

    // Core metrics (content cache, catalogs, watched list, images)
    reelog_core::metrics::register_core_metrics(registry);
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
/// Called before encoding so the gauges reflect current row counts.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Ok(count) = state.content_store().count() {
        CONTENT_ENTRIES.set(count as i64);
    }

    let filter = reelog_core::ActivityFilter::new();
    if let Ok(count) = state.activity_store().count(&filter) {
        ACTIVITY_ENTRIES.set(count);
    }
}

/// Normalize a path for metric labels (replace user and numeric IDs with
/// placeholders).
pub fn normalize_path(path: &str) -> String {
    let user_regex = regex_lite::Regex::new(r"/users/[^/]+").unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = user_regex.replace_all(path, "/users/{user_id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
