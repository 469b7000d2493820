//! Prometheus metrics for the search index
//!
//! Queries, per-file indexing, bulk builds and the change feed each report
//! here. Metrics work without registration; `register_metrics` only makes
//! them visible to `gather_metrics`.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Query metrics
    // ============================================================================

    /// Total number of queries
    pub static ref QUERY_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "aim_index_query_requests_total",
            "Total number of queries"
        )
    ).expect("Failed to create QUERY_REQUESTS counter");

    /// Query latency in seconds
    pub static ref QUERY_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "aim_index_query_latency_seconds",
            "Query latency in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1])
    ).expect("Failed to create QUERY_LATENCY histogram");

    /// Number of paths returned per query
    pub static ref QUERY_RESULTS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "aim_index_query_results_count",
            "Number of paths returned per query"
        ).buckets(vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 1000.0])
    ).expect("Failed to create QUERY_RESULTS histogram");

    // ============================================================================
    // Index metrics
    // ============================================================================

    /// Number of files with content postings
    pub static ref INDEXED_FILES: Gauge = Gauge::with_opts(
        Opts::new(
            "aim_index_indexed_files",
            "Number of files with content postings"
        )
    ).expect("Failed to create INDEXED_FILES gauge");

    /// Files whose content or name step failed
    pub static ref INDEX_FAILURES: Counter = Counter::with_opts(
        Opts::new(
            "aim_index_failures_total",
            "Files whose content or name step failed"
        )
    ).expect("Failed to create INDEX_FAILURES counter");

    /// Duration of bulk builds in seconds
    pub static ref BUILD_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "aim_index_build_duration_seconds",
            "Duration of bulk builds in seconds"
        ).buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0])
    ).expect("Failed to create BUILD_DURATION histogram");

    // ============================================================================
    // Change feed metrics
    // ============================================================================

    /// Change notifications applied
    pub static ref CHANGE_NOTIFICATIONS: Counter = Counter::with_opts(
        Opts::new(
            "aim_index_change_notifications_total",
            "Change notifications applied"
        )
    ).expect("Failed to create CHANGE_NOTIFICATIONS counter");

    /// Errors reported by the watch layer
    pub static ref WATCH_ERRORS: Counter = Counter::with_opts(
        Opts::new(
            "aim_index_watch_errors_total",
            "Errors reported by the watch layer"
        )
    ).expect("Failed to create WATCH_ERRORS counter");
}

/// Register all metrics with the global registry
///
/// Call once at startup. Panics if registration fails.
pub fn register_metrics() {
    REGISTRY
        .register(Box::new(QUERY_REQUESTS.clone()))
        .expect("Failed to register QUERY_REQUESTS");
    REGISTRY
        .register(Box::new(QUERY_LATENCY.clone()))
        .expect("Failed to register QUERY_LATENCY");
    REGISTRY
        .register(Box::new(QUERY_RESULTS.clone()))
        .expect("Failed to register QUERY_RESULTS");
    REGISTRY
        .register(Box::new(INDEXED_FILES.clone()))
        .expect("Failed to register INDEXED_FILES");
    REGISTRY
        .register(Box::new(INDEX_FAILURES.clone()))
        .expect("Failed to register INDEX_FAILURES");
    REGISTRY
        .register(Box::new(BUILD_DURATION.clone()))
        .expect("Failed to register BUILD_DURATION");
    REGISTRY
        .register(Box::new(CHANGE_NOTIFICATIONS.clone()))
        .expect("Failed to register CHANGE_NOTIFICATIONS");
    REGISTRY
        .register(Box::new(WATCH_ERRORS.clone()))
        .expect("Failed to register WATCH_ERRORS");
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns an empty string if encoding fails.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}

/// Current metric values for the human-readable stats output
pub struct MetricSnapshot {
    pub query_requests_total: f64,
    pub query_latency_avg: f64,
    pub query_results_avg: f64,
    pub indexed_files: f64,
    pub index_failures_total: f64,
    pub build_duration_avg: f64,
}

impl MetricSnapshot {
    /// Capture the current state of all metrics
    pub fn capture() -> Self {
        Self {
            query_requests_total: QUERY_REQUESTS.get(),
            query_latency_avg: calculate_histogram_avg(&QUERY_LATENCY),
            query_results_avg: calculate_histogram_avg(&QUERY_RESULTS),
            indexed_files: INDEXED_FILES.get(),
            index_failures_total: INDEX_FAILURES.get(),
            build_duration_avg: calculate_histogram_avg(&BUILD_DURATION),
        }
    }
}

fn calculate_histogram_avg(histogram: &Histogram) -> f64 {
    let count = histogram.get_sample_count();
    if count == 0 {
        return 0.0;
    }
    histogram.get_sample_sum() / count as f64
}
