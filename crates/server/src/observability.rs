use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram, IntCounter,
    IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_requests_total",
        "Catalog requests by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("register catalog_requests_total")
});

pub static STORE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catalog_store_failures_total",
        "Catalog queries aborted by a store error"
    )
    .expect("register catalog_store_failures_total")
});

pub static LIST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "catalog_list_duration_seconds",
        "List services latency in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("register catalog_list_duration_seconds")
});

/// Record one finished request; `outcome` is `ok`, `not_found` or `error`
pub fn record_request(operation: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[operation, outcome]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
