//! Prometheus Metrics Module
//!
//! Provides process-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Registrations, logins and messages sent by outcome
//! - User events published and processed
//! - Database pool gauges

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "messenger";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Registrations by outcome
pub static USER_REGISTRATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("user_registrations_total", "Registration attempts").namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("Failed to create USER_REGISTRATIONS_TOTAL metric")
});

/// Logins by outcome
pub static USER_LOGINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("user_logins_total", "Login attempts").namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("Failed to create USER_LOGINS_TOTAL metric")
});

/// Messages sent by outcome
pub static MESSAGES_SENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_sent_total", "Send message attempts").namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("Failed to create MESSAGES_SENT_TOTAL metric")
});

/// Events appended to the user event stream
pub static EVENTS_PUBLISHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_published_total", "User events published").namespace(NAMESPACE),
        &["type"],
    )
    .expect("Failed to create EVENTS_PUBLISHED_TOTAL metric")
});

/// Events consumed from the user event stream
pub static EVENTS_PROCESSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_processed_total", "User events processed").namespace(NAMESPACE),
        &["type", "outcome"],
    )
    .expect("Failed to create EVENTS_PROCESSED_TOTAL metric")
});

/// Database connection pool stats
pub static DB_POOL_CONNECTIONS: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new("db_pool_connections", "Database connection pool statistics").namespace(NAMESPACE),
        &["state"], // "idle", "active", "max"
    )
    .expect("Failed to create DB_POOL_CONNECTIONS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        Box::new(USER_REGISTRATIONS_TOTAL.clone()),
        Box::new(USER_LOGINS_TOTAL.clone()),
        Box::new(MESSAGES_SENT_TOTAL.clone()),
        Box::new(EVENTS_PUBLISHED_TOTAL.clone()),
        Box::new(EVENTS_PROCESSED_TOTAL.clone()),
        Box::new(DB_POOL_CONNECTIONS.clone()),
    ];

    for collector in collectors {
        registry
            .register(collector)
            .expect("Failed to register metric");
    }
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Count a registration attempt
pub fn record_registration(ok: bool) {
    USER_REGISTRATIONS_TOTAL.with_label_values(&[outcome(ok)]).inc();
}

/// Count a login attempt
pub fn record_login(ok: bool) {
    USER_LOGINS_TOTAL.with_label_values(&[outcome(ok)]).inc();
}

/// Count a send message attempt
pub fn record_message_sent(ok: bool) {
    MESSAGES_SENT_TOTAL.with_label_values(&[outcome(ok)]).inc();
}

/// Count a published event
pub fn record_event_published(event_type: &str) {
    EVENTS_PUBLISHED_TOTAL.with_label_values(&[event_type]).inc();
}

/// Count a consumed event; `outcome` is "applied", "skipped" or "failed"
pub fn record_event_processed(event_type: &str, outcome: &str) {
    EVENTS_PROCESSED_TOTAL
        .with_label_values(&[event_type, outcome])
        .inc();
}

/// Helper to update database pool stats
pub fn update_db_pool_stats(idle: u32, active: u32, max: u32) {
    DB_POOL_CONNECTIONS
        .with_label_values(&["idle"])
        .set(idle as f64);
    DB_POOL_CONNECTIONS
        .with_label_values(&["active"])
        .set(active as f64);
    DB_POOL_CONNECTIONS
        .with_label_values(&["max"])
        .set(max as f64);
}
