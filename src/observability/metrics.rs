//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_origin_errors_total` (counter): failed origin calls by reason
//! - `proxy_transforms_total` (counter): transforms by kind, outcome
//! - `proxy_cache_writes_total` (counter): cache writes by outcome
//!
//! Recording goes through the `metrics` facade and costs nothing when no
//! recorder is installed.

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

static DESCRIPTIONS: Once = Once::new();

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe() {
    DESCRIPTIONS.call_once(|| {
        describe_counter!("proxy_requests_total", Unit::Count, "Requests answered by the proxy.");
        describe_histogram!(
            "proxy_request_duration_seconds",
            Unit::Seconds,
            "Time from request receipt to response."
        );
        describe_counter!(
            "proxy_origin_errors_total",
            Unit::Count,
            "Origin calls that failed or timed out."
        );
        describe_counter!("proxy_transforms_total", Unit::Count, "Transforms applied to responses.");
        describe_counter!("proxy_cache_writes_total", Unit::Count, "Writes to the artifact cache.");
    });
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!("proxy_requests_total", "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed origin call (`unavailable`, `timeout`, `body`).
pub fn record_origin_error(reason: &'static str) {
    counter!("proxy_origin_errors_total", "reason" => reason).increment(1);
}

/// Record a transform attempt.
pub fn record_transform(kind: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("proxy_transforms_total", "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record a cache write attempt.
pub fn record_cache_write(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("proxy_cache_writes_total", "outcome" => outcome).increment(1);
}
