//! Prometheus metrics for the auth server.
//!
//! Metrics are recorded through the `metrics` facade and exported in
//! Prometheus text format when an exporter address is configured. Without an
//! installed recorder every call here is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use af_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/auth/login", 200);
//! metrics::auth_events_total("login", "success");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Count an auth operation by name (`login`, `register`, ...) and outcome.
pub fn auth_events_total(operation: &'static str, outcome: &'static str) {
    metrics::counter!("auth_events_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Set the number of registered users.
pub fn registered_users(count: usize) {
    metrics::gauge!("registered_users").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        http_requests_total("GET", "/health", 200);
        http_request_duration_ms("GET", "/health", 1.5);
        auth_events_total("login", "failure");
        registered_users(3);
    }
}
