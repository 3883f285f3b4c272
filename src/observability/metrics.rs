//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status, environment
//! - `gateway_request_duration_seconds` (histogram): proxied request latency
//! - `gateway_upstream_failures_total` (counter): backend unreachable / timed out
//! - `gateway_auth_events_total` (counter): auth bridge outcomes
//! - `gateway_environment_switches_total` (counter): default environment changes
//!
//! Recording is a no-op until a recorder is installed.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, environment: &str, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "environment" => environment.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "gateway_request_duration_seconds",
        "environment" => environment.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(environment: &str) {
    ::metrics::counter!(
        "gateway_upstream_failures_total",
        "environment" => environment.to_string()
    )
    .increment(1);
}

pub fn record_auth_event(action: &'static str, outcome: &'static str) {
    ::metrics::counter!("gateway_auth_events_total", "action" => action, "outcome" => outcome)
        .increment(1);
}

pub fn record_environment_switch(environment: &str) {
    ::metrics::counter!(
        "gateway_environment_switches_total",
        "environment" => environment.to_string()
    )
    .increment(1);
}
