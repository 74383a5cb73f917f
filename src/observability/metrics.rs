//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Expose Prometheus-compatible metrics endpoint
//! - Record mounts, HTTP traffic and subsystem activity
//!
//! # Metrics
//! - `service_mounts_total` (counter): mounts by service
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `worker_heartbeats_total` (counter): worker loop iterations
//! - `collaboration_active_connections` (gauge): open WebSocket peers
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::services::ServiceId;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_mount(service: ServiceId) {
    counter!("service_mounts_total", "service" => service.as_str()).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("http_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_worker_heartbeat() {
    counter!("worker_heartbeats_total").increment(1);
}

pub fn record_collaboration_connections(delta: f64) {
    gauge!("collaboration_active_connections").increment(delta);
}

/// Middleware recording `http_requests_total` and latency for every request.
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
