//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by method, status
//! - `proxy_request_duration_seconds` (histogram): forward-path latency
//! - `proxy_tunnels_total` (counter): tunnels by outcome
//! - `proxy_active_tunnels` (gauge): currently open tunnels
//! - `proxy_tunnel_bytes_total` (counter): relayed bytes by direction

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address. Call once at
/// startup; a failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one forwarded HTTP request.
pub fn record_forward(method: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a tunnel that reached the relaying state.
pub fn tunnel_opened() {
    counter!("proxy_tunnels_total", "outcome" => "established").increment(1);
    gauge!("proxy_active_tunnels").increment(1.0);
}

/// Record a tunnel that never got established (connect or upgrade failure).
pub fn tunnel_failed(reason: &'static str) {
    counter!("proxy_tunnels_total", "outcome" => reason).increment(1);
}

/// Record a closed tunnel with the bytes relayed in each direction.
pub fn tunnel_closed(client_to_server: u64, server_to_client: u64) {
    gauge!("proxy_active_tunnels").decrement(1.0);
    counter!("proxy_tunnel_bytes_total", "direction" => "upstream").increment(client_to_server);
    counter!("proxy_tunnel_bytes_total", "direction" => "downstream").increment(server_to_client);
}
