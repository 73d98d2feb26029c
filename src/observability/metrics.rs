//! Metrics collection and exposition.
//!
//! # Metrics
//! - `shell_route_resolutions_total` (counter): resolved locations by route
//! - `shell_route_not_found_total` (counter): locations matching no route
//! - `shell_navigations_total` (counter): navigation events by kind

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

pub fn record_resolution(route: &str) {
    metrics::counter!("shell_route_resolutions_total", "route" => route.to_string()).increment(1);
}

pub fn record_not_found() {
    metrics::counter!("shell_route_not_found_total").increment(1);
}

pub fn record_navigation(kind: &'static str) {
    metrics::counter!("shell_navigations_total", "kind" => kind).increment(1);
}

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
