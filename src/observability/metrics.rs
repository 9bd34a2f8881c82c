//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): resolutions by outcome (matched, unmatched)
//! - `router_registration_errors_total` (counter): rejected registrations by kind
//! - `router_handler_errors_total` (counter): handlers that could not be invoked
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition only when the CLI asks for it

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    metrics::counter!("router_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_registration_error(kind: &'static str) {
    metrics::counter!("router_registration_errors_total", "kind" => kind).increment(1);
}

pub fn record_handler_error() {
    metrics::counter!("router_handler_errors_total").increment(1);
}
