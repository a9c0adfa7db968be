//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_total` (counter): accepted client connections
//! - `proxy_active_connections` (gauge): connections currently handled
//! - `proxy_backend_connect_total` (counter): connect attempts by outcome
//! - `proxy_no_backend_total` (counter): clients dropped for lack of a backend
//! - `proxy_discovery_refresh_total` (counter): refreshes by outcome
//! - `proxy_registry_backends` (gauge): hosts in the registry
//! - `proxy_relay_bytes_total` (counter): relayed bytes by direction
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_connection_accepted() {
    counter!("proxy_connections_total").increment(1);
}

pub fn set_active_connections(count: u64) {
    gauge!("proxy_active_connections").set(count as f64);
}

pub fn record_backend_connect(outcome: &'static str) {
    counter!("proxy_backend_connect_total", "outcome" => outcome).increment(1);
}

pub fn record_no_backend() {
    counter!("proxy_no_backend_total").increment(1);
}

pub fn record_discovery(outcome: &'static str) {
    counter!("proxy_discovery_refresh_total", "outcome" => outcome).increment(1);
}

pub fn set_registry_backends(count: usize) {
    gauge!("proxy_registry_backends").set(count as f64);
}

pub fn record_relay_bytes(direction: &'static str, bytes: u64) {
    counter!("proxy_relay_bytes_total", "direction" => direction).increment(bytes);
}
