//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_manager_reconcile_ticks_total` (counter)
//! - `proxy_manager_reconcile_stage_failures_total` (counter): by stage
//! - `proxy_manager_routes_added_total` (counter): by source (api, discovery)
//! - `proxy_manager_routes_deleted_total` (counter): by source (api, cleanup)
//! - `proxy_manager_control_plane_errors_total` (counter): by operation
//! - `proxy_manager_mirror_routes` (gauge): routes in the local mirror
//! - `proxy_manager_discovered_workloads` (gauge): intents from the last discovery

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_reconcile_tick() {
    counter!("proxy_manager_reconcile_ticks_total").increment(1);
}

pub fn record_stage_failure(stage: &'static str) {
    counter!("proxy_manager_reconcile_stage_failures_total", "stage" => stage).increment(1);
}

pub fn record_route_added(source: &'static str) {
    counter!("proxy_manager_routes_added_total", "source" => source).increment(1);
}

pub fn record_route_deleted(source: &'static str) {
    counter!("proxy_manager_routes_deleted_total", "source" => source).increment(1);
}

pub fn record_control_plane_error(op: &'static str) {
    counter!("proxy_manager_control_plane_errors_total", "op" => op).increment(1);
}

pub fn set_mirror_routes(count: usize) {
    gauge!("proxy_manager_mirror_routes").set(count as f64);
}

pub fn set_discovered_workloads(count: usize) {
    gauge!("proxy_manager_discovered_workloads").set(count as f64);
}
