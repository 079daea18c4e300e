//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_external_calls_total` (counter): rail and data-source calls by call, outcome
//! - `gateway_cache_requests_total` (counter): cache lookups by cache, outcome (hit/miss)
//! - `gateway_oracle_results_total` (counter): oracle answers by symbol, status
//! - `gateway_transactions_created_total` (counter): unsigned transactions by symbol
//! - `gateway_broadcasts_total` (counter): submissions by outcome
//! - `gateway_rpc_healthy` (gauge): 1=healthy, 0=unhealthy
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok { "ok" } else { "error" }
}

pub fn record_external_call(call: &'static str, ok: bool) {
    counter!("gateway_external_calls_total", "call" => call, "outcome" => outcome(ok)).increment(1);
}

pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gateway_cache_requests_total", "cache" => cache, "outcome" => result).increment(1);
}

pub fn record_oracle_result(symbol: &str, status: &'static str) {
    counter!(
        "gateway_oracle_results_total",
        "symbol" => symbol.to_string(),
        "status" => status
    )
    .increment(1);
}

pub fn record_transactions_created(symbol: &str, count: usize) {
    counter!("gateway_transactions_created_total", "symbol" => symbol.to_string())
        .increment(count as u64);
}

pub fn record_broadcast(ok: bool) {
    counter!("gateway_broadcasts_total", "outcome" => outcome(ok)).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("gateway_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
