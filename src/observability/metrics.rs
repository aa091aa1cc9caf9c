//! Metrics collection and exposition.
//!
//! # Metrics
//! - `negotiation_requests_total` (counter): requests by negotiated kind
//! - `action_duration_seconds` (histogram): action latency by action name
//! - `action_faults_total` (counter): faults, labelled translated or propagated
//! - `render_failures_total` (counter): serialized results that failed to render
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are bounded: kinds, formats and action names are all fixed sets

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::negotiation::{Format, RepresentationKind};

/// Install the Prometheus exporter and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_negotiation(kind: RepresentationKind) {
    counter!("negotiation_requests_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_action(action: &str, start: Instant) {
    histogram!("action_duration_seconds", "action" => action.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// `translated` is false when the fault propagated past the filter.
pub fn record_fault(translated: bool) {
    let outcome = if translated { "translated" } else { "propagated" };
    counter!("action_faults_total", "outcome" => outcome).increment(1);
}

pub fn record_render_failure(format: Format) {
    counter!("render_failures_total", "format" => format.as_str()).increment(1);
}
