//! Metrics collection and exposition.
//!
//! # Metrics
//! - `web_host_requests_total` (counter): requests by handler, status
//! - `web_host_request_duration_seconds` (histogram): latency by handler
//! - `web_host_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Recorder installed once per process; later calls reuse it
//! - Recording is a no-op until a recorder exists
//! - Rendered by the `/metrics` operational route, no separate listener

use std::sync::OnceLock;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the Prometheus recorder, returning its handle if it could be
/// installed by this process.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe();
                tracing::debug!("Prometheus recorder installed");
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prometheus recorder unavailable");
                None
            }
        })
        .as_ref()
}

/// Prometheus text exposition, if a recorder is installed.
pub fn render() -> Option<String> {
    init_metrics().map(PrometheusHandle::render)
}

fn describe() {
    describe_counter!("web_host_requests_total", "Requests dispatched by the handler chain");
    describe_histogram!(
        "web_host_request_duration_seconds",
        "Time spent in the dispatched handler"
    );
    describe_gauge!("web_host_active_connections", "Connections currently open");
}

pub fn record_dispatch(handler: &str, status: u16, start_time: Instant) {
    let handler = handler.to_string();
    counter!(
        "web_host_requests_total",
        "handler" => handler.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("web_host_request_duration_seconds", "handler" => handler)
        .record(start_time.elapsed().as_secs_f64());
}

pub fn set_active_connections(count: u64) {
    gauge!("web_host_active_connections").set(count as f64);
}
