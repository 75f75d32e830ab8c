//! Metrics collection and exposition.
//!
//! # Metrics
//! - `soap_requests_total` (counter): requests by operation and outcome
//! - `soap_request_duration_seconds` (histogram): dispatch latency by
//!   operation
//!
//! # Design Decisions
//! - Label values are bounded: unresolved actions are recorded under a single
//!   `unknown` operation label

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "soap_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "soap_request_duration_seconds";

/// Installs the Prometheus recorder with an HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Records one dispatched request.
pub fn record_request(operation: &str, outcome: &'static str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(elapsed);
}
