//! Metrics collection and exposition.
//!
//! # Metrics
//! - `string_service_requests_total` (counter): endpoint calls by route
//! - `string_service_request_errors_total` (counter): failed endpoint calls by route
//! - `string_service_request_duration_seconds` (histogram): endpoint latency by route
//!
//! Business errors carried in a response (e.g. empty input) count as
//! successful calls.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "string_service_requests_total";
pub const REQUEST_ERRORS_TOTAL: &str = "string_service_request_errors_total";
pub const REQUEST_DURATION_SECONDS: &str = "string_service_request_duration_seconds";

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one endpoint call.
pub fn record_endpoint(route: &'static str, success: bool, start: Instant) {
    ::metrics::counter!(REQUESTS_TOTAL, "route" => route).increment(1);
    if !success {
        ::metrics::counter!(REQUEST_ERRORS_TOTAL, "route" => route).increment(1);
    }
    ::metrics::histogram!(REQUEST_DURATION_SECONDS, "route" => route)
        .record(start.elapsed().as_secs_f64());
}
