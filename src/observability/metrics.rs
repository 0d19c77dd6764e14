//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lanshare_requests_total` (counter): requests by method, route, status
//! - `lanshare_request_duration_seconds` (histogram): latency by route
//! - `lanshare_bytes_total` (counter): payload bytes moved, by direction. Downloads
//!   count chunks as they are streamed, so HEAD and aborted downloads add nothing
//!   beyond what was sent
//! - `lanshare_errors_total` (counter): failed operations by error kind
//!
//! # Design Decisions
//! - The Prometheus exporter is opt-in; without it the macros are no-ops
//! - Labels are low cardinality (no file names)

use std::net::SocketAddr;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

/// Duration buckets in seconds. Transfers run far longer than page loads.
const DURATION_BUCKETS: [f64; 12] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0,
];

/// Direction of a payload transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }
}

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full("lanshare_request_duration_seconds".to_string()),
            &DURATION_BUCKETS,
        )?
        .install()?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, route: &'static str, status: u16, started: Instant) {
    metrics::counter!(
        "lanshare_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("lanshare_request_duration_seconds", "route" => route)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_transfer(direction: Direction, bytes: u64) {
    metrics::counter!("lanshare_bytes_total", "direction" => direction.as_str()).increment(bytes);
}

/// Count each chunk of `stream` once it is produced.
pub fn metered<S, E>(stream: S, direction: Direction) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    stream.inspect_ok(move |chunk| record_transfer(direction, chunk.len() as u64))
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("lanshare_errors_total", "kind" => kind).increment(1);
}
