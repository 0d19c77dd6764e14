//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (per-request spans carrying the request ID)
//!
//! Consumers:
//!     → stdout (pretty for humans, JSON for collectors)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Structured fields everywhere, never formatted-in values
//! - Request ID flows through every log line of a request via its span
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod tracing;
