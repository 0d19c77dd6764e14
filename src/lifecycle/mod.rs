//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Prepare directories → Bind → Announce URLs
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight transfers → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then listeners
//! - Fail fast: any startup error is fatal
//! - Interrupted uploads clean up after themselves when their task is dropped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
