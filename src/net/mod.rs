//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (bind TCP socket)
//!     → Hand off to HTTP layer (axum::serve)
//!
//! Bound address
//!     → interfaces.rs (LAN address discovery for the startup banner)
//! ```

pub mod interfaces;
pub mod listener;

pub use listener::{bind, ListenerError};
