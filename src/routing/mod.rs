//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, raw path)
//!     → router.rs (prefix match, percent-decode the name)
//!     → Return: Route (Listing, Download, Upload or NotFound)
//! ```
//!
//! # Design Decisions
//! - Routes are fixed; there is no route table to compile
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - Explicit NotFound rather than silent default

pub mod router;

pub use router::Route;
