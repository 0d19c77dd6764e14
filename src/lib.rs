//! LAN file sharing library.
//!
//! Serves a directory listing, streams files to clients and accepts browser
//! uploads, without ever letting a client name escape the shared root.

// Sharing core
pub mod error;
pub mod multipart;
pub mod storage;

// Request handling
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use error::ShareError;
