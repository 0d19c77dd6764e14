//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, multipart boundary)
//!     → handlers.rs (routing::Route → storage / multipart)
//!     → page.rs (listing HTML) / response.rs (status, headers, JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod page;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
