//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ShareConfig (validated, immutable)
//!     → passed by value into the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an empty file (or no file) is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    HttpConfig, ListenerConfig, LogFormat, ObservabilityConfig, ShareConfig, StorageConfig,
    TimeoutConfig, TransferConfig,
};
pub use validation::{validate_config, ValidationError};
