//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration for the file sharing server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ShareConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Shared and upload directories.
    pub storage: StorageConfig,

    /// Streaming buffer sizes and body limits.
    pub transfer: TransferConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// HTTP surface options.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind. `0.0.0.0` makes the server reachable on the LAN.
    pub host: IpAddr,

    /// TCP port. `0` picks an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory whose files are listed and served.
    pub root_dir: PathBuf,

    /// Directory uploads are written to. Defaults to `root_dir`.
    pub upload_dir: Option<PathBuf>,

    /// Create missing directories at startup.
    pub create_missing: bool,
}

impl StorageConfig {
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.as_deref().unwrap_or(&self.root_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./files"),
            upload_dir: None,
            create_missing: true,
        }
    }
}

/// Streaming configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Read/write buffer size for file streaming, in bytes.
    pub chunk_size: usize,

    /// Maximum request body size in bytes. `None` leaves it unlimited.
    pub max_body_bytes: Option<usize>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            max_body_bytes: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds. `0` disables it, which suits large
    /// transfers on slow links.
    pub request_secs: u64,
}

/// HTTP surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Emit permissive CORS headers and answer preflight requests.
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { cors_enabled: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
