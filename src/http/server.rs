//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Open the shared and upload roots
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Serve on a listener until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ShareConfig;
use crate::error::ShareError;
use crate::http::handlers::dispatch;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::tracing::request_span;
use crate::storage::SharedRoot;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Root served by the listing page and downloads.
    pub shared_root: Arc<SharedRoot>,
    /// Root uploads are written into.
    pub upload_root: Arc<SharedRoot>,
    pub chunk_size: usize,
}

/// HTTP server for the sharing service.
pub struct HttpServer {
    router: Router,
    config: ShareConfig,
}

impl HttpServer {
    /// Create a new HTTP server. Both storage roots must already exist.
    pub fn new(config: ShareConfig) -> Result<Self, ShareError> {
        let shared_root = Arc::new(SharedRoot::open(&config.storage.root_dir)?);
        let upload_root = if config.storage.upload_dir.is_some() {
            Arc::new(SharedRoot::open(config.storage.upload_dir())?)
        } else {
            shared_root.clone()
        };

        tracing::debug!(
            shared_root = %shared_root.path().display(),
            upload_root = %upload_root.path().display(),
            "Storage roots opened"
        );

        let state = AppState {
            shared_root,
            upload_root,
            chunk_size: config.transfer.chunk_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ShareConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state);

        if let Some(limit) = config.transfer.max_body_bytes {
            router = router.layer(RequestBodyLimitLayer::new(limit));
        }
        if config.timeouts.request_secs > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));
        }
        if config.http.cors_enabled {
            router = router.layer(cors_layer());
        }

        router
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root = %self.config.storage.root_dir.display(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router with all layers, for driving the service without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ShareConfig {
        &self.config
    }
}

/// Any origin may read and upload, matching a LAN share opened from other devices.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}
