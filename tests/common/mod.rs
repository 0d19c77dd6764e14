//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::path::Path;

use lanshare::config::ShareConfig;
use lanshare::http::HttpServer;
use lanshare::lifecycle::Shutdown;
use tempfile::TempDir;

/// A running server on an ephemeral loopback port, sharing a temp directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub root: TempDir,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with default settings.
pub async fn start_server() -> TestServer {
    start_server_with(|_| {}).await
}

/// Start a server, letting the caller adjust the config first.
#[allow(dead_code)]
pub async fn start_server_with(configure: impl FnOnce(&mut ShareConfig)) -> TestServer {
    let root = tempfile::tempdir().unwrap();

    let mut config = ShareConfig::default();
    config.storage.root_dir = root.path().to_path_buf();
    config.listener.host = "127.0.0.1".parse().unwrap();
    config.listener.port = 0;
    configure(&mut config);

    let listener = lanshare::net::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestServer {
        addr,
        root,
        client,
        shutdown,
    }
}

/// Build a `multipart/form-data` body by hand.
///
/// Each part is `(name, filename, content)`; `None` filename makes a plain field.
#[allow(dead_code)]
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
