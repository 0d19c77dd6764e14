//! Failure injection tests: hostile names, broken bodies, missing files.

use std::fs;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

const BOUNDARY: &str = "failureBoundary";

async fn post_multipart(server: &common::TestServer, body: Vec<u8>) -> reqwest::Response {
    server
        .client
        .post(server.url("/upload"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .send()
        .await
        .unwrap()
}

fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let server = common::start_server().await;
    fs::write(server.root_path().join("inside.txt"), b"ok").unwrap();

    for path in [
        "/f/..%2F..%2Fetc%2Fpasswd",
        "/f/%2Fetc%2Fpasswd",
        "/f/..%5C..%5Cwindows%5Cwin.ini",
        "/f/sub%2F..%2F..%2Finside.txt",
    ] {
        let res = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(res.text().await.unwrap(), "Invalid path");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_out_of_root_is_rejected() {
    let server = common::start_server().await;
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
    std::os::unix::fs::symlink(
        outside.path().join("secret.txt"),
        server.root_path().join("link.txt"),
    )
    .unwrap();

    let res = server.client.get(server.url("/f/link.txt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let server = common::start_server().await;
    fs::create_dir(server.root_path().join("folder")).unwrap();

    for path in ["/f/absent.txt", "/f/folder", "/f/folder%2Fabsent.txt"] {
        let res = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(res.text().await.unwrap(), "Not found");
    }
}

#[tokio::test]
async fn test_unknown_routes_are_not_found() {
    let server = common::start_server().await;

    let res = server.client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.get(server.url("/upload")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(server.url("/f/a.txt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let server = common::start_server().await;
    let body = common::multipart_body(BOUNDARY, &[("note", None, b"just text")]);

    let res = post_multipart(&server, body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["error"], "No file found in upload");
    assert!(entries(server.root_path()).is_empty());
}

#[tokio::test]
async fn test_upload_with_wrong_boundary() {
    let server = common::start_server().await;
    let body = common::multipart_body("someOtherBoundary", &[("file", Some("a.txt"), b"a")]);

    let res = post_multipart(&server, body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json: Value = res.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("malformed multipart body"));
    assert!(entries(server.root_path()).is_empty());
}

#[tokio::test]
async fn test_truncated_upload_leaves_nothing() {
    let server = common::start_server().await;
    let mut body = common::multipart_body(BOUNDARY, &[("file", Some("cut.bin"), &[9u8; 10_000])]);
    body.truncate(body.len() - 30);

    let res = post_multipart(&server, body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(entries(server.root_path()).is_empty());
}

#[tokio::test]
async fn test_upload_name_cannot_escape() {
    let server = common::start_server().await;
    let body = common::multipart_body(BOUNDARY, &[("file", Some("../../escape.txt"), b"x")]);

    let res = post_multipart(&server, body).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "File \"escape.txt\" uploaded successfully!");
    assert_eq!(entries(server.root_path()), vec!["escape.txt"]);
    assert!(!server.root_path().parent().unwrap().join("escape.txt").exists());

    let body = common::multipart_body(BOUNDARY, &[("file", Some(".."), b"x")]);
    let res = post_multipart(&server, body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_disconnect_mid_upload_cleans_up() {
    let server = common::start_server().await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let head = format!(
        "POST /upload HTTP/1.1\r\nHost: {}\r\nContent-Type: multipart/form-data; boundary={BOUNDARY}\r\nContent-Length: 1000000\r\n\r\n",
        server.addr
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream
        .write_all(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"partial.bin\"\r\n\r\n"
            )
            .as_bytes(),
        )
        .await
        .unwrap();
    stream.write_all(&[1u8; 50_000]).await.unwrap();
    stream.flush().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    drop(stream);

    let mut remaining = entries(server.root_path());
    for _ in 0..50 {
        if remaining.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        remaining = entries(server.root_path());
    }
    assert!(remaining.is_empty(), "left behind: {remaining:?}");
}

#[tokio::test]
async fn test_body_limit_rejects_large_upload() {
    let server = common::start_server_with(|config| {
        config.transfer.max_body_bytes = Some(1024);
    })
    .await;

    let body = common::multipart_body(BOUNDARY, &[("file", Some("big.bin"), &[0u8; 4096])]);
    let res = post_multipart(&server, body).await;
    assert!(res.status().is_client_error());
    assert!(entries(server.root_path()).is_empty());
}

#[tokio::test]
async fn test_raw_http_response_has_request_id() {
    let server = common::start_server().await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 404"));
    assert!(response.to_ascii_lowercase().contains("x-request-id:"));
}
