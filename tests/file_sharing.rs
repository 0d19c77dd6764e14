//! End-to-end tests for listing, download and upload.

use std::fs;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

mod common;

async fn upload(server: &common::TestServer, filename: &str, content: Vec<u8>) -> reqwest::Response {
    let form = Form::new()
        .text("note", "sent from a test")
        .part("file", Part::bytes(content).file_name(filename.to_string()));

    server
        .client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_listing_page() {
    let server = common::start_server().await;
    fs::write(server.root_path().join("b.txt"), b"b").unwrap();
    fs::write(server.root_path().join("a.txt"), b"a").unwrap();
    fs::create_dir(server.root_path().join("z")).unwrap();
    fs::write(server.root_path().join("z").join("hidden.txt"), b"h").unwrap();

    let res = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = res.text().await.unwrap();
    let a = html.find("a.txt").unwrap();
    let b = html.find("b.txt").unwrap();
    assert!(a < b, "files are sorted");
    assert!(html.contains("z/"));
    assert!(!html.contains("hidden.txt"), "listing does not recurse");
    assert!(html.contains("enctype=\"multipart/form-data\""));
}

#[tokio::test]
async fn test_upload_then_download_round_trip() {
    let server = common::start_server().await;
    let content: Vec<u8> = (0..300_000u32).map(|i| (i * 7 % 256) as u8).collect();

    let res = upload(&server, "data.bin", content.clone()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["message"], "File \"data.bin\" uploaded successfully!");
    assert_eq!(json["size"], 300_000);
    assert!(json["path"].as_str().unwrap().ends_with("data.bin"));

    let res = server.client.get(server.url("/f/data.bin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    assert_eq!(res.headers()["content-length"], "300000");
    assert_eq!(
        res.headers()["content-disposition"],
        "attachment; filename=\"data.bin\""
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), content.as_slice());
}

#[tokio::test]
async fn test_round_trip_payload_containing_delimiter_bytes() {
    let server = common::start_server().await;
    let boundary = "----lanshareBoundaryInPayload";

    let mut content = Vec::new();
    content.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    content.extend_from_slice(b"mid line --");
    content.extend_from_slice(boundary.as_bytes());
    content.extend_from_slice(format!("\r\n--{boundary}-not-a-delimiter\r\n\r\n").as_bytes());

    let body = common::multipart_body(boundary, &[("file", Some("tricky.bin"), &content)]);
    let res = server
        .client
        .post(server.url("/upload"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let downloaded = server
        .client
        .get(server.url("/f/tricky.bin"))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(downloaded.as_ref(), content.as_slice());
}

#[tokio::test]
async fn test_round_trip_empty_file() {
    let server = common::start_server().await;

    let res = upload(&server, "empty.txt", Vec::new()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["size"], 0);

    let res = server.client.get(server.url("/f/empty.txt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-length"], "0");
    assert!(res.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_ascii_and_encoded_names() {
    let server = common::start_server().await;

    let res = upload(&server, "r\u{e9}sum\u{e9} 2024.txt", b"cv".to_vec()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(server.root_path().join("r\u{e9}sum\u{e9} 2024.txt").is_file());

    let res = server
        .client
        .get(server.url("/f/r%C3%A9sum%C3%A9%202024.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-disposition"],
        "attachment; filename=\"r_sum_ 2024.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9%202024.txt"
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"cv");
}

#[tokio::test]
async fn test_upload_replaces_existing_file() {
    let server = common::start_server().await;
    fs::write(server.root_path().join("same.txt"), b"old contents").unwrap();

    let res = upload(&server, "same.txt", b"new".to_vec()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(fs::read(server.root_path().join("same.txt")).unwrap(), b"new");
}

#[tokio::test]
async fn test_separate_upload_directory() {
    let incoming = tempfile::tempdir().unwrap();
    let incoming_path = incoming.path().to_path_buf();
    let server = common::start_server_with(|config| {
        config.storage.upload_dir = Some(incoming_path);
    })
    .await;

    let res = upload(&server, "report.txt", b"r".to_vec()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(incoming.path().join("report.txt").is_file());
    assert!(!server.root_path().join("report.txt").exists());

    let res = server.client.get(server.url("/f/report.txt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_download() {
    let server = common::start_server().await;
    fs::write(server.root_path().join("h.txt"), b"12345").unwrap();

    let res = server.client.head(server.url("/f/h.txt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-length"], "5");
}
