//! Per-request spans.
//!
//! Every request gets an `http_request` span carrying method, path, peer and
//! the request ID assigned by the request-id layer, so handler log lines can
//! be correlated without repeating those fields.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id;

/// Span factory for `TraceLayer::make_span_with`.
pub fn request_span(request: &Request<Body>) -> Span {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        peer = %peer,
        request_id = request_id(request.headers()).unwrap_or("-"),
    )
}
