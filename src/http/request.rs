//! Request inspection helpers.
//!
//! # Responsibilities
//! - Assign and propagate a unique request ID (UUID v4)
//! - Extract the multipart boundary from `Content-Type`
//!
//! # Design Decisions
//! - Request ID added as early as possible so every span carries it
//! - A client supplied `x-request-id` is kept as is

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::error::ShareError;
use crate::multipart::boundary_from_content_type;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns an ID to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Boundary of a `multipart/form-data` request body.
pub fn multipart_boundary(headers: &HeaderMap) -> Result<String, ShareError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .ok_or_else(|| ShareError::malformed("missing Content-Type header"))?
        .to_str()
        .map_err(|_| ShareError::malformed("Content-Type header is not visible ASCII"))?;

    boundary_from_content_type(content_type)
}
