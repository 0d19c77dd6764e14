//! Response construction.
//!
//! # Responsibilities
//! - Map [`ShareError`] to HTTP status codes
//! - Render errors as plain text (browser routes) or JSON (upload API)
//! - Build download headers
//!
//! # Design Decisions
//! - Server-side failures never expose I/O details to the client
//! - `Content-Disposition` carries an ASCII fallback plus an RFC 5987
//!   `filename*` when the name is not plain ASCII

use axum::http::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::error::ShareError;
use crate::observability::metrics;

/// RFC 5987 `attr-char` complement.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Status code for a core error.
pub fn status_for(err: &ShareError) -> StatusCode {
    match err {
        ShareError::PathEscape(_) => StatusCode::BAD_REQUEST,
        ShareError::MalformedMultipart(_) => StatusCode::BAD_REQUEST,
        ShareError::NoFileProvided => StatusCode::BAD_REQUEST,
        ShareError::NotFound(_) => StatusCode::NOT_FOUND,
        ShareError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error returned by handlers, tagged with the body format the route speaks.
#[derive(Debug)]
pub enum ApiError {
    Text(ShareError),
    Json(ShareError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn inner(&self) -> &ShareError {
        match self {
            ApiError::Text(err) | ApiError::Json(err) => err,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.inner();
        let status = status_for(err);
        metrics::record_error(err.kind());

        if status.is_server_error() {
            tracing::error!(error = %err, kind = err.kind(), "Request failed");
        } else {
            tracing::info!(error = %err, kind = err.kind(), status = status.as_u16(), "Request rejected");
        }

        match self {
            ApiError::Text(err) => (status, text_message(&err)).into_response(),
            ApiError::Json(err) => (
                status,
                Json(ErrorBody {
                    error: json_message(&err),
                }),
            )
                .into_response(),
        }
    }
}

fn text_message(err: &ShareError) -> &'static str {
    match err {
        ShareError::PathEscape(_) => "Invalid path",
        ShareError::NotFound(_) => "Not found",
        ShareError::MalformedMultipart(_) | ShareError::NoFileProvided => "Bad request",
        ShareError::StorageUnavailable(_) => "Internal server error",
    }
}

fn json_message(err: &ShareError) -> String {
    match err {
        ShareError::NoFileProvided => "No file found in upload".to_string(),
        ShareError::StorageUnavailable(_) => "Upload failed".to_string(),
        other => other.to_string(),
    }
}

/// Success body of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub path: String,
    pub size: u64,
}

/// Headers for streaming `file_name` as an attachment of `size` bytes.
pub fn download_headers(file_name: &str, size: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
    let disposition = HeaderValue::from_str(&content_disposition(file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    headers.insert(CONTENT_DISPOSITION, disposition);
    headers
}

/// `attachment; filename="..."` with `"` and `\` escaped.
pub fn content_disposition(file_name: &str) -> String {
    let mut fallback = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                fallback.push('\\');
                fallback.push(c);
            }
            ' '..='~' => fallback.push(c),
            _ => fallback.push('_'),
        }
    }

    let plain = file_name.chars().all(|c| matches!(c, ' '..='~'));
    if plain {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(file_name, ATTR_CHAR)
        )
    }
}
