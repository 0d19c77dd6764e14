//! Request handlers.
//!
//! # Responsibilities
//! - Dispatch every request through [`Route::resolve`]
//! - Call into the storage and multipart subsystems
//! - Turn their results into responses
//!
//! # Design Decisions
//! - No business logic here; handlers only translate
//! - Browser routes answer errors in plain text, the upload API in JSON
//! - `HEAD` shares the `GET` path; the response body is dropped by the server

use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::http::page::render_listing;
use crate::http::response::{download_headers, ApiError, UploadResponse};
use crate::http::server::AppState;
use crate::multipart::MultipartDecoder;
use crate::observability::metrics::{self, Direction};
use crate::routing::Route;
use crate::storage::{list, receive_upload, transfer_to_client};

/// Single entry point for all paths.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let route = Route::resolve(&method, request.uri().path());
    let label = route.label();

    let response = match route {
        Route::Listing => listing(&state).await.into_response(),
        Route::Download(name) => download(&state, &name).await.into_response(),
        Route::Upload => upload(&state, request).await.into_response(),
        Route::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
    };

    metrics::record_request(method.as_str(), label, response.status().as_u16(), started);
    response
}

async fn listing(state: &AppState) -> Result<Html<String>, ApiError> {
    let listing = list(state.shared_root.path())
        .await
        .map_err(ApiError::Text)?;
    Ok(Html(render_listing(&listing)))
}

async fn download(state: &AppState, name: &str) -> Result<Response, ApiError> {
    let resolved = state
        .shared_root
        .resolve(name)
        .await
        .map_err(ApiError::Text)?;
    let download = transfer_to_client(resolved, state.chunk_size)
        .await
        .map_err(ApiError::Text)?;

    tracing::info!(file = %download.file_name, size = download.size, "Download started");

    let headers = download_headers(&download.file_name, download.size);
    let body = Body::from_stream(metrics::metered(download.stream, Direction::Download));
    Ok((headers, body).into_response())
}

async fn upload(state: &AppState, request: Request) -> Result<Json<UploadResponse>, ApiError> {
    let boundary = crate::http::request::multipart_boundary(request.headers())
        .map_err(ApiError::Json)?;
    let body = request.into_body().into_data_stream();
    let mut decoder = MultipartDecoder::new(body, &boundary);

    let stored = receive_upload(&mut decoder, &state.upload_root, state.chunk_size)
        .await
        .map_err(ApiError::Json)?;
    metrics::record_transfer(Direction::Upload, stored.size);

    Ok(Json(UploadResponse {
        message: format!("File \"{}\" uploaded successfully!", stored.name),
        path: stored.path.display().to_string(),
        size: stored.size,
    }))
}
