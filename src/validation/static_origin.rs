//! A file-serving origin with ETag revalidation.
//!
//! `GET`/`HEAD /<path>` serves `<root>/<path>` with a guessed `Content-Type`
//! and a content `ETag`. A matching `If-None-Match` gets `304` and no body.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use tokio::fs;

use super::etag::ETag;
use crate::cache::RequestPath;

#[derive(Debug, Clone)]
struct OriginState {
    root: Arc<PathBuf>,
}

/// Router serving files below `root`.
pub fn static_origin(root: impl Into<PathBuf>) -> Router {
    let state = OriginState {
        root: Arc::new(root.into()),
    };
    Router::new()
        .route("/{*path}", get(serve_file))
        .route("/", get(serve_file))
        .with_state(state)
}

async fn serve_file(State(state): State<OriginState>, uri: Uri, headers: HeaderMap) -> Response {
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());
    tracing::info!(path = %uri.path(), if_none_match = ?if_none_match, "Static origin request");

    let path = match RequestPath::parse(uri.path()) {
        Ok(path) => path,
        Err(error) => {
            tracing::warn!(path = %uri.path(), error = %error, "Refusing unsafe path");
            return (StatusCode::BAD_REQUEST, "Invalid path").into_response();
        }
    };

    let Some(location) = path.under(&state.root) else {
        return not_found();
    };
    match fs::metadata(&location).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => return not_found(),
    }

    let contents = match fs::read(&location).await {
        Ok(contents) => Bytes::from(contents),
        Err(error) => {
            tracing::error!(location = %location.display(), error = %error, "Failed to read file");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response();
        }
    };

    let etag = ETag::for_content(&contents);
    if if_none_match.is_some_and(|value| etag.matches_if_none_match(value)) {
        tracing::info!(path = %path, etag = %etag, "Not modified");
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        if let Some(value) = etag.to_header_value() {
            response.headers_mut().insert(header::ETAG, value);
        }
        return response;
    }

    tracing::info!(path = %path, etag = %etag, bytes = contents.len(), "Serving file");
    build_response(&path, contents, &etag)
}

fn build_response(path: &RequestPath, contents: Bytes, etag: &ETag) -> Response {
    let len = contents.len();
    let mut response = Response::new(Body::from(contents));

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path.as_str()).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    if let Some(value) = etag.to_header_value() {
        headers.insert(header::ETAG, value);
    }

    response
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}
