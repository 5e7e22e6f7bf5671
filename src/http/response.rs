//! Response handling.
//!
//! # Responsibilities
//! - Carry the buffered origin (or error) response back to the client
//! - Map pipeline errors to HTTP status codes with a short plain-text body

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::pipeline::ProxyError;

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Client-facing rendition of a failed request.
    pub fn from_error(error: &ProxyError) -> Self {
        let mut response = Self::new(error.status(), error.client_message());
        response.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    /// Declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.headers
            .get(header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PathError;

    #[test]
    fn error_responses_are_plain_text() {
        let response = OutboundResponse::from_error(&ProxyError::InvalidPath(PathError::NotAbsolute));

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(response.body, Bytes::from_static(b"Invalid request path"));
    }

    #[test]
    fn into_response_keeps_parts() {
        let mut outbound = OutboundResponse::new(StatusCode::CREATED, "done");
        outbound.headers.insert("x-origin", HeaderValue::from_static("a"));

        let response = outbound.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-origin"], "a");
    }

    #[test]
    fn reads_content_length() {
        let mut outbound = OutboundResponse::new(StatusCode::OK, "abc");
        assert_eq!(outbound.content_length(), None);
        outbound.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(3usize));
        assert_eq!(outbound.content_length(), Some(3));
    }
}
