//! Request-boundary errors and their status mapping.

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::cache::PathError;
use crate::origin::OriginError;
use crate::transform::TransformError;

/// Any failure that ends a request early.
///
/// Cache filesystem failures are deliberately absent: they are logged and
/// counted but never change what the client receives.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid request path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("method {0} is not proxied")]
    MethodNotAllowed(Method),
    #[error("request body unreadable: {0}")]
    RequestBody(#[source] axum::Error),
    #[error(transparent)]
    Origin(#[from] OriginError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::RequestBody(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Origin(OriginError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Origin(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text sent to the client. Internal detail stays in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProxyError::InvalidPath(_) => "Invalid request path",
            ProxyError::MethodNotAllowed(_) => "Method not allowed",
            ProxyError::RequestBody(_) => "Request body too large",
            ProxyError::Origin(OriginError::Timeout(_)) => "Origin timed out",
            ProxyError::Origin(OriginError::Body(_)) => "Origin response could not be read",
            ProxyError::Origin(_) => "Origin unavailable",
            ProxyError::Transform(_) => "Failed to optimize response",
        }
    }
}
