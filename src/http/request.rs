//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Restrict methods to the proxied set
//! - Buffer the body and hand an `InboundRequest` to the pipeline

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use bytes::Bytes;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::pipeline::ProxyError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID from a header map, if one was assigned.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Methods the proxy relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl ProxyMethod {
    pub fn as_method(&self) -> Method {
        match self {
            ProxyMethod::Get => Method::GET,
            ProxyMethod::Post => Method::POST,
            ProxyMethod::Put => Method::PUT,
            ProxyMethod::Delete => Method::DELETE,
            ProxyMethod::Patch => Method::PATCH,
            ProxyMethod::Options => Method::OPTIONS,
            ProxyMethod::Head => Method::HEAD,
        }
    }
}

impl TryFrom<&Method> for ProxyMethod {
    type Error = ProxyError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        Ok(match *method {
            Method::GET => ProxyMethod::Get,
            Method::POST => ProxyMethod::Post,
            Method::PUT => ProxyMethod::Put,
            Method::DELETE => ProxyMethod::Delete,
            Method::PATCH => ProxyMethod::Patch,
            Method::OPTIONS => ProxyMethod::Options,
            Method::HEAD => ProxyMethod::Head,
            _ => return Err(ProxyError::MethodNotAllowed(method.clone())),
        })
    }
}

/// A fully buffered client request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: ProxyMethod,
    /// Raw URL path, validated by the pipeline before use.
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    /// A bodiless request, mostly useful in tests.
    pub fn new(method: ProxyMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Buffer an axum request. Body size is bounded by the limit layer in front.
    pub async fn from_request(request: Request<Body>) -> Result<Self, ProxyError> {
        let method = ProxyMethod::try_from(request.method())?;
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(ProxyError::RequestBody)?;

        Ok(Self {
            method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        })
    }

    pub fn request_id(&self) -> &str {
        request_id(&self.headers)
    }
}
