//! Outbound HTTP client for the configured origin.
//!
//! # Responsibilities
//! - Rebase inbound paths onto the origin base URL
//! - Relay method, headers and body (minus hop-by-hop headers)
//! - Buffer the full origin response within the origin timeout
//!
//! # Design Decisions
//! - One pooled hyper client shared by all requests
//! - The timeout covers connect, headers and body together
//! - Nothing here touches the cache; failures leave no trace on disk

use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderValue, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::{LimitsConfig, OriginConfig, TimeoutConfig};
use crate::http::headers::{rewrite_host, strip_hop_by_hop};
use crate::http::{InboundRequest, OutboundResponse};

/// Failure talking to the origin.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("origin base URL {0:?} is invalid")]
    InvalidBase(String),
    #[error("could not build origin URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),
    #[error("origin unavailable: {0}")]
    Unavailable(#[source] hyper_util::client::legacy::Error),
    #[error("origin did not respond within {0:?}")]
    Timeout(Duration),
    #[error("origin response body unreadable: {0}")]
    Body(#[source] axum::Error),
}

impl OriginError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OriginError::InvalidBase(_) | OriginError::Uri(_) => "uri",
            OriginError::Unavailable(_) => "unavailable",
            OriginError::Timeout(_) => "timeout",
            OriginError::Body(_) => "body",
        }
    }
}

/// Client bound to a single origin.
#[derive(Clone, Debug)]
pub struct OriginClient {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
    path_prefix: String,
    preserve_host: bool,
    timeout: Duration,
    max_body: usize,
}

impl OriginClient {
    pub fn new(
        origin: &OriginConfig,
        timeouts: &TimeoutConfig,
        limits: &LimitsConfig,
    ) -> Result<Self, OriginError> {
        let invalid = || OriginError::InvalidBase(origin.base_url.clone());
        let base: Uri = origin.base_url.parse().map_err(|_| invalid())?;
        let scheme = base.scheme().cloned().ok_or_else(invalid)?;
        let authority = base.authority().cloned().ok_or_else(invalid)?;
        let host_header = HeaderValue::from_str(authority.as_str()).map_err(|_| invalid())?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(timeouts.connect_ms)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            scheme,
            authority,
            host_header,
            path_prefix: base.path().trim_end_matches('/').to_string(),
            preserve_host: origin.preserve_host,
            timeout: Duration::from_millis(timeouts.origin_ms),
            max_body: limits.max_response_body,
        })
    }

    /// Origin URI for an inbound path and query.
    pub fn upstream_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, OriginError> {
        let query = query.map(|q| format!("?{q}")).unwrap_or_default();
        let uri = format!(
            "{}://{}{}{}{}",
            self.scheme, self.authority, self.path_prefix, path, query
        );
        Ok(uri.parse()?)
    }

    /// Relay `request` and buffer the origin's complete response.
    pub async fn forward(&self, request: &InboundRequest) -> Result<OutboundResponse, OriginError> {
        let uri = self.upstream_uri(&request.path, request.query.as_deref())?;

        let mut headers = request.headers.clone();
        strip_hop_by_hop(&mut headers);
        if !self.preserve_host {
            rewrite_host(&mut headers, &self.host_header);
        }

        let mut outbound = Request::new(Body::from(request.body.clone()));
        *outbound.method_mut() = request.method.as_method();
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = headers;

        let exchange = async {
            let response = self
                .client
                .request(outbound)
                .await
                .map_err(OriginError::Unavailable)?;
            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), self.max_body)
                .await
                .map_err(OriginError::Body)?;
            Ok::<_, OriginError>(OutboundResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(OriginError::Timeout(self.timeout)),
        }
    }
}
