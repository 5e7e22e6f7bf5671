//! Request pipeline: forward, decide, transform, cache.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → RequestPath::parse (400 on unsafe paths, origin untouched)
//!     → OriginClient::forward (502 / 504)
//!     → eligibility.rs (status, method, encoding, content kind)
//!         ├─ not eligible → origin response, hop-by-hop headers removed
//!         └─ eligible → [path lock] put raw → optimize → put → read back
//!     → OutboundResponse
//! ```
//!
//! # Design Decisions
//! - `handle` never fails; errors become responses at this boundary
//! - The eligible section runs on its own task so a client going away
//!   cannot cut a cache write in half
//! - Cache I/O failures degrade to serving the in-memory bytes
//! - The cache is written, never read to answer a request

pub mod eligibility;
pub mod error;

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use bytes::Bytes;

use crate::cache::{CacheStore, PathLocks, RequestPath};
use crate::config::ProxyConfig;
use crate::http::headers::{strip_hop_by_hop, weaken_etag};
use crate::http::{InboundRequest, OutboundResponse};
use crate::observability::metrics;
use crate::origin::{OriginClient, OriginError};
use crate::transform::{ContentKind, TransformError, TransformRegistry};

pub use eligibility::eligible_kind;
pub use error::ProxyError;

/// Shared, cheaply cloneable request pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    origin: OriginClient,
    cache: CacheStore,
    locks: PathLocks,
    transforms: TransformRegistry,
}

impl Pipeline {
    /// Build the pipeline described by `config`.
    pub fn new(config: &ProxyConfig) -> Result<Self, OriginError> {
        let origin = OriginClient::new(&config.origin, &config.timeouts, &config.limits)?;
        Ok(Self::from_parts(
            origin,
            CacheStore::new(config.cache.root.clone()),
            TransformRegistry::with_kinds(&config.transforms.enabled),
        ))
    }

    pub fn from_parts(origin: OriginClient, cache: CacheStore, transforms: TransformRegistry) -> Self {
        Self {
            inner: Arc::new(Inner {
                origin,
                cache,
                locks: PathLocks::new(),
                transforms,
            }),
        }
    }

    /// Answer one request. Every failure is turned into an error response.
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        match self.try_handle(&request).await {
            Ok(response) => response,
            Err(error) => {
                let request_id = request.request_id();
                match &error {
                    ProxyError::Origin(origin) => {
                        metrics::record_origin_error(origin.reason());
                        tracing::error!(
                            request_id = %request_id,
                            path = %request.path,
                            error = %error,
                            "Origin request failed"
                        );
                    }
                    ProxyError::Transform(_) => {
                        tracing::error!(
                            request_id = %request_id,
                            path = %request.path,
                            error = %error,
                            "Transform failed"
                        );
                    }
                    _ => {
                        tracing::warn!(
                            request_id = %request_id,
                            path = %request.path,
                            error = %error,
                            "Request rejected"
                        );
                    }
                }
                OutboundResponse::from_error(&error)
            }
        }
    }

    async fn try_handle(&self, request: &InboundRequest) -> Result<OutboundResponse, ProxyError> {
        let path = RequestPath::parse(&request.path)?;

        tracing::debug!(
            request_id = %request.request_id(),
            method = ?request.method,
            path = %path,
            "Forwarding to origin"
        );
        let mut response = self.inner.origin.forward(request).await?;
        strip_hop_by_hop(&mut response.headers);

        let Some(kind) = eligible_kind(&self.inner.transforms, request.method, &path, &response)
        else {
            return Ok(response);
        };

        let inner = self.inner.clone();
        let request_id = request.request_id().to_string();
        let task = tokio::spawn(async move {
            inner
                .transform_and_cache(&request_id, kind, path, response)
                .await
        });

        match task.await {
            Ok(result) => result,
            Err(join) => Err(TransformError::new(kind, format!("transform task failed: {join}")).into()),
        }
    }
}

impl Inner {
    async fn transform_and_cache(
        self: Arc<Self>,
        request_id: &str,
        kind: ContentKind,
        path: RequestPath,
        mut response: OutboundResponse,
    ) -> Result<OutboundResponse, ProxyError> {
        let location = self.cache.location(&path);
        let _guard = match &location {
            Some(location) => Some(self.locks.acquire(location).await),
            None => {
                tracing::warn!(
                    request_id = %request_id,
                    path = %path,
                    "Path has no file component, skipping cache"
                );
                None
            }
        };

        let mut cached = location.is_some() && self.store(request_id, &path, &response.body).await;

        let original_len = response.body.len();
        let input = response.body.clone();
        let worker = self.clone();
        let outcome = tokio::task::spawn_blocking(move || worker.transforms.optimize(kind, &input))
            .await
            .unwrap_or_else(|join| Err(TransformError::new(kind, format!("transform task failed: {join}"))));
        metrics::record_transform(kind.as_str(), outcome.is_ok());
        let optimized = Bytes::from(outcome?);

        cached = cached && self.store(request_id, &path, &optimized).await;
        let body = if cached {
            match self.cache.get(&path).await {
                Ok(Some(stored)) => stored,
                Ok(None) => optimized,
                Err(error) => {
                    tracing::warn!(request_id = %request_id, path = %path, error = %error, "Cache read-back failed");
                    optimized
                }
            }
        } else {
            optimized
        };

        tracing::debug!(
            request_id = %request_id,
            path = %path,
            kind = %kind,
            original_bytes = original_len,
            optimized_bytes = body.len(),
            cached,
            "Response optimized"
        );

        response
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        weaken_etag(&mut response.headers);
        response.body = body;
        Ok(response)
    }

    /// Write a cache blob; `false` (already logged) when the filesystem refused.
    async fn store(&self, request_id: &str, path: &RequestPath, bytes: &[u8]) -> bool {
        match self.cache.put(path, bytes).await {
            Ok(_) => {
                metrics::record_cache_write(true);
                true
            }
            Err(error) => {
                metrics::record_cache_write(false);
                tracing::warn!(request_id = %request_id, path = %path, error = %error, "Cache write failed");
                false
            }
        }
    }
}
