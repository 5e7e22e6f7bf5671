//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transform::ContentKind;

/// Root configuration for the asset proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// The single origin every request is forwarded to.
    pub origin: OriginConfig,

    /// On-disk artifact cache.
    pub cache: CacheConfig,

    /// Which content kinds get optimized.
    pub transforms: TransformsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests in flight at once (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Origin (backend) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL requests are forwarded to, e.g. "http://localhost:8000".
    /// A path component is used as a prefix for every forwarded path.
    pub base_url: String,

    /// Forward the client's `Host` header instead of the origin authority.
    pub preserve_host: bool,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            preserve_host: false,
        }
    }
}

/// Artifact cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory whose subtree mirrors request paths.
    pub root: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("cache"),
        }
    }
}

/// Transform selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformsConfig {
    /// Content kinds registered at startup.
    pub enabled: Vec<ContentKind>,
}

impl Default for TransformsConfig {
    fn default() -> Self {
        Self {
            enabled: vec![ContentKind::Css],
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Origin connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Time allowed for the origin to deliver its full response, in milliseconds.
    pub origin_ms: u64,

    /// Total time for an inbound request, in milliseconds.
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            origin_ms: 30_000,
            request_ms: 60_000,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound request body in bytes.
    pub max_request_body: usize,

    /// Maximum origin response body buffered in bytes.
    pub max_response_body: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_body: 2 * 1024 * 1024,   // 2MB
            max_response_body: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
