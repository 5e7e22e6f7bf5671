//! Configuration validation.
//!
//! Semantic checks that serde cannot express: the origin URL must be a
//! plain `http` URL, addresses must parse, limits must be non-zero and the
//! origin timeout must fit inside the request timeout. Every problem is
//! reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("origin.base_url {0:?} is not a valid URL")]
    InvalidOriginUrl(String),
    #[error("origin.base_url must use http, got {0:?}")]
    UnsupportedScheme(String),
    #[error("origin.base_url must not carry a query or fragment")]
    OriginUrlHasQuery,
    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("timeouts.origin_ms ({origin}) must be lower than timeouts.request_ms ({request})")]
    OriginTimeoutTooLong { origin: u64, request: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.origin.base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::OriginUrlHasQuery);
            }
        }
        Err(_) => errors.push(ValidationError::InvalidOriginUrl(config.origin.base_url.clone())),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let non_zero = [
        ("listener.max_connections", config.listener.max_connections as u64),
        ("limits.max_request_body", config.limits.max_request_body as u64),
        ("limits.max_response_body", config.limits.max_response_body as u64),
        ("timeouts.connect_ms", config.timeouts.connect_ms),
        ("timeouts.origin_ms", config.timeouts.origin_ms),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.timeouts.origin_ms >= config.timeouts.request_ms {
        errors.push(ValidationError::OriginTimeoutTooLong {
            origin: config.timeouts.origin_ms,
            request: config.timeouts.request_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
