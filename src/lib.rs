//! Asset-optimizing reverse proxy library.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod origin;
pub mod pipeline;
pub mod transform;
pub mod validation;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Pipeline, ProxyError};
