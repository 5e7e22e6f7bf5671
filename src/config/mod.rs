//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed by value to the pipeline and the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no process-wide state
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CacheConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, OriginConfig,
    ProxyConfig, TimeoutConfig, TransformsConfig,
};
pub use validation::{validate_config, ValidationError};
