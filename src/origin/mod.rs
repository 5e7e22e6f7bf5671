//! Origin connectivity.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → client.rs (rebase URI, relay headers/body, bounded wait)
//!     → OutboundResponse (buffered) | OriginError
//! ```

pub mod client;

pub use client::{OriginClient, OriginError};
