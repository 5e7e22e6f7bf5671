//! HTTP front door.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers: request id, trace, limits, timeout)
//!     → request.rs (method check, buffer body → InboundRequest)
//!     → pipeline (forward, transform, cache)
//!     → response.rs (OutboundResponse → client)
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, InboundRequest, MakeRequestUuid, ProxyMethod, X_REQUEST_ID};
pub use response::OutboundResponse;
pub use server::{AppState, HttpServer};
