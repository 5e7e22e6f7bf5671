//! Conditional-request validators and the static origin that uses them.
//!
//! The proxy itself never answers conditionally; it relays `If-None-Match`
//! and whatever the origin decides. `static_origin` is a small origin
//! honouring those headers, used for local setups and in tests.

pub mod etag;
pub mod static_origin;

pub use etag::ETag;
pub use static_origin::static_origin;
