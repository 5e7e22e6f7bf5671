//! Artifact cache subsystem.
//!
//! # Data Flow
//! ```text
//! inbound path
//!     → path.rs (validate, decode segments; reject traversal)
//!     → store.rs (map segments under the cache root, read/write blobs)
//!     → locks.rs (serialize writers per location)
//! ```
//!
//! # Design Decisions
//! - Layout mirrors the URL tree; no hashing, no index
//! - The cache is written on every eligible response and never read to
//!   short-circuit the origin
//! - Filesystem errors are reported to the caller, never fatal

pub mod locks;
pub mod path;
pub mod store;

pub use locks::{PathGuard, PathLocks};
pub use path::{PathError, RequestPath};
pub use store::{CacheError, CacheStore};
