//! Content transforms.
//!
//! # Data Flow
//! ```text
//! origin response (200, Content-Type / path extension)
//!     → registry.rs (resolve ContentKind among registered kinds)
//!     → css.rs / js.rs (bytes → optimized bytes)
//!     → pipeline writes the result to the cache and the client
//! ```
//!
//! # Design Decisions
//! - Closed set of kinds; each kind maps to one `Transform` strategy
//! - Registry is built once and shared read-only
//! - Transforms are pure, synchronous and idempotent

pub mod css;
pub mod js;
pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use registry::TransformRegistry;

/// A kind of content the proxy knows how to optimize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Stylesheets.
    Css,
    /// Scripts.
    Js,
}

impl ContentKind {
    /// All known kinds.
    pub const ALL: [ContentKind; 2] = [ContentKind::Css, ContentKind::Js];

    /// Resolve a kind from a `Content-Type` header value.
    ///
    /// Parameters such as `charset` are ignored and the comparison is
    /// case-insensitive.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        let essence = essence.to_ascii_lowercase();
        match essence.as_str() {
            "text/css" => Some(ContentKind::Css),
            "application/javascript"
            | "text/javascript"
            | "application/x-javascript"
            | "application/ecmascript"
            | "text/ecmascript" => Some(ContentKind::Js),
            _ => None,
        }
    }

    /// Resolve a kind from the file extension of a URL path.
    pub fn from_path(path: &str) -> Option<Self> {
        let file = path.rsplit('/').next()?;
        let (stem, ext) = file.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        match ext.to_ascii_lowercase().as_str() {
            "css" => Some(ContentKind::Css),
            "js" | "mjs" => Some(ContentKind::Js),
            _ => None,
        }
    }

    /// Short lowercase name, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Css => "css",
            ContentKind::Js => "js",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to optimize malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} transform failed: {reason}")]
pub struct TransformError {
    pub kind: ContentKind,
    pub reason: String,
}

impl TransformError {
    pub fn new(kind: ContentKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// A byte-to-byte optimizer for one content kind.
///
/// Implementations must be idempotent: feeding an output back in returns it
/// unchanged.
pub trait Transform: Send + Sync + fmt::Debug {
    /// The kind this transform handles.
    fn kind(&self) -> ContentKind;

    /// Optimize `input`, or explain why it is malformed.
    fn optimize(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_ignores_parameters_and_case() {
        assert_eq!(ContentKind::from_content_type("text/css"), Some(ContentKind::Css));
        assert_eq!(
            ContentKind::from_content_type("Text/CSS; charset=utf-8"),
            Some(ContentKind::Css)
        );
        assert_eq!(
            ContentKind::from_content_type("application/javascript;charset=UTF-8"),
            Some(ContentKind::Js)
        );
        assert_eq!(ContentKind::from_content_type("text/html"), None);
        assert_eq!(ContentKind::from_content_type(""), None);
    }

    #[test]
    fn path_extension() {
        assert_eq!(ContentKind::from_path("/static/a.css"), Some(ContentKind::Css));
        assert_eq!(ContentKind::from_path("/app/main.MJS"), Some(ContentKind::Js));
        assert_eq!(ContentKind::from_path("/static/"), None);
        assert_eq!(ContentKind::from_path("/.css"), None);
        assert_eq!(ContentKind::from_path("/css"), None);
        assert_eq!(ContentKind::from_path("/a.css/index.html"), None);
    }
}
