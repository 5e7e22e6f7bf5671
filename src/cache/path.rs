//! Request path validation.
//!
//! Every inbound path is checked before it is forwarded or mapped onto the
//! cache tree. Segments are percent-decoded first so that encoded traversal
//! (`%2e%2e`, `%2f`) is caught the same way as the literal form.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reasons a path is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must start with '/'")]
    NotAbsolute,
    #[error("path segment {0:?} escapes the tree")]
    Traversal(String),
    #[error("path contains a NUL byte")]
    NulByte,
    #[error("path segment {0:?} contains a separator")]
    Separator(String),
    #[error("path segment {0:?} does not decode to UTF-8")]
    BadEncoding(String),
}

/// A validated, absolute URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    raw: String,
    segments: Vec<String>,
    directory: bool,
}

impl RequestPath {
    /// Validate a raw URL path (no scheme, authority or query).
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let rest = raw.strip_prefix('/').ok_or(PathError::NotAbsolute)?;
        if raw.contains('\0') {
            return Err(PathError::NulByte);
        }

        let mut segments = Vec::new();
        for encoded in rest.split('/') {
            let segment = urlencoding::decode(encoded)
                .map_err(|_| PathError::BadEncoding(encoded.to_string()))?;
            if segment.contains('\0') {
                return Err(PathError::NulByte);
            }
            if segment == "." || segment == ".." {
                return Err(PathError::Traversal(encoded.to_string()));
            }
            if segment.contains('/') || segment.contains('\\') {
                return Err(PathError::Separator(encoded.to_string()));
            }
            if !segment.is_empty() {
                segments.push(segment.into_owned());
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            directory: rest.is_empty() || rest.ends_with('/'),
            segments,
        })
    }

    /// The path exactly as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decoded, non-empty segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, unless the path names a directory.
    pub fn file_name(&self) -> Option<&str> {
        if self.directory {
            None
        } else {
            self.segments.last().map(String::as_str)
        }
    }

    /// The file this path names beneath `root`, or `None` for directories.
    pub fn under(&self, root: &Path) -> Option<PathBuf> {
        self.file_name()?;
        Some(
            self.segments
                .iter()
                .fold(root.to_path_buf(), |location, segment| location.join(segment)),
        )
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_paths() {
        let path = RequestPath::parse("/a/b/style.css").unwrap();
        assert_eq!(path.segments(), ["a", "b", "style.css"]);
        assert_eq!(path.file_name(), Some("style.css"));
        assert_eq!(path.as_str(), "/a/b/style.css");
    }

    #[test]
    fn decodes_segments() {
        let path = RequestPath::parse("/fonts/Open%20Sans.css").unwrap();
        assert_eq!(path.segments(), ["fonts", "Open Sans.css"]);
        assert_eq!(path.as_str(), "/fonts/Open%20Sans.css");
    }

    #[test]
    fn directories_have_no_file() {
        assert_eq!(RequestPath::parse("/").unwrap().file_name(), None);
        assert_eq!(RequestPath::parse("/static/").unwrap().file_name(), None);
        assert_eq!(RequestPath::parse("//a.css").unwrap().segments(), ["a.css"]);
    }

    #[test]
    fn rejects_traversal() {
        assert_eq!(
            RequestPath::parse("/a/../b.css"),
            Err(PathError::Traversal("..".into()))
        );
        assert_eq!(
            RequestPath::parse("/a/%2E%2e/b.css"),
            Err(PathError::Traversal("%2E%2e".into()))
        );
        assert!(matches!(RequestPath::parse("/./x"), Err(PathError::Traversal(_))));
    }

    #[test]
    fn rejects_unsafe_bytes() {
        assert_eq!(RequestPath::parse("a.css"), Err(PathError::NotAbsolute));
        assert_eq!(RequestPath::parse("/a%00.css"), Err(PathError::NulByte));
        assert!(matches!(RequestPath::parse("/a%2Fb.css"), Err(PathError::Separator(_))));
        assert!(matches!(RequestPath::parse("/a\\b.css"), Err(PathError::Separator(_))));
        assert!(matches!(RequestPath::parse("/a%ff.css"), Err(PathError::BadEncoding(_))));
        assert!(matches!(RequestPath::parse("/a/%2e%2E"), Err(PathError::Traversal(_))));
    }

    #[test]
    fn stray_percent_signs_stay_literal() {
        let path = RequestPath::parse("/a%zz/100%.css").unwrap();
        assert_eq!(path.segments(), ["a%zz", "100%.css"]);
        // A literal percent cannot smuggle in a traversal.
        let path = RequestPath::parse("/%%2e%2e/x").unwrap();
        assert_eq!(path.segments(), ["%..", "x"]);
    }
}
