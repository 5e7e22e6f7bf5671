//! Strong entity tags derived from content.

use std::fmt;

use axum::http::HeaderValue;
use sha2::{Digest, Sha256};

/// A strong validator: the quoted hex SHA-256 of a representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    pub fn for_content(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("\"{}\"", hex::encode(hasher.finalize())))
    }

    /// The tag including its quotes.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tag without quotes.
    pub fn opaque(&self) -> &str {
        self.0.trim_matches('"')
    }

    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }

    /// Whether an `If-None-Match` value names this representation.
    ///
    /// Uses weak comparison: `W/"x"` matches `"x"`. Bare, unquoted tags sent
    /// by sloppy clients are accepted too.
    pub fn matches_if_none_match(&self, header: &str) -> bool {
        let header = header.trim();
        if header == "*" {
            return true;
        }
        header
            .split(',')
            .map(str::trim)
            .map(|tag| tag.strip_prefix("W/").unwrap_or(tag))
            .map(|tag| tag.trim_matches('"'))
            .any(|tag| !tag.is_empty() && tag == self.opaque())
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_quoted_sha256() {
        let tag = ETag::for_content(b"");
        assert_eq!(
            tag.as_str(),
            "\"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\""
        );
        assert_eq!(tag.opaque().len(), 64);
    }

    #[test]
    fn same_content_same_tag() {
        assert_eq!(ETag::for_content(b"a{}"), ETag::for_content(b"a{}"));
        assert_ne!(ETag::for_content(b"a{}"), ETag::for_content(b"b{}"));
    }

    #[test]
    fn if_none_match_forms() {
        let tag = ETag::for_content(b"body{}");
        let quoted = tag.as_str().to_string();
        let bare = tag.opaque().to_string();

        assert!(tag.matches_if_none_match("*"));
        assert!(tag.matches_if_none_match(&quoted));
        assert!(tag.matches_if_none_match(&bare));
        assert!(tag.matches_if_none_match(&format!("W/{quoted}")));
        assert!(tag.matches_if_none_match(&format!("\"other\", {quoted}")));
        assert!(!tag.matches_if_none_match("\"other\""));
        assert!(!tag.matches_if_none_match(""));
    }
}
