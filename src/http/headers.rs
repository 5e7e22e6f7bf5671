//! Header manipulation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Point `Host` at the origin unless configured to preserve it
//! - Downgrade validators on bodies the proxy rewrote

use axum::http::header::{CONNECTION, ETAG, HOST, TE, TRAILER, TRANSFER_ENCODING, UPGRADE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

const HOP_BY_HOP: [HeaderName; 7] = [
    CONNECTION,
    KEEP_ALIVE,
    PROXY_CONNECTION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Remove connection-scoped headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Set `Host` to the origin authority.
pub fn rewrite_host(headers: &mut HeaderMap, authority: &HeaderValue) {
    headers.insert(HOST, authority.clone());
}

/// Turn a strong `ETag` into a weak one.
///
/// A strong tag promises byte-identical content, which no longer holds once
/// the body has been minified. The weak form still lets the origin answer
/// `If-None-Match` with 304.
pub fn weaken_etag(headers: &mut HeaderMap) {
    let Some(value) = headers.get(ETAG) else {
        return;
    };
    if value.as_bytes().starts_with(b"W/") {
        return;
    }
    let weak = [b"W/".as_slice(), value.as_bytes()].concat();
    match HeaderValue::from_bytes(&weak) {
        Ok(weak) => {
            headers.insert(ETAG, weak);
        }
        Err(_) => {
            headers.remove(ETAG);
        }
    }
}
