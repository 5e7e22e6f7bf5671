//! Which origin responses get transformed.

use axum::http::{header, StatusCode};

use crate::cache::RequestPath;
use crate::http::{OutboundResponse, ProxyMethod};
use crate::transform::{ContentKind, TransformRegistry};

/// The registered kind to apply to `response`, or `None` to pass it through.
///
/// Only a plain 200 with a body qualifies. A declared `Content-Type` wins;
/// the path extension is consulted only when the origin declares none.
pub fn eligible_kind(
    registry: &TransformRegistry,
    method: ProxyMethod,
    path: &RequestPath,
    response: &OutboundResponse,
) -> Option<ContentKind> {
    if response.status != StatusCode::OK || method == ProxyMethod::Head {
        return None;
    }

    let encoded = response
        .headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .any(|value| !value.as_bytes().eq_ignore_ascii_case(b"identity"));
    if encoded {
        return None;
    }

    match response.headers.get(header::CONTENT_TYPE) {
        Some(value) => registry.kind_for_content_type(value.to_str().ok()?),
        None => registry.kind_for_path(path.file_name()?),
    }
}
