//! Kind → transform lookup table.

use std::collections::HashMap;
use std::sync::Arc;

use super::css::CssMinifier;
use super::js::JsMinifier;
use super::{ContentKind, Transform, TransformError};

/// Immutable table of registered transforms.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<ContentKind, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// An empty registry; nothing is eligible for transformation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in transform for every listed kind.
    pub fn with_kinds(kinds: &[ContentKind]) -> Self {
        kinds.iter().fold(Self::new(), |registry, kind| {
            let transform: Arc<dyn Transform> = match kind {
                ContentKind::Css => Arc::new(CssMinifier),
                ContentKind::Js => Arc::new(JsMinifier),
            };
            registry.register(transform)
        })
    }

    /// Add or replace the transform for its kind.
    pub fn register(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.insert(transform.kind(), transform);
        self
    }

    /// Whether `kind` has a transform.
    pub fn supports(&self, kind: ContentKind) -> bool {
        self.transforms.contains_key(&kind)
    }

    /// Registered kind for a `Content-Type` value.
    pub fn kind_for_content_type(&self, content_type: &str) -> Option<ContentKind> {
        ContentKind::from_content_type(content_type).filter(|kind| self.supports(*kind))
    }

    /// Registered kind for a URL path's extension.
    pub fn kind_for_path(&self, path: &str) -> Option<ContentKind> {
        ContentKind::from_path(path).filter(|kind| self.supports(*kind))
    }

    /// Run the transform registered for `kind`.
    pub fn optimize(&self, kind: ContentKind, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        match self.transforms.get(&kind) {
            Some(transform) => transform.optimize(input),
            None => Err(TransformError::new(kind, "no transform registered")),
        }
    }

    /// Registered kinds, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = ContentKind> + '_ {
        self.transforms.keys().copied()
    }
}
