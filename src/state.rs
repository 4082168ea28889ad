use crate::registry::Registry;

/// Shared server state, read by every session.
///
/// The document root is immutable after startup and needs no locking. The
/// registry is the only shared-mutable structure (see [`Registry`]).
pub struct SharedState {
    doc_root: String,
    registry: Registry,
}

impl SharedState {
    pub fn new(doc_root: impl Into<String>) -> Self {
        Self {
            doc_root: doc_root.into(),
            registry: Registry::new(),
        }
    }

    pub fn doc_root(&self) -> &str {
        &self.doc_root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
