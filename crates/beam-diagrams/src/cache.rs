//! In-memory render cache.
//!
//! Keyed by a content hash of the diagram source, so blocks that did not
//! change between render cycles skip the renderer entirely. State lives for
//! the process lifetime only; canvas state is rebuilt from the document on
//! every reconnect, so nothing is persisted.

use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// Render parameters for cache key computation.
#[derive(Debug)]
pub(crate) struct RenderKey<'a> {
    /// Diagram source code.
    pub source: &'a str,
}

impl RenderKey<'_> {
    /// Compute a content hash for this key.
    ///
    /// SHA-256 of `"mermaid:svg:{source}"`, hex encoded.
    pub(crate) fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"mermaid:svg:");
        hasher.update(self.source.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A cached render result, past dimension resolution.
#[derive(Debug, Clone)]
pub(crate) struct CachedRender {
    pub data_url: String,
    pub width: f64,
    pub height: f64,
}

/// Thread-safe in-memory cache of rendered diagrams.
#[derive(Debug, Default)]
pub(crate) struct RenderCache {
    inner: Mutex<HashMap<String, CachedRender>>,
}

impl RenderCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, hash: &str) -> Option<CachedRender> {
        self.inner.lock().unwrap().get(hash).cloned()
    }

    pub(crate) fn insert(&self, hash: String, render: CachedRender) {
        self.inner.lock().unwrap().insert(hash, render);
    }
}
