use crate::format::FormattedEndpoint;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// `METHOD:path` key identifying one catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self(format!("{method}:{path}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory memo of every endpoint formatted so far.
///
/// Clones share the same map. Entries are never expired or persisted; the last write for a key
/// wins.
#[derive(Clone, Default)]
pub struct EndpointCache {
    inner: Arc<RwLock<HashMap<CacheKey, FormattedEndpoint>>>,
}

impl EndpointCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, method: &str, path: &str) -> Option<FormattedEndpoint> {
        self.inner.read().get(&CacheKey::new(method, path)).cloned()
    }

    pub fn put(&self, endpoint: FormattedEndpoint) {
        let key = CacheKey::new(&endpoint.method, &endpoint.path);
        tracing::debug!(key = %key, "cache endpoint");
        self.inner.write().insert(key, endpoint);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Cached keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.inner.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl fmt::Debug for EndpointCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointCache")
            .field("len", &self.len())
            .finish()
    }
}
