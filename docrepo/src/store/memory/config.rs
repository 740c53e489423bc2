use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Settings for [InMemoryStore](super::InMemoryStore).
#[derive(Default, Clone)]
pub struct InMemoryStoreConfig {
    inner: Arc<InMemoryStoreConfigInner>,
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig {
            inner: Arc::new(InMemoryStoreConfigInner::default()),
        }
    }

    /// When set, document operations on a collection that was never created
    /// fail with `CollectionNotFound` instead of creating it on the fly.
    pub fn set_strict_collections(&self, strict: bool) {
        self.inner.strict_collections.store(strict, Ordering::Relaxed);
    }

    pub fn strict_collections(&self) -> bool {
        self.inner.strict_collections.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct InMemoryStoreConfigInner {
    strict_collections: AtomicBool,
}
