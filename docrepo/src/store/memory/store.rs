use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::{InMemoryCollection, InMemoryStoreConfig};
use crate::collection::Document;
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::Filter;
use crate::store::DocumentStoreProvider;

/// A process-local document store. Contents live as long as the last clone.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new(store_config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new(store_config)),
        }
    }

    pub fn store_config(&self) -> InMemoryStoreConfig {
        self.inner.store_config.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::new(InMemoryStoreConfig::new())
    }
}

impl DocumentStoreProvider for InMemoryStore {
    fn store_version(&self) -> RepoResult<String> {
        Ok(format!("InMemory/{}", env!("CARGO_PKG_VERSION")))
    }

    fn collection_names(&self) -> RepoResult<HashSet<String>> {
        self.inner.check_opened()?;
        Ok(self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    fn has_collection(&self, name: &str) -> RepoResult<bool> {
        self.inner.check_opened()?;
        Ok(self.inner.collections.contains_key(name))
    }

    fn create_collection(&self, name: &str) -> RepoResult<()> {
        self.inner.check_opened()?;
        self.inner.create_collection(name);
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> RepoResult<()> {
        self.inner.check_opened()?;
        if self.inner.collections.remove(name).is_some() {
            log::debug!("Dropped collection {}", name);
        }
        Ok(())
    }

    fn find(&self, collection: &str, filter: &Filter) -> RepoResult<Vec<Document>> {
        self.inner.collection(collection)?.find(filter)
    }

    fn count(&self, collection: &str, filter: &Filter) -> RepoResult<u64> {
        self.inner.collection(collection)?.count(filter)
    }

    fn insert_one(&self, collection: &str, document: Document) -> RepoResult<()> {
        self.inner.collection(collection)?.insert(document)
    }

    fn insert_many(&self, collection: &str, documents: Vec<Document>) -> RepoResult<()> {
        let target = self.inner.collection(collection)?;
        for document in documents {
            target.insert(document)?;
        }
        Ok(())
    }

    fn replace_one(&self, collection: &str, filter: &Filter, document: Document) -> RepoResult<u64> {
        self.inner.collection(collection)?.replace_one(filter, document)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> RepoResult<u64> {
        self.inner.collection(collection)?.delete(filter, true)
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> RepoResult<u64> {
        self.inner.collection(collection)?.delete(filter, false)
    }

    fn close(&self) -> RepoResult<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> RepoResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }
}

struct InMemoryStoreInner {
    closed: AtomicBool,
    store_config: InMemoryStoreConfig,
    collections: DashMap<String, InMemoryCollection>,
}

impl InMemoryStoreInner {
    fn new(store_config: InMemoryStoreConfig) -> InMemoryStoreInner {
        InMemoryStoreInner {
            closed: AtomicBool::from(false),
            store_config,
            collections: DashMap::new(),
        }
    }

    fn check_opened(&self) -> RepoResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("In-memory store is already closed");
            return Err(RepoError::new(
                "In-memory store is already closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn create_collection(&self, name: &str) -> InMemoryCollection {
        match self.collections.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                log::debug!("Creating in-memory collection {}", name);
                let collection = InMemoryCollection::new(name);
                entry.insert(collection.clone());
                collection
            }
        }
    }

    fn collection(&self, name: &str) -> RepoResult<InMemoryCollection> {
        self.check_opened()?;
        if let Some(collection) = self.collections.get(name) {
            return Ok(collection.clone());
        }

        if self.store_config.strict_collections() {
            log::error!("Collection {} does not exist", name);
            return Err(RepoError::new(
                &format!("Collection {} does not exist", name),
                ErrorKind::CollectionNotFound,
            ));
        }
        Ok(self.create_collection(name))
    }

    fn close(&self) -> RepoResult<()> {
        if self.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        self.collections.clear();
        Ok(())
    }
}
