use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::collection::Collection;
use crate::common::collection_name;
use crate::config::ConnectionConfig;
use crate::errors::RepoResult;
use crate::repository::{Entity, Repository};
use crate::store::{driver_for, DocumentStore};

/// A connection to one database of a document store, and the registry of
/// collections opened through it.
///
/// The first request for an entity's collection checks whether it exists in
/// the store and creates it if not. That happens exactly once per collection
/// name even under concurrent first access; later requests are served from
/// the cache. Cloning is cheap and clones share the cache.
#[derive(Clone)]
pub struct StoreContext {
    inner: Arc<StoreContextInner>,
}

impl StoreContext {
    /// Parses `connection_string` and connects through the driver registered
    /// for its scheme.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for a blank or malformed string, a missing
    /// database name, or a scheme without a driver.
    pub fn open(connection_string: &str) -> RepoResult<StoreContext> {
        let config = ConnectionConfig::parse(connection_string)?;
        let store = driver_for(config.scheme())?.connect(&config)?;
        log::info!(
            "Opened store context for {} ({})",
            config,
            store.store_version().unwrap_or_else(|_| "unknown".to_string())
        );
        Ok(StoreContext::with_store(config, store))
    }

    /// Wraps an already connected store.
    pub fn with_store(config: ConnectionConfig, store: DocumentStore) -> StoreContext {
        StoreContext {
            inner: Arc::new(StoreContextInner {
                config,
                store,
                handles: DashMap::new(),
            }),
        }
    }

    /// The collection of `T`, created in the store on first access.
    pub fn collection<T: Entity>(&self) -> RepoResult<Collection<T>> {
        let name = collection_name::<T>()?;
        let cell = self
            .inner
            .handles
            .entry(name.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let initialized = cell.get_or_try_init(|| -> RepoResult<String> {
            if self.inner.store.has_collection(&name)? {
                log::debug!("Found existing collection {}", name);
            } else {
                log::debug!("Creating collection {}", name);
                self.inner.store.create_collection(&name)?;
            }
            Ok(name.clone())
        })?;
        Ok(Collection::new(initialized, self.inner.store.clone()))
    }

    /// Whether the store currently holds `T`'s collection. Not cached.
    pub fn collection_exists<T: Entity>(&self) -> RepoResult<bool> {
        let name = collection_name::<T>()?;
        self.inner.store.has_collection(&name)
    }

    /// Drops `T`'s collection and forgets its cached handle.
    pub fn drop_collection<T: Entity>(&self) -> RepoResult<()> {
        let name = collection_name::<T>()?;
        self.inner.handles.remove(&name);
        self.inner.store.drop_collection(&name)
    }

    pub fn repository<T: Entity>(&self) -> RepoResult<Repository<T>> {
        Repository::new(self)
    }

    pub fn collection_names(&self) -> RepoResult<HashSet<String>> {
        self.inner.store.collection_names()
    }

    pub fn database_name(&self) -> &str {
        self.inner.config.database()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }

    /// Whether both values are clones of the same context.
    pub fn same_context(&self, other: &StoreContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn close(&self) -> RepoResult<()> {
        self.inner.handles.clear();
        self.inner.store.close()
    }
}

struct StoreContextInner {
    config: ConnectionConfig,
    store: DocumentStore,
    handles: DashMap<String, Arc<OnceCell<String>>>,
}
