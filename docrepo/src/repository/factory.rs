use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;

use super::{Entity, Repository};
use crate::context::StoreContext;
use crate::errors::{ErrorKind, RepoError, RepoResult};

/// Registration entry point: one [StoreContext] per connection string and
/// one [Repository] per (connection string, entity type), both created on
/// first request.
#[derive(Clone, Default)]
pub struct RepositoryFactory {
    inner: Arc<RepositoryFactoryInner>,
}

impl RepositoryFactory {
    pub fn new() -> Self {
        RepositoryFactory::default()
    }

    /// The shared context for `connection_string`.
    pub fn context(&self, connection_string: &str) -> RepoResult<StoreContext> {
        self.inner.context(connection_string)
    }

    /// The shared repository of `T` for `connection_string`.
    pub fn repository<T: Entity>(&self, connection_string: &str) -> RepoResult<Repository<T>> {
        self.inner.repository::<T>(connection_string)
    }

    /// Forgets every cached context and repository. Open stores stay open
    /// for whoever still holds them.
    pub fn clear(&self) {
        self.inner.repositories.clear();
        self.inner.contexts.clear();
    }
}

#[derive(Default)]
struct RepositoryFactoryInner {
    contexts: DashMap<String, StoreContext>,
    repositories: DashMap<(String, TypeId), Box<dyn Any + Send + Sync>>,
}

impl RepositoryFactoryInner {
    fn context(&self, connection_string: &str) -> RepoResult<StoreContext> {
        let key = connection_string.trim().to_string();
        if let Some(context) = self.contexts.get(&key) {
            return Ok(context.clone());
        }

        match self.contexts.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Ok(entry.get().clone()),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let context = StoreContext::open(entry.key())?;
                entry.insert(context.clone());
                Ok(context)
            }
        }
    }

    fn repository<T: Entity>(&self, connection_string: &str) -> RepoResult<Repository<T>> {
        let key = (connection_string.trim().to_string(), TypeId::of::<T>());
        if let Some(cached) = self.repositories.get(&key) {
            return downcast::<T>(cached.value().as_ref());
        }

        let context = self.context(connection_string)?;
        let entry = self
            .repositories
            .entry(key)
            .or_try_insert_with(|| -> RepoResult<Box<dyn Any + Send + Sync>> {
                log::debug!("Creating repository for {}", T::type_name());
                Ok(Box::new(Repository::<T>::new(&context)?))
            })?;
        downcast::<T>(entry.value().as_ref())
    }
}

fn downcast<T: Entity>(cached: &(dyn Any + Send + Sync)) -> RepoResult<Repository<T>> {
    cached.downcast_ref::<Repository<T>>().cloned().ok_or_else(|| {
        log::error!("Cached repository for {} has an unexpected type", T::type_name());
        RepoError::new(
            &format!("Cached repository for {} has an unexpected type", T::type_name()),
            ErrorKind::InternalError,
        )
    })
}
