use std::marker::PhantomData;

use crate::collection::Document;
use crate::errors::RepoResult;
use crate::filter::Filter;
use crate::store::DocumentStore;

/// Typed handle to one named collection of a store.
///
/// The type parameter only records which entity type the collection holds;
/// all calls go to the store as documents.
pub struct Collection<T> {
    name: String,
    store: DocumentStore,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            name: self.name.clone(),
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T> {
    pub(crate) fn new(name: &str, store: DocumentStore) -> Self {
        Collection {
            name: name.to_string(),
            store,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn find(&self, filter: &Filter) -> RepoResult<Vec<Document>> {
        self.store.find(&self.name, filter)
    }

    pub fn count(&self, filter: &Filter) -> RepoResult<u64> {
        self.store.count(&self.name, filter)
    }

    pub fn insert_one(&self, document: Document) -> RepoResult<()> {
        self.store.insert_one(&self.name, document)
    }

    pub fn insert_many(&self, documents: Vec<Document>) -> RepoResult<()> {
        self.store.insert_many(&self.name, documents)
    }

    pub fn replace_one(&self, filter: &Filter, document: Document) -> RepoResult<u64> {
        self.store.replace_one(&self.name, filter, document)
    }

    pub fn delete_one(&self, filter: &Filter) -> RepoResult<u64> {
        self.store.delete_one(&self.name, filter)
    }

    pub fn delete_many(&self, filter: &Filter) -> RepoResult<u64> {
        self.store.delete_many(&self.name, filter)
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name).finish()
    }
}
