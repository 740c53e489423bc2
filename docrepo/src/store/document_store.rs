use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use crate::collection::Document;
use crate::errors::RepoResult;
use crate::filter::Filter;

/// Operations a document store backend must provide.
///
/// A backend owns named collections of [Document]s keyed by their `_id`. It
/// guarantees atomicity for a single document write and nothing more:
/// batch calls may fail part-way with a prefix applied.
///
/// # Errors
///
/// Every method fails with `StoreAlreadyClosed` once [close](Self::close)
/// has been called. Backend-specific failures surface unchanged.
pub trait DocumentStoreProvider: Send + Sync {
    /// Human readable backend name and version.
    fn store_version(&self) -> RepoResult<String>;

    fn collection_names(&self) -> RepoResult<HashSet<String>>;

    fn has_collection(&self, name: &str) -> RepoResult<bool>;

    /// Creates an empty collection. Creating an existing collection is a no-op.
    fn create_collection(&self, name: &str) -> RepoResult<()>;

    fn drop_collection(&self, name: &str) -> RepoResult<()>;

    /// Snapshot of the documents matching `filter`, in insertion order.
    fn find(&self, collection: &str, filter: &Filter) -> RepoResult<Vec<Document>>;

    fn count(&self, collection: &str, filter: &Filter) -> RepoResult<u64>;

    /// Inserts one document, which must carry an `_id`.
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` if a document with the same `_id` exists
    /// * `InvalidOperation` if the document has no `_id`
    fn insert_one(&self, collection: &str, document: Document) -> RepoResult<()>;

    /// Inserts documents one at a time, stopping at the first failure.
    fn insert_many(&self, collection: &str, documents: Vec<Document>) -> RepoResult<()>;

    /// Replaces the first document matching `filter`, keeping its `_id`.
    /// Returns the number of matched documents (0 or 1).
    fn replace_one(&self, collection: &str, filter: &Filter, document: Document) -> RepoResult<u64>;

    /// Removes the first document matching `filter`. Returns 0 or 1.
    fn delete_one(&self, collection: &str, filter: &Filter) -> RepoResult<u64>;

    /// Removes every document matching `filter`.
    fn delete_many(&self, collection: &str, filter: &Filter) -> RepoResult<u64>;

    fn close(&self) -> RepoResult<()>;

    fn is_closed(&self) -> RepoResult<bool>;
}

/// Shared handle to a [DocumentStoreProvider].
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
