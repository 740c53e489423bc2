use std::marker::PhantomData;

use super::{entity_from_document, Entity};
use crate::collection::Document;
use crate::errors::RepoResult;

/// Single-pass iterator over a query result.
///
/// Holds a snapshot of the matching documents taken when the query ran and
/// decodes each one into `T` as it is reached.
pub struct EntityCursor<T> {
    documents: std::vec::IntoIter<Document>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityCursor<T> {
    pub(crate) fn new(documents: Vec<Document>) -> Self {
        EntityCursor {
            documents: documents.into_iter(),
            _phantom: PhantomData,
        }
    }

    /// Number of entities not yet consumed.
    pub fn size(&self) -> usize {
        self.documents.len()
    }

    /// Decodes every remaining entity, failing on the first bad document.
    pub fn to_vec(self) -> RepoResult<Vec<T>> {
        self.collect()
    }
}

impl<T: Entity> Iterator for EntityCursor<T> {
    type Item = RepoResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents
            .next()
            .map(|document| entity_from_document::<T>(&document))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

impl<T: Entity> ExactSizeIterator for EntityCursor<T> {}
