use indexmap::IndexMap;

use crate::collection::{Document, ObjectId};
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::Filter;

/// Documents of one collection in insertion order, keyed by `_id`.
///
/// Filters are evaluated on a snapshot taken under the read lock and never
/// while a lock is held, so a filter may call back into the store. Writes
/// then take the write lock once and apply by id.
#[derive(Clone)]
pub(crate) struct InMemoryCollection {
    name: String,
    documents: Atomic<IndexMap<ObjectId, Document>>,
}

impl InMemoryCollection {
    pub(crate) fn new(name: &str) -> Self {
        InMemoryCollection {
            name: name.to_string(),
            documents: atomic(IndexMap::new()),
        }
    }

    pub(crate) fn find(&self, filter: &Filter) -> RepoResult<Vec<Document>> {
        let mut result = Vec::new();
        for doc in self.snapshot() {
            if filter.apply(&doc)? {
                result.push(doc);
            }
        }
        Ok(result)
    }

    pub(crate) fn count(&self, filter: &Filter) -> RepoResult<u64> {
        let mut count = 0u64;
        for doc in self.snapshot() {
            if filter.apply(&doc)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn snapshot(&self) -> Vec<Document> {
        self.documents.read_with(|docs| docs.values().cloned().collect())
    }

    pub(crate) fn insert(&self, document: Document) -> RepoResult<()> {
        let id = match document.id() {
            Some(id) if !id.is_empty() => id,
            _ => {
                log::error!("Cannot insert a document without an id into {}", self.name);
                return Err(RepoError::new(
                    &format!("Cannot insert a document without an id into {}", self.name),
                    ErrorKind::InvalidOperation,
                ));
            }
        };

        self.documents.write_with(|docs| {
            if docs.contains_key(&id) {
                log::error!("Duplicate id {} in collection {}", id, self.name);
                return Err(RepoError::new(
                    &format!("Duplicate id {} in collection {}", id, self.name),
                    ErrorKind::DuplicateKey,
                ));
            }
            docs.insert(id, document);
            Ok(())
        })
    }

    pub(crate) fn replace_one(&self, filter: &Filter, mut document: Document) -> RepoResult<u64> {
        let target = match self.matching_ids(filter, true)?.first() {
            Some(id) => *id,
            None => return Ok(0),
        };

        document.set_id(target);
        self.documents.write_with(|docs| {
            // removed by another writer since the snapshot
            if !docs.contains_key(&target) {
                return Ok(0);
            }
            docs.insert(target, document);
            Ok(1)
        })
    }

    pub(crate) fn delete(&self, filter: &Filter, just_once: bool) -> RepoResult<u64> {
        let targets = self.matching_ids(filter, just_once)?;
        if targets.is_empty() {
            return Ok(0);
        }

        self.documents.write_with(|docs| {
            let removed = targets
                .iter()
                .filter(|id| docs.shift_remove(*id).is_some())
                .count();
            Ok(removed as u64)
        })
    }

    fn matching_ids(&self, filter: &Filter, just_once: bool) -> RepoResult<Vec<ObjectId>> {
        let mut ids = Vec::new();
        for doc in self.snapshot() {
            if filter.apply(&doc)? {
                if let Some(id) = doc.id() {
                    ids.push(id);
                }
                if just_once {
                    break;
                }
            }
        }
        Ok(ids)
    }

    pub(crate) fn size(&self) -> usize {
        self.documents.read_with(|docs| docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;
    use crate::doc;
    use crate::filter::{all, by_id, field};

    fn document(n: i32) -> Document {
        let mut doc = doc! { n: n };
        doc.set_id(ObjectId::new());
        doc
    }

    #[test]
    fn test_insert_and_find_in_order() {
        let collection = InMemoryCollection::new("numbers");
        for n in 1..=3 {
            collection.insert(document(n)).unwrap();
        }
        let found = collection.find(&all()).unwrap();
        let values: Vec<Value> = found.iter().map(|d| d.get("n")).collect();
        assert_eq!(values, vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
        assert_eq!(collection.count(&field("n").gt(1)).unwrap(), 2);
    }

    #[test]
    fn test_insert_requires_id() {
        let collection = InMemoryCollection::new("numbers");
        let err = collection.insert(doc! { n: 1 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_insert_duplicate_id() {
        let collection = InMemoryCollection::new("numbers");
        let doc = document(1);
        collection.insert(doc.clone()).unwrap();
        let err = collection.insert(doc).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
        assert_eq!(collection.size(), 1);
    }

    #[test]
    fn test_replace_keeps_id() {
        let collection = InMemoryCollection::new("numbers");
        let doc = document(1);
        let id = doc.id().unwrap();
        collection.insert(doc).unwrap();

        let mut replacement = doc! { n: 10 };
        replacement.set_id(ObjectId::new());
        assert_eq!(collection.replace_one(&by_id(id), replacement).unwrap(), 1);

        let found = collection.find(&by_id(id)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("n"), Value::I32(10));
        assert_eq!(found[0].id(), Some(id));
    }

    #[test]
    fn test_replace_without_match_is_noop() {
        let collection = InMemoryCollection::new("numbers");
        collection.insert(document(1)).unwrap();
        assert_eq!(collection.replace_one(&by_id(ObjectId::new()), doc! { n: 5 }).unwrap(), 0);
        assert_eq!(collection.size(), 1);
    }

    #[test]
    fn test_delete_once_and_many() {
        let collection = InMemoryCollection::new("numbers");
        for _ in 0..3 {
            collection.insert(document(7)).unwrap();
        }
        assert_eq!(collection.delete(&field("n").eq(7), true).unwrap(), 1);
        assert_eq!(collection.size(), 2);
        assert_eq!(collection.delete(&field("n").eq(7), false).unwrap(), 2);
        assert_eq!(collection.size(), 0);
        assert_eq!(collection.delete(&all(), false).unwrap(), 0);
    }
}
