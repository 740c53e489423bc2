use std::sync::Arc;

use super::{entity_from_document, entity_to_document, Criteria, Entity, EntityCursor};
use crate::collection::{id_codec, Collection, ObjectId};
use crate::context::StoreContext;
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::{by_id, by_ids, Filter, FilterComposer};

/// CRUD access to the collection of entity type `T`.
///
/// The repository is the only authority for identifiers: every insert
/// overwrites whatever id the caller put on the entity with a freshly
/// generated [ObjectId]. Updates replace the whole stored document and never
/// insert. Batches are applied document by document, so a failing batch can
/// leave a prefix written.
///
/// Cloning is cheap and clones share the same collection handle.
///
/// ```rust,ignore
/// let context = StoreContext::open("memory://local/app")?;
/// let users = Repository::<User>::new(&context)?;
///
/// let alice = users.insert(User { name: "alice".into(), ..Default::default() })?;
/// let found = users.find(Criteria::where_(|u: &User| u.name == "alice"))?;
/// assert_eq!(found.map(|u| u.id), Some(alice.id));
/// ```
pub struct Repository<T: Entity> {
    inner: Arc<RepositoryInner<T>>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Entity> Repository<T> {
    /// Binds a repository to `T`'s collection in `context`, creating the
    /// collection on first use.
    pub fn new(context: &StoreContext) -> RepoResult<Self> {
        let collection = context.collection::<T>()?;
        Ok(Repository {
            inner: Arc::new(RepositoryInner { collection }),
        })
    }

    pub fn collection_name(&self) -> &str {
        self.inner.collection.name()
    }

    /// Entities selected by `criteria`, as a lazily decoded snapshot.
    pub fn query(&self, criteria: Criteria<T>) -> RepoResult<EntityCursor<T>> {
        self.query_filter(criteria.to_filter())
    }

    /// Entities whose stored documents match `filter`.
    pub fn query_filter(&self, filter: Filter) -> RepoResult<EntityCursor<T>> {
        let documents = self.inner.collection.find(&filter)?;
        Ok(EntityCursor::new(documents))
    }

    /// Entities matching every filter produced by `composer`.
    pub fn query_all_of<S>(&self, composer: &FilterComposer<T, S>) -> RepoResult<EntityCursor<T>> {
        self.query_filter(composer.and())
    }

    /// Entities matching any filter produced by `composer`.
    pub fn query_any_of<S>(&self, composer: &FilterComposer<T, S>) -> RepoResult<EntityCursor<T>> {
        self.query_filter(composer.or())
    }

    /// The single entity selected by `criteria`.
    ///
    /// # Errors
    ///
    /// `MultipleMatches` when more than one entity is selected.
    pub fn find(&self, criteria: Criteria<T>) -> RepoResult<Option<T>> {
        self.find_filter(criteria.to_filter())
    }

    pub fn find_filter(&self, filter: Filter) -> RepoResult<Option<T>> {
        let mut documents = self.inner.collection.find(&filter)?;
        if documents.len() > 1 {
            log::error!(
                "Expected at most one match in {} for {}, found {}",
                self.collection_name(),
                filter,
                documents.len()
            );
            return Err(RepoError::new(
                &format!(
                    "Expected at most one match in {}, found {}",
                    self.collection_name(),
                    documents.len()
                ),
                ErrorKind::MultipleMatches,
            ));
        }

        match documents.pop() {
            Some(document) => Ok(Some(entity_from_document(&document)?)),
            None => Ok(None),
        }
    }

    /// Looks an entity up by its textual id. Blank text finds nothing.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifierFormat` when `id` is neither blank nor a valid id.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        let id = id_codec::decode(id)?;
        if id.is_empty() {
            return Ok(None);
        }
        self.find_filter(by_id(id))
    }

    /// Stores `entity` under a fresh id and returns it as stored.
    pub fn insert(&self, mut entity: T) -> RepoResult<T> {
        entity.set_id(ObjectId::new());
        let document = entity_to_document(&entity)?;
        self.inner.collection.insert_one(document)?;
        Ok(entity)
    }

    /// Stores every entity under a fresh id.
    ///
    /// All entities are converted before anything is written; a store failure
    /// part-way leaves the earlier entities stored.
    pub fn insert_many(&self, entities: Vec<T>) -> RepoResult<Vec<T>> {
        let mut stored = Vec::with_capacity(entities.len());
        let mut documents = Vec::with_capacity(entities.len());
        for mut entity in entities {
            entity.set_id(ObjectId::new());
            documents.push(entity_to_document(&entity)?);
            stored.push(entity);
        }

        if !documents.is_empty() {
            self.inner.collection.insert_many(documents)?;
        }
        Ok(stored)
    }

    /// Replaces the stored document with the same id. Returns the number of
    /// matched documents; 0 means nothing was written.
    pub fn update(&self, entity: &T) -> RepoResult<u64> {
        let document = entity_to_document(entity)?;
        let matched = self.inner.collection.replace_one(&by_id(entity.id()), document)?;
        if matched == 0 {
            log::debug!("Update of {} in {} matched nothing", entity.id(), self.collection_name());
        }
        Ok(matched)
    }

    pub fn update_many(&self, entities: &[T]) -> RepoResult<u64> {
        let mut matched = 0;
        for entity in entities {
            matched += self.update(entity)?;
        }
        Ok(matched)
    }

    /// Deletes by textual id. Text that is not a valid id deletes nothing
    /// and is not an error.
    pub fn delete_by_id(&self, id: &str) -> RepoResult<u64> {
        match id_codec::try_decode(id) {
            Some(id) => self.inner.collection.delete_one(&by_id(id)),
            None => {
                log::debug!("Ignoring delete in {} for unparsable id '{}'", self.collection_name(), id);
                Ok(0)
            }
        }
    }

    pub fn delete(&self, entity: &T) -> RepoResult<u64> {
        self.inner.collection.delete_one(&by_id(entity.id()))
    }

    pub fn delete_many(&self, entities: &[T]) -> RepoResult<u64> {
        if entities.is_empty() {
            return Ok(0);
        }
        let ids = entities.iter().map(|entity| entity.id()).collect();
        self.inner.collection.delete_many(&by_ids(ids))
    }

    pub fn count(&self, criteria: Criteria<T>) -> RepoResult<u64> {
        self.inner.collection.count(&criteria.to_filter())
    }
}

struct RepositoryInner<T> {
    collection: Collection<T>,
}
