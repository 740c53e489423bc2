use std::any::Any;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{entity_from_document, Entity};
use crate::collection::Document;
use crate::errors::RepoResult;
use crate::filter::{all, Filter, FilterProvider};

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Selects entities for queries: everything, or those satisfying a typed
/// predicate.
pub enum Criteria<T> {
    All,
    Where(Predicate<T>),
}

impl<T> Clone for Criteria<T> {
    fn clone(&self) -> Self {
        match self {
            Criteria::All => Criteria::All,
            Criteria::Where(predicate) => Criteria::Where(predicate.clone()),
        }
    }
}

impl<T> Default for Criteria<T> {
    fn default() -> Self {
        Criteria::All
    }
}

impl<T: Entity> Criteria<T> {
    /// Matches entities for which `predicate` holds. The predicate runs
    /// outside the store's locks and may use repositories of the same store.
    pub fn where_<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Criteria::Where(Arc::new(predicate))
    }

    pub fn matches(&self, entity: &T) -> bool {
        match self {
            Criteria::All => true,
            Criteria::Where(predicate) => predicate(entity),
        }
    }

    /// A store filter evaluating the predicate on each decoded entity.
    pub fn to_filter(&self) -> Filter {
        match self {
            Criteria::All => all(),
            Criteria::Where(predicate) => Filter::new(EntityPredicateFilter::<T> {
                predicate: predicate.clone(),
                _marker: PhantomData,
            }),
        }
    }
}

struct EntityPredicateFilter<T> {
    predicate: Predicate<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Display for EntityPredicateFilter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(where {})", std::any::type_name::<T>())
    }
}

impl<T: Entity> FilterProvider for EntityPredicateFilter<T> {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        let entity = entity_from_document::<T>(entry)?;
        Ok((self.predicate)(&entity))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
