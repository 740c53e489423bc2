use crate::collection::{Document, ObjectId};
use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use std::any::Any;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use super::{AllFilter, AndFilter, EqualsFilter, NoneFilter, NotFilter, OrFilter};

/// A predicate over documents, evaluated by the store.
///
/// Implementations must be cheap to share across threads; [Filter] wraps them
/// in an `Arc`.
pub trait FilterProvider: Any + Send + Sync + Display {
    /// Returns whether `entry` satisfies the filter.
    fn apply(&self, entry: &Document) -> RepoResult<bool>;

    /// Child filters of a logical filter.
    fn logical_filters(&self) -> RepoResult<Vec<Filter>> {
        Err(RepoError::new(
            "Filter is not a logical filter",
            ErrorKind::FilterError,
        ))
    }

    /// Field the filter reads, for field filters.
    fn field_name(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a [FilterProvider].
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter { inner: Arc::new(inner) }
    }

    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

/// Matches no document.
pub fn none() -> Filter {
    Filter::new(NoneFilter)
}

/// Matches the document whose `_id` equals `id`.
pub fn by_id(id: ObjectId) -> Filter {
    Filter::new(EqualsFilter::new(DOC_ID.to_string(), Value::ObjectId(id)))
}

/// Matches documents whose `_id` is any of `ids`.
pub fn by_ids(ids: Vec<ObjectId>) -> Filter {
    super::field(DOC_ID).in_array(ids.into_iter().map(Value::ObjectId).collect())
}

/// Conjunction; an empty list matches every document.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Disjunction; an empty list matches no document.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}

pub fn is_all_filter(filter: &Filter) -> bool {
    filter.as_any().is::<AllFilter>()
}

pub fn is_and_filter(filter: &Filter) -> bool {
    filter.as_any().is::<AndFilter>()
}

pub fn is_or_filter(filter: &Filter) -> bool {
    filter.as_any().is::<OrFilter>()
}
