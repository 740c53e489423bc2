use std::marker::PhantomData;

use super::{and, or, Filter};

type Member<S> = Box<dyn Fn(&S) -> Option<Filter> + Send + Sync>;

/// Builds a compound filter for entity type `E` out of a source object `S`
/// (typically a search form), from an ordered list of registered members.
///
/// Each member looks at the source and either contributes a [Filter] or
/// nothing. Members are evaluated in registration order.
///
/// ```rust,ignore
/// let composer = FilterComposer::<User, UserSearch>::builder(search)
///     .member(|s| s.name.as_ref().map(|n| field("user_name").eq(n.as_str())))
///     .member(|s| s.min_age.map(|a| field("age").gte(a)))
///     .build();
///
/// let users = repository.query_filter(composer.and())?;
/// ```
pub struct FilterComposer<E, S> {
    source: S,
    members: Vec<Member<S>>,
    _marker: PhantomData<fn() -> E>,
}

impl<E, S> FilterComposer<E, S> {
    pub fn builder(source: S) -> FilterComposerBuilder<E, S> {
        FilterComposerBuilder {
            source,
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Evaluates every member in registration order, keeping the filters
    /// that were produced.
    pub fn predicate_list(&self) -> Vec<Filter> {
        self.members
            .iter()
            .filter_map(|member| member(&self.source))
            .collect()
    }

    /// Conjunction of [Self::predicate_list]. Matches every document when no
    /// member produced a filter.
    pub fn and(&self) -> Filter {
        and(self.predicate_list())
    }

    /// Disjunction of [Self::predicate_list]. Matches no document when no
    /// member produced a filter.
    pub fn or(&self) -> Filter {
        or(self.predicate_list())
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

pub struct FilterComposerBuilder<E, S> {
    source: S,
    members: Vec<Member<S>>,
    _marker: PhantomData<fn() -> E>,
}

impl<E, S> FilterComposerBuilder<E, S> {
    /// Registers a predicate-producing member.
    pub fn member<F>(mut self, member: F) -> Self
    where
        F: Fn(&S) -> Option<Filter> + Send + Sync + 'static,
    {
        self.members.push(Box::new(member));
        self
    }

    pub fn build(self) -> FilterComposer<E, S> {
        FilterComposer {
            source: self.source,
            members: self.members,
            _marker: PhantomData,
        }
    }
}
