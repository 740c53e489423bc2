use crate::common::Value;
use crate::errors::RepoResult;

use super::{
    ComparisonFilter, ComparisonMode, EqualsFilter, ExistsFilter, Filter, InFilter,
    NotEqualsFilter, NotInFilter, RegexFilter,
};

/// Starts a filter on the named field.
///
/// # Arguments
///
/// * `field_name` - The field to filter on; dotted names address embedded documents
///
/// # Returns
///
/// A [FluentFilter] builder for that field
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// Builder for single-field filters.
///
/// Each method consumes the builder and returns a [Filter] that can be
/// passed to a repository query or combined with `and`/`or`.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals `value`.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    /// Matches documents where the field differs from `value`.
    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::Greater))
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::GreaterEqual))
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::Lesser))
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::LesserEqual))
    }

    /// Matches documents where the field equals any of `values`.
    pub fn in_array(self, values: Vec<Value>) -> Filter {
        Filter::new(InFilter::new(self.field_name, values))
    }

    /// Matches documents where the field equals none of `values`.
    pub fn not_in(self, values: Vec<Value>) -> Filter {
        Filter::new(NotInFilter::new(self.field_name, values))
    }

    /// Matches string fields against a regular expression.
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if `pattern` does not compile.
    pub fn regex(self, pattern: &str) -> RepoResult<Filter> {
        Ok(Filter::new(RegexFilter::new(self.field_name, pattern)?))
    }

    /// Matches documents that have a non-null value for the field.
    pub fn exists(self) -> Filter {
        Filter::new(ExistsFilter::new(self.field_name, true))
    }

    /// Matches documents whose field is absent or null.
    pub fn not_exists(self) -> Filter {
        Filter::new(ExistsFilter::new(self.field_name, false))
    }
}
