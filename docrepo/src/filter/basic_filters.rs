use std::{any::Any, fmt::Display};

use itertools::Itertools;
use regex::Regex;

use crate::{collection::Document, common::Value, errors::RepoResult};

use super::FilterProvider;

/// Matches every document.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> RepoResult<bool> {
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Matches no document.
pub(crate) struct NoneFilter;

impl FilterProvider for NoneFilter {
    fn apply(&self, _entry: &Document) -> RepoResult<bool> {
        Ok(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for NoneFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NoneFilter")
    }
}

/// Matches documents where a field equals a value. A missing field reads as
/// `null`, so `eq(Value::Null)` also matches documents without the field.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok(entry.get(&self.field_name) == self.field_value)
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Value,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for NotEqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok(entry.get(&self.field_name) != self.field_value)
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonMode::Greater => write!(f, ">"),
            ComparisonMode::GreaterEqual => write!(f, ">="),
            ComparisonMode::Lesser => write!(f, "<"),
            ComparisonMode::LesserEqual => write!(f, "<="),
        }
    }
}

/// Ordered comparison of a field against a value.
///
/// Never matches a `null` field, and never matches across value families
/// (a string is neither greater nor lesser than a number).
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Value,
    mode: ComparisonMode,
}

impl ComparisonFilter {
    pub(crate) fn new(field_name: String, field_value: Value, mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            mode,
        }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.mode, self.field_value)
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        let value = entry.get(&self.field_name);
        if value.is_null() || !value.same_kind(&self.field_value) {
            return Ok(false);
        }

        let ordering = value.cmp(&self.field_value);
        Ok(match self.mode {
            ComparisonMode::Greater => ordering.is_gt(),
            ComparisonMode::GreaterEqual => ordering.is_ge(),
            ComparisonMode::Lesser => ordering.is_lt(),
            ComparisonMode::LesserEqual => ordering.is_le(),
        })
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Matches when the field equals any of the values.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl InFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.field_name, self.field_values.iter().join(", "))
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(self.field_values.contains(&value))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct NotInFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl NotInFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        NotInFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} not in [{}])", self.field_name, self.field_values.iter().join(", "))
    }
}

impl FilterProvider for NotInFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(!self.field_values.contains(&value))
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Matches string fields against a compiled regular expression.
pub(crate) struct RegexFilter {
    field_name: String,
    pattern: Regex,
}

impl RegexFilter {
    pub(crate) fn new(field_name: String, pattern: &str) -> RepoResult<Self> {
        let pattern = Regex::new(pattern).map_err(|err| {
            log::error!("Invalid regex pattern '{}' for field {}: {}", pattern, field_name, err);
            err
        })?;
        Ok(RegexFilter {
            field_name,
            pattern,
        })
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} =~ /{}/)", self.field_name, self.pattern)
    }
}

impl FilterProvider for RegexFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        match entry.get(&self.field_name) {
            Value::String(text) => Ok(self.pattern.is_match(&text)),
            _ => Ok(false),
        }
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Matches documents that carry (or lack) a non-null value for the field.
pub(crate) struct ExistsFilter {
    field_name: String,
    exists: bool,
}

impl ExistsFilter {
    pub(crate) fn new(field_name: String, exists: bool) -> Self {
        ExistsFilter { field_name, exists }
    }
}

impl Display for ExistsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exists {
            write!(f, "({} exists)", self.field_name)
        } else {
            write!(f, "({} not exists)", self.field_name)
        }
    }
}

impl FilterProvider for ExistsFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok(entry.get(&self.field_name).is_null() != self.exists)
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::errors::ErrorKind;

    #[test]
    fn test_equals_filter() {
        let doc = doc! { a: 1, b: "x" };
        let filter = EqualsFilter::new("a".to_string(), Value::I64(1));
        assert!(filter.apply(&doc).unwrap());
        let filter = EqualsFilter::new("b".to_string(), Value::from("y"));
        assert!(!filter.apply(&doc).unwrap());
    }

    #[test]
    fn test_equals_null_matches_missing_field() {
        let filter = EqualsFilter::new("missing".to_string(), Value::Null);
        assert!(filter.apply(&doc! { a: 1 }).unwrap());
    }

    #[test]
    fn test_not_equals_filter() {
        let doc = doc! { a: 1 };
        assert!(NotEqualsFilter::new("a".to_string(), Value::I32(2)).apply(&doc).unwrap());
        assert!(!NotEqualsFilter::new("a".to_string(), Value::I32(1)).apply(&doc).unwrap());
    }

    #[test]
    fn test_comparison_filter() {
        let doc = doc! { n: 5 };
        let cmp = |mode, v: i32| {
            ComparisonFilter::new("n".to_string(), Value::I32(v), mode)
                .apply(&doc)
                .unwrap()
        };
        assert!(cmp(ComparisonMode::Greater, 4));
        assert!(!cmp(ComparisonMode::Greater, 5));
        assert!(cmp(ComparisonMode::GreaterEqual, 5));
        assert!(cmp(ComparisonMode::Lesser, 6));
        assert!(!cmp(ComparisonMode::Lesser, 5));
        assert!(cmp(ComparisonMode::LesserEqual, 5));
    }

    #[test]
    fn test_comparison_filter_ignores_null_and_other_kinds() {
        let doc = doc! { s: "abc" };
        let filter = ComparisonFilter::new("s".to_string(), Value::I32(1), ComparisonMode::Greater);
        assert!(!filter.apply(&doc).unwrap());
        let filter = ComparisonFilter::new("missing".to_string(), Value::I32(1), ComparisonMode::Lesser);
        assert!(!filter.apply(&doc).unwrap());
    }

    #[test]
    fn test_comparison_across_numeric_widths() {
        let doc = doc! { n: 2.5 };
        let filter = ComparisonFilter::new("n".to_string(), Value::I64(2), ComparisonMode::Greater);
        assert!(filter.apply(&doc).unwrap());
    }

    #[test]
    fn test_in_and_not_in() {
        let doc = doc! { role: "admin" };
        let values = vec![Value::from("admin"), Value::from("ops")];
        assert!(InFilter::new("role".to_string(), values.clone()).apply(&doc).unwrap());
        assert!(!NotInFilter::new("role".to_string(), values).apply(&doc).unwrap());
        assert!(!InFilter::new("role".to_string(), vec![]).apply(&doc).unwrap());
    }

    #[test]
    fn test_regex_filter() {
        let doc = doc! { email: "alice@example.com", n: 1 };
        let filter = RegexFilter::new("email".to_string(), "^alice@").unwrap();
        assert!(filter.apply(&doc).unwrap());
        let filter = RegexFilter::new("n".to_string(), "1").unwrap();
        assert!(!filter.apply(&doc).unwrap());
    }

    #[test]
    fn test_regex_filter_invalid_pattern() {
        let err = RegexFilter::new("email".to_string(), "(unclosed").err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn test_exists_filter() {
        let doc = doc! { a: 1 };
        assert!(ExistsFilter::new("a".to_string(), true).apply(&doc).unwrap());
        assert!(!ExistsFilter::new("b".to_string(), true).apply(&doc).unwrap());
        assert!(ExistsFilter::new("b".to_string(), false).apply(&doc).unwrap());
    }
}
