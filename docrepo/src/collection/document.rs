use crate::collection::ObjectId;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use im::OrdMap;
use itertools::Itertools;
use std::borrow::Cow;
use std::fmt::{Debug, Display};

/// A schemaless record: an ordered map of field names to [Value]s.
///
/// Backed by a persistent map, so clones are cheap and mutations share
/// structure with the original. Field names containing `.` address embedded
/// documents (`"address.city"`).
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Puts a value under `key`, creating embedded documents along a dotted path.
    ///
    /// # Errors
    ///
    /// * `InvalidOperation` if the key is empty
    /// * `InvalidOperation` if `_id` is set to anything other than an object id
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> RepoResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(RepoError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key == DOC_ID && !value.is_object_id() {
            log::error!("Document id must be an object id, found {}", value);
            return Err(RepoError::new(
                "Document id must be an object id",
                ErrorKind::InvalidOperation,
            ));
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data = self.data.update(key.into_owned(), value);
            Ok(())
        }
    }

    /// Returns the value under `key`, or `Value::Null` if absent.
    pub fn get(&self, key: &str) -> Value {
        match self.data.get(key) {
            Some(value) => value.clone(),
            None if key.contains(FIELD_SEPARATOR) => self.deep_get(key),
            None => Value::Null,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.get(key).cloned();
        if removed.is_some() {
            self.data = self.data.without(key);
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Top-level field names in key order.
    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// The `_id` of the document, if it has one.
    pub fn id(&self) -> Option<ObjectId> {
        self.data.get(DOC_ID).and_then(|v| v.as_object_id()).copied()
    }

    pub fn set_id(&mut self, id: ObjectId) {
        self.data = self.data.update(DOC_ID.to_string(), Value::ObjectId(id));
    }

    #[doc(hidden)]
    pub fn insert_raw(&mut self, key: &str, value: Value) {
        self.data = self.data.update(key.to_string(), value);
    }

    fn deep_put(&mut self, path: &[&str], value: Value) -> RepoResult<()> {
        if path.iter().any(|segment| segment.is_empty()) {
            log::error!("Invalid embedded field path {}", path.join(FIELD_SEPARATOR));
            return Err(RepoError::new(
                &format!("Invalid embedded field path {}", path.join(FIELD_SEPARATOR)),
                ErrorKind::InvalidOperation,
            ));
        }

        let (head, rest) = (path[0], &path[1..]);
        if rest.is_empty() {
            self.data = self.data.update(head.to_string(), value);
            return Ok(());
        }

        let mut child = match self.data.get(head) {
            Some(Value::Document(doc)) => doc.clone(),
            _ => Document::new(),
        };
        child.deep_put(rest, value)?;
        self.data = self.data.update(head.to_string(), Value::Document(child));
        Ok(())
    }

    fn deep_get(&self, key: &str) -> Value {
        let mut current = Value::Document(self.clone());
        for segment in key.split(FIELD_SEPARATOR) {
            current = match current {
                Value::Document(doc) => match doc.data.get(segment) {
                    Some(value) => value.clone(),
                    None => return Value::Null,
                },
                Value::Array(items) => match segment.parse::<usize>() {
                    Ok(index) if index < items.len() => items[index].clone(),
                    _ => return Value::Null,
                },
                _ => return Value::Null,
            };
        }
        current
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = self
            .data
            .iter()
            .map(|(key, value)| format!("\"{}\": {}", key, value))
            .join(", ");
        write!(f, "{{{}}}", body)
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust,ignore
/// use docrepo::doc;
///
/// let user = doc!{
///     user_name: "alice",
///     "normalized_user_name": "ALICE",
///     address: { city: "Oslo" },
///     tags: ["a", "b"],
///     score: (40 + 2),
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.insert_raw(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro converting values for [doc!].
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
