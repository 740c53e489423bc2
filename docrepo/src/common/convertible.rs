use crate::collection::{Document, ObjectId};
use crate::common::Value;
use crate::errors::{ErrorKind, RepoError, RepoResult};
use chrono::{DateTime, Utc};

/// Two-way mapping between a Rust type and a [Value].
///
/// Entities are stored as `Value::Document`; `#[derive(Convertible)]` from
/// `docrepo_derive` generates the field-by-field mapping for structs.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> RepoResult<Value>;
    fn from_value(value: &Value) -> RepoResult<Self::Output>;
}

fn mapping_error(value: &Value, expected: &str) -> RepoError {
    log::error!("Value {} is not {}", value, expected);
    RepoError::new(
        &format!("Value is not {}", expected),
        ErrorKind::ObjectMappingError,
    )
}

macro_rules! integer_convertible {
    ($t:ty, $variant:ident, $name:literal) => {
        impl Convertible for $t {
            type Output = $t;

            fn to_value(&self) -> RepoResult<Value> {
                Ok(Value::$variant((*self).into()))
            }

            fn from_value(value: &Value) -> RepoResult<Self::Output> {
                value
                    .as_integer()
                    .and_then(|i| <$t>::try_from(i).ok())
                    .ok_or_else(|| mapping_error(value, $name))
            }
        }
    };
}

integer_convertible!(i32, I32, "an i32");
integer_convertible!(i64, I64, "an i64");
integer_convertible!(u32, I64, "a u32");
integer_convertible!(u64, U64, "a u64");

impl Convertible for usize {
    type Output = usize;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::U64(*self as u64))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        value
            .as_integer()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| mapping_error(value, "a usize"))
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        value.as_decimal().ok_or_else(|| mapping_error(value, "an f64"))
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mapping_error(value, "a bool")),
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mapping_error(value, "a string")),
        }
    }
}

impl Convertible for ObjectId {
    type Output = ObjectId;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::ObjectId(*self))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::ObjectId(id) => Ok(*id),
            // ids of entities that were never stored
            Value::Null => Ok(ObjectId::EMPTY),
            _ => Err(mapping_error(value, "an object id")),
        }
    }
}

impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::DateTime(*self))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            _ => Err(mapping_error(value, "a date time")),
        }
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::Document(doc) => Ok(doc.clone()),
            _ => Err(mapping_error(value, "a document")),
        }
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> RepoResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible,
{
    type Output = Vec<T::Output>;

    fn to_value(&self) -> RepoResult<Value> {
        let mut values = Vec::with_capacity(self.len());
        for item in self {
            values.push(item.to_value()?);
        }
        Ok(Value::Array(values))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            // absent list fields read back as empty
            Value::Null => Ok(Vec::new()),
            _ => Err(mapping_error(value, "an array")),
        }
    }
}

pub fn from_value<T>(value: &Value) -> RepoResult<T::Output>
where
    T: Convertible,
{
    T::from_value(value)
}

pub fn to_value<T>(data: &T) -> RepoResult<Value>
where
    T: Convertible,
{
    data.to_value()
}
