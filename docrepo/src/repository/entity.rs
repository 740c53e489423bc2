use crate::collection::{Document, ObjectId};
use crate::common::{bare_type_name, Convertible, Value, DEFAULT_ENTITY_ID_FIELD, DOC_ID};
use crate::errors::{ErrorKind, RepoError, RepoResult};

/// A record type stored in its own collection.
///
/// Every entity carries one [ObjectId] field, its identifier. The repository
/// assigns it on insert and writes it under the document key `_id`.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Default, Clone, Convertible, Entity)]
/// #[entity(collection = "accounts", id(field = "account_id"))]
/// struct Account {
///     account_id: ObjectId,
///     owner: String,
/// }
/// ```
pub trait Entity: Convertible<Output = Self> + Default + Clone + Send + Sync + 'static {
    /// Name the collection name is derived from.
    fn type_name() -> String {
        bare_type_name(std::any::type_name::<Self>())
    }

    /// Explicit collection name, used verbatim instead of the derived one.
    fn collection_override() -> Option<&'static str> {
        None
    }

    /// Name of the identifier field in the entity's own representation.
    fn id_field() -> &'static str {
        DEFAULT_ENTITY_ID_FIELD
    }

    fn id(&self) -> ObjectId;

    fn set_id(&mut self, id: ObjectId);
}

/// Converts an entity to its stored form, moving the id field to `_id`.
pub fn entity_to_document<T: Entity>(entity: &T) -> RepoResult<Document> {
    let mut document = match entity.to_value()? {
        Value::Document(document) => document,
        other => {
            log::error!("Entity {} converted to {} instead of a document", T::type_name(), other);
            return Err(RepoError::new(
                &format!("Entity {} did not convert to a document", T::type_name()),
                ErrorKind::ObjectMappingError,
            ));
        }
    };

    if T::id_field() != DOC_ID {
        document.remove(T::id_field());
    }
    document.set_id(entity.id());
    Ok(document)
}

/// Rebuilds an entity from its stored form.
pub fn entity_from_document<T: Entity>(document: &Document) -> RepoResult<T> {
    let mut document = document.clone();
    if T::id_field() != DOC_ID {
        let id = document.remove(DOC_ID).unwrap_or(Value::Null);
        document.insert_raw(T::id_field(), id);
    }
    T::from_value(&Value::Document(document))
}
