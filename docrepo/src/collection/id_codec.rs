//! Conversions between textual identifiers and [ObjectId].
//!
//! Blank input is not an error: [decode] maps it to [ObjectId::EMPTY] and
//! [decode_optional] maps it to `None`, so callers can tell an absent value
//! from an explicitly empty one.

use super::ObjectId;
use crate::errors::RepoResult;

/// Decodes `text` into an [ObjectId].
///
/// # Returns
///
/// * `Ok(ObjectId::EMPTY)` for empty or whitespace-only input
/// * `Err` of kind `InvalidIdentifierFormat` for any other text that is not
///   24 hex characters
pub fn decode(text: &str) -> RepoResult<ObjectId> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(ObjectId::EMPTY);
    }
    ObjectId::parse_str(trimmed)
}

/// Decodes every element, failing on the first invalid one.
pub fn decode_many<I, S>(texts: I) -> RepoResult<Vec<ObjectId>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts.into_iter().map(|text| decode(text.as_ref())).collect()
}

/// Like [decode], but blank input yields `None` instead of the empty sentinel.
pub fn decode_optional(text: &str) -> RepoResult<Option<ObjectId>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    decode(text).map(Some)
}

/// Strict parse that never fails loudly: `None` for blank or invalid text.
pub fn try_decode(text: &str) -> Option<ObjectId> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    ObjectId::parse_hex(trimmed)
}
