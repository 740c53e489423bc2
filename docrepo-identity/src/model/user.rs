use chrono::{DateTime, Utc};
use docrepo::collection::ObjectId;
use docrepo_derive::{Convertible, Entity};

/// A user account.
///
/// Normalized names and emails are the lookup keys; callers are expected to
/// normalize them (usually upper-casing) before storing and before lookup.
/// The concurrency stamp changes on every write through the user store.
#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
pub struct IdentityUser {
    pub id: ObjectId,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: Option<String>,
    pub normalized_email: Option<String>,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
    pub security_stamp: Option<String>,
    pub concurrency_stamp: String,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
}

impl IdentityUser {
    /// A user named `user_name` with fresh security and concurrency stamps.
    pub fn new(user_name: &str) -> Self {
        IdentityUser {
            user_name: user_name.to_string(),
            security_stamp: Some(new_stamp()),
            concurrency_stamp: new_stamp(),
            ..Default::default()
        }
    }
}

pub(crate) fn new_stamp() -> String {
    uuid::Uuid::new_v4().to_string()
}
