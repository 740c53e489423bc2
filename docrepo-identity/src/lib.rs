//! # docrepo_identity - identity persistence on docrepo
//!
//! Users, roles, claims, external logins and tokens, each kept in its own
//! collection and reached through typed repositories. [UserStore] and
//! [RoleStore] expose the operations an identity framework needs; both are
//! async and take a `CancellationToken`.
//!
//! ```rust,ignore
//! use docrepo_identity::{IdentityContext, IdentityRole, IdentityUser, RoleStore, UserStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let context = IdentityContext::open("memory://local/identity")?;
//! let users = UserStore::new(&context);
//! let roles = RoleStore::new(&context);
//! let token = CancellationToken::new();
//!
//! roles.create(IdentityRole::new("Admin"), &token).await?;
//! let alice = users.create(IdentityUser::new("alice"), &token).await?;
//! users.add_to_role(&alice, "ADMIN", &token).await?;
//! assert!(users.is_in_role(&alice, "ADMIN", &token).await?);
//! ```
//!
//! Nothing cascades: deleting a user or role leaves its claims, logins,
//! tokens and memberships in place.

mod claim_store;
mod context;
mod guard;
pub mod model;
mod role_store;
mod user_store;

pub use claim_store::*;
pub use context::*;
pub use model::*;
pub use role_store::*;
pub use user_store::*;

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
