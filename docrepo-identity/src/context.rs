use std::sync::Arc;

use docrepo::context::StoreContext;
use docrepo::errors::RepoResult;
use docrepo::repository::Repository;

use crate::model::{
    IdentityRole, IdentityRoleClaim, IdentityUser, IdentityUserClaim, IdentityUserLogin, IdentityUserRole,
    IdentityUserToken,
};

/// The identity collections of one store: users, roles and the rows
/// linking them to claims, logins and tokens.
///
/// ```rust,ignore
/// let context = IdentityContext::open("memory://local/identity")?;
/// let users = UserStore::new(&context);
/// let roles = RoleStore::new(&context);
/// ```
#[derive(Clone)]
pub struct IdentityContext {
    inner: Arc<IdentityContextInner>,
}

impl IdentityContext {
    /// Opens a store context for `connection_string` and resolves every
    /// identity repository on it.
    pub fn open(connection_string: &str) -> RepoResult<IdentityContext> {
        let store = StoreContext::open(connection_string)?;
        IdentityContext::new(&store)
    }

    pub fn new(store: &StoreContext) -> RepoResult<IdentityContext> {
        let inner = IdentityContextInner {
            store: store.clone(),
            users: store.repository()?,
            roles: store.repository()?,
            user_claims: store.repository()?,
            user_roles: store.repository()?,
            user_logins: store.repository()?,
            user_tokens: store.repository()?,
            role_claims: store.repository()?,
        };
        log::debug!("Identity context ready on database {}", store.database_name());
        Ok(IdentityContext { inner: Arc::new(inner) })
    }

    pub fn store(&self) -> &StoreContext {
        &self.inner.store
    }

    pub fn users(&self) -> &Repository<IdentityUser> {
        &self.inner.users
    }

    pub fn roles(&self) -> &Repository<IdentityRole> {
        &self.inner.roles
    }

    pub fn user_claims(&self) -> &Repository<IdentityUserClaim> {
        &self.inner.user_claims
    }

    pub fn user_roles(&self) -> &Repository<IdentityUserRole> {
        &self.inner.user_roles
    }

    pub fn user_logins(&self) -> &Repository<IdentityUserLogin> {
        &self.inner.user_logins
    }

    pub fn user_tokens(&self) -> &Repository<IdentityUserToken> {
        &self.inner.user_tokens
    }

    pub fn role_claims(&self) -> &Repository<IdentityRoleClaim> {
        &self.inner.role_claims
    }
}

struct IdentityContextInner {
    store: StoreContext,
    users: Repository<IdentityUser>,
    roles: Repository<IdentityRole>,
    user_claims: Repository<IdentityUserClaim>,
    user_roles: Repository<IdentityUserRole>,
    user_logins: Repository<IdentityUserLogin>,
    user_tokens: Repository<IdentityUserToken>,
    role_claims: Repository<IdentityRoleClaim>,
}
