use std::sync::Arc;

use async_trait::async_trait;
use docrepo::collection::ObjectId;
use docrepo::errors::RepoResult;
use docrepo::filter::{field, Filter};
use tokio_util::sync::CancellationToken;

use crate::claim_store::ClaimStore;
use crate::context::IdentityContext;
use crate::guard::{require_id, require_text, StoreGuard};
use crate::model::{new_stamp, Claim, IdentityRole, IdentityRoleClaim};

/// Persistence for roles and their claims.
///
/// Checks cancellation, disposal and arguments in that order before any
/// repository call, like [UserStore](crate::UserStore).
#[derive(Clone)]
pub struct RoleStore {
    inner: Arc<RoleStoreInner>,
}

struct RoleStoreInner {
    context: IdentityContext,
    guard: StoreGuard,
}

impl RoleStore {
    pub fn new(context: &IdentityContext) -> Self {
        RoleStore {
            inner: Arc::new(RoleStoreInner {
                context: context.clone(),
                guard: StoreGuard::new("RoleStore"),
            }),
        }
    }

    pub fn context(&self) -> &IdentityContext {
        &self.inner.context
    }

    pub fn dispose(&self) {
        self.inner.guard.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.guard.is_disposed()
    }

    fn check_role(&self, role: &IdentityRole, token: &CancellationToken, operation: &str) -> RepoResult<()> {
        self.inner.guard.check(token, operation)?;
        require_id(role.id, "role")
    }

    pub async fn create(&self, role: IdentityRole, token: &CancellationToken) -> RepoResult<IdentityRole> {
        self.inner.guard.check(token, "create")?;
        self.inner.context.roles().insert_async(role, token).await
    }

    /// Writes `role` back under a fresh concurrency stamp.
    pub async fn update(&self, role: &mut IdentityRole, token: &CancellationToken) -> RepoResult<()> {
        self.check_role(role, token, "update")?;
        role.concurrency_stamp = new_stamp();
        self.inner.context.roles().update_async(role, token).await?;
        Ok(())
    }

    /// Deletes the role row; memberships and role claims are left as they are.
    pub async fn delete(&self, role: &IdentityRole, token: &CancellationToken) -> RepoResult<()> {
        self.check_role(role, token, "delete")?;
        self.inner.context.roles().delete_async(role, token).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, role_id: &str, token: &CancellationToken) -> RepoResult<Option<IdentityRole>> {
        self.inner.guard.check(token, "find_by_id")?;
        require_text(role_id, "role_id")?;
        self.inner.context.roles().find_by_id_async(role_id, token).await
    }

    pub async fn find_by_name(
        &self,
        normalized_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<Option<IdentityRole>> {
        self.inner.guard.check(token, "find_by_name")?;
        require_text(normalized_name, "normalized_name")?;
        self.inner
            .context
            .roles()
            .find_filter_async(field("normalized_name").eq(normalized_name), token)
            .await
    }

    pub fn get_role_id(&self, role: &IdentityRole, token: &CancellationToken) -> RepoResult<String> {
        self.inner.guard.check(token, "get_role_id")?;
        Ok(role.id.to_string())
    }

    pub fn get_role_name(&self, role: &IdentityRole, token: &CancellationToken) -> RepoResult<String> {
        self.inner.guard.check(token, "get_role_name")?;
        Ok(role.name.clone())
    }

    pub fn set_role_name(&self, role: &mut IdentityRole, name: &str, token: &CancellationToken) -> RepoResult<()> {
        self.inner.guard.check(token, "set_role_name")?;
        role.name = name.to_string();
        Ok(())
    }

    pub fn get_normalized_role_name(&self, role: &IdentityRole, token: &CancellationToken) -> RepoResult<String> {
        self.inner.guard.check(token, "get_normalized_role_name")?;
        Ok(role.normalized_name.clone())
    }

    pub fn set_normalized_role_name(
        &self,
        role: &mut IdentityRole,
        normalized_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.inner.guard.check(token, "set_normalized_role_name")?;
        role.normalized_name = normalized_name.to_string();
        Ok(())
    }

    fn claim_filter(role_id: ObjectId, claim: &Claim) -> Filter {
        field("role_id")
            .eq(role_id)
            .and(field("claim_type").eq(claim.claim_type.as_str()))
            .and(field("claim_value").eq(claim.value.as_str()))
    }

    pub async fn get_claims(&self, role: &IdentityRole, token: &CancellationToken) -> RepoResult<Vec<Claim>> {
        self.check_role(role, token, "get_claims")?;
        let rows = self
            .inner
            .context
            .role_claims()
            .query_filter_async(field("role_id").eq(role.id), token)
            .await?
            .to_vec()?;
        Ok(rows.iter().map(IdentityRoleClaim::to_claim).collect())
    }

    pub async fn add_claim(&self, role: &IdentityRole, claim: &Claim, token: &CancellationToken) -> RepoResult<()> {
        self.check_role(role, token, "add_claim")?;
        require_text(&claim.claim_type, "claim")?;
        self.inner
            .context
            .role_claims()
            .insert_async(IdentityRoleClaim::new(role.id, claim), token)
            .await?;
        Ok(())
    }

    pub async fn remove_claim(&self, role: &IdentityRole, claim: &Claim, token: &CancellationToken) -> RepoResult<()> {
        self.check_role(role, token, "remove_claim")?;
        let role_claims = self.inner.context.role_claims();
        let rows = role_claims
            .query_filter_async(Self::claim_filter(role.id, claim), token)
            .await?
            .to_vec()?;
        role_claims.delete_many_async(&rows, token).await?;
        Ok(())
    }
}

#[async_trait]
impl ClaimStore<IdentityRole> for RoleStore {
    async fn get_claims(&self, owner: &IdentityRole, token: &CancellationToken) -> RepoResult<Vec<Claim>> {
        RoleStore::get_claims(self, owner, token).await
    }

    async fn add_claim(&self, owner: &IdentityRole, claim: &Claim, token: &CancellationToken) -> RepoResult<()> {
        RoleStore::add_claim(self, owner, claim, token).await
    }

    async fn remove_claim(&self, owner: &IdentityRole, claim: &Claim, token: &CancellationToken) -> RepoResult<()> {
        RoleStore::remove_claim(self, owner, claim, token).await
    }
}
