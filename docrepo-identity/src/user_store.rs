use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docrepo::collection::ObjectId;
use docrepo::errors::{ErrorKind, RepoError, RepoResult};
use docrepo::filter::{by_id, by_ids, field, Filter};
use itertools::Itertools;
use tokio_util::sync::CancellationToken;

use crate::claim_store::ClaimStore;
use crate::context::IdentityContext;
use crate::guard::{require_id, require_text, StoreGuard};
use crate::model::{
    new_stamp, Claim, IdentityRole, IdentityUser, IdentityUserClaim, IdentityUserLogin, IdentityUserRole,
    IdentityUserToken, UserLoginInfo,
};

/// Login provider under which the store keeps its own tokens.
pub const INTERNAL_LOGIN_PROVIDER: &str = "[AspNetUserStore]";
/// Token name of the authenticator key.
pub const AUTHENTICATOR_KEY_TOKEN: &str = "AuthenticatorKey";
/// Token name of the recovery codes, stored joined by `;`.
pub const RECOVERY_CODES_TOKEN: &str = "RecoveryCodes";

/// Persistence for users and everything attached to them: role
/// memberships, claims, external logins and tokens.
///
/// Every operation checks, in order, the cancellation token, whether the
/// store has been disposed, and its arguments, before any repository call.
/// Store failures are returned unchanged and nothing is retried.
///
/// Property accessors (`get_email`, `set_lockout_enabled`, ...) only touch
/// the value passed in; [UserStore::update] persists them.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<UserStoreInner>,
}

struct UserStoreInner {
    context: IdentityContext,
    guard: StoreGuard,
}

impl UserStore {
    pub fn new(context: &IdentityContext) -> Self {
        UserStore {
            inner: Arc::new(UserStoreInner {
                context: context.clone(),
                guard: StoreGuard::new("UserStore"),
            }),
        }
    }

    pub fn context(&self) -> &IdentityContext {
        &self.inner.context
    }

    /// Marks the store disposed; every later call fails with `UseAfterDispose`.
    pub fn dispose(&self) {
        self.inner.guard.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.guard.is_disposed()
    }

    fn check(&self, token: &CancellationToken, operation: &str) -> RepoResult<()> {
        self.inner.guard.check(token, operation)
    }

    fn check_user(&self, user: &IdentityUser, token: &CancellationToken, operation: &str) -> RepoResult<()> {
        self.check(token, operation)?;
        require_id(user.id, "user")
    }

    // users

    /// Stores a new user. The returned user carries its assigned id.
    pub async fn create(&self, user: IdentityUser, token: &CancellationToken) -> RepoResult<IdentityUser> {
        self.check(token, "create")?;
        self.inner.context.users().insert_async(user, token).await
    }

    /// Writes `user` back under a fresh concurrency stamp.
    pub async fn update(&self, user: &mut IdentityUser, token: &CancellationToken) -> RepoResult<()> {
        self.check_user(user, token, "update")?;
        user.concurrency_stamp = new_stamp();
        self.inner.context.users().update_async(user, token).await?;
        Ok(())
    }

    /// Deletes the user row only; claims, logins, tokens and memberships
    /// stay behind.
    pub async fn delete(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<()> {
        self.check_user(user, token, "delete")?;
        self.inner.context.users().delete_async(user, token).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, user_id: &str, token: &CancellationToken) -> RepoResult<Option<IdentityUser>> {
        self.check(token, "find_by_id")?;
        require_text(user_id, "user_id")?;
        self.inner.context.users().find_by_id_async(user_id, token).await
    }

    /// The first user with `normalized_user_name`; duplicates are not an error.
    pub async fn find_by_name(
        &self,
        normalized_user_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<Option<IdentityUser>> {
        self.check(token, "find_by_name")?;
        require_text(normalized_user_name, "normalized_user_name")?;
        let mut matches = self
            .inner
            .context
            .users()
            .query_filter_async(field("normalized_user_name").eq(normalized_user_name), token)
            .await?;
        matches.next().transpose()
    }

    pub async fn find_by_email(
        &self,
        normalized_email: &str,
        token: &CancellationToken,
    ) -> RepoResult<Option<IdentityUser>> {
        self.check(token, "find_by_email")?;
        require_text(normalized_email, "normalized_email")?;
        self.inner
            .context
            .users()
            .find_filter_async(field("normalized_email").eq(normalized_email), token)
            .await
    }

    // properties

    pub fn get_user_id(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<String> {
        self.check(token, "get_user_id")?;
        Ok(user.id.to_string())
    }

    pub fn get_user_name(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<String> {
        self.check(token, "get_user_name")?;
        Ok(user.user_name.clone())
    }

    pub fn set_user_name(&self, user: &mut IdentityUser, user_name: &str, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "set_user_name")?;
        user.user_name = user_name.to_string();
        Ok(())
    }

    pub fn get_normalized_user_name(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<String> {
        self.check(token, "get_normalized_user_name")?;
        Ok(user.normalized_user_name.clone())
    }

    pub fn set_normalized_user_name(
        &self,
        user: &mut IdentityUser,
        normalized_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check(token, "set_normalized_user_name")?;
        user.normalized_user_name = normalized_name.to_string();
        Ok(())
    }

    pub fn get_email(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Option<String>> {
        self.check(token, "get_email")?;
        Ok(user.email.clone())
    }

    pub fn set_email(&self, user: &mut IdentityUser, email: Option<&str>, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "set_email")?;
        user.email = email.map(str::to_string);
        Ok(())
    }

    pub fn get_normalized_email(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Option<String>> {
        self.check(token, "get_normalized_email")?;
        Ok(user.normalized_email.clone())
    }

    pub fn set_normalized_email(
        &self,
        user: &mut IdentityUser,
        normalized_email: Option<&str>,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check(token, "set_normalized_email")?;
        user.normalized_email = normalized_email.map(str::to_string);
        Ok(())
    }

    pub fn get_email_confirmed(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<bool> {
        self.check(token, "get_email_confirmed")?;
        Ok(user.email_confirmed)
    }

    pub fn set_email_confirmed(&self, user: &mut IdentityUser, confirmed: bool, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "set_email_confirmed")?;
        user.email_confirmed = confirmed;
        Ok(())
    }

    pub fn get_password_hash(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Option<String>> {
        self.check(token, "get_password_hash")?;
        Ok(user.password_hash.clone())
    }

    pub fn set_password_hash(
        &self,
        user: &mut IdentityUser,
        password_hash: Option<&str>,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check(token, "set_password_hash")?;
        user.password_hash = password_hash.map(str::to_string);
        Ok(())
    }

    pub fn has_password(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<bool> {
        self.check(token, "has_password")?;
        Ok(user.password_hash.is_some())
    }

    pub fn get_security_stamp(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Option<String>> {
        self.check(token, "get_security_stamp")?;
        Ok(user.security_stamp.clone())
    }

    pub fn set_security_stamp(&self, user: &mut IdentityUser, stamp: &str, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "set_security_stamp")?;
        require_text(stamp, "stamp")?;
        user.security_stamp = Some(stamp.to_string());
        Ok(())
    }

    pub fn get_phone_number(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Option<String>> {
        self.check(token, "get_phone_number")?;
        Ok(user.phone_number.clone())
    }

    pub fn set_phone_number(
        &self,
        user: &mut IdentityUser,
        phone_number: Option<&str>,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check(token, "set_phone_number")?;
        user.phone_number = phone_number.map(str::to_string);
        Ok(())
    }

    pub fn get_phone_number_confirmed(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<bool> {
        self.check(token, "get_phone_number_confirmed")?;
        Ok(user.phone_number_confirmed)
    }

    pub fn set_phone_number_confirmed(
        &self,
        user: &mut IdentityUser,
        confirmed: bool,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check(token, "set_phone_number_confirmed")?;
        user.phone_number_confirmed = confirmed;
        Ok(())
    }

    pub fn get_two_factor_enabled(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<bool> {
        self.check(token, "get_two_factor_enabled")?;
        Ok(user.two_factor_enabled)
    }

    pub fn set_two_factor_enabled(&self, user: &mut IdentityUser, enabled: bool, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "set_two_factor_enabled")?;
        user.two_factor_enabled = enabled;
        Ok(())
    }

    pub fn get_lockout_end_date(
        &self,
        user: &IdentityUser,
        token: &CancellationToken,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        self.check(token, "get_lockout_end_date")?;
        Ok(user.lockout_end)
    }

    pub fn set_lockout_end_date(
        &self,
        user: &mut IdentityUser,
        lockout_end: Option<DateTime<Utc>>,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check(token, "set_lockout_end_date")?;
        user.lockout_end = lockout_end;
        Ok(())
    }

    pub fn get_lockout_enabled(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<bool> {
        self.check(token, "get_lockout_enabled")?;
        Ok(user.lockout_enabled)
    }

    pub fn set_lockout_enabled(&self, user: &mut IdentityUser, enabled: bool, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "set_lockout_enabled")?;
        user.lockout_enabled = enabled;
        Ok(())
    }

    pub fn get_access_failed_count(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<i32> {
        self.check(token, "get_access_failed_count")?;
        Ok(user.access_failed_count)
    }

    /// Records a failed access and returns the new count.
    pub fn increment_access_failed_count(&self, user: &mut IdentityUser, token: &CancellationToken) -> RepoResult<i32> {
        self.check(token, "increment_access_failed_count")?;
        user.access_failed_count = user.access_failed_count.saturating_add(1);
        Ok(user.access_failed_count)
    }

    pub fn reset_access_failed_count(&self, user: &mut IdentityUser, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "reset_access_failed_count")?;
        user.access_failed_count = 0;
        Ok(())
    }

    // roles

    async fn find_role(&self, normalized_role_name: &str, token: &CancellationToken) -> RepoResult<Option<IdentityRole>> {
        self.inner
            .context
            .roles()
            .find_filter_async(field("normalized_name").eq(normalized_role_name), token)
            .await
    }

    async fn find_user_role(
        &self,
        user_id: ObjectId,
        role_id: ObjectId,
        token: &CancellationToken,
    ) -> RepoResult<Option<IdentityUserRole>> {
        let filter = field("user_id").eq(user_id).and(field("role_id").eq(role_id));
        self.inner.context.user_roles().find_filter_async(filter, token).await
    }

    /// Makes `user` a member of the role with `normalized_role_name`.
    ///
    /// # Errors
    ///
    /// `RoleNotFound` when no role has that normalized name.
    pub async fn add_to_role(
        &self,
        user: &IdentityUser,
        normalized_role_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check_user(user, token, "add_to_role")?;
        require_text(normalized_role_name, "normalized_role_name")?;

        let role = match self.find_role(normalized_role_name, token).await? {
            Some(role) => role,
            None => {
                log::error!("Role {} not found", normalized_role_name);
                return Err(RepoError::new(
                    &format!("Role {} does not exist", normalized_role_name),
                    ErrorKind::RoleNotFound,
                ));
            }
        };

        let membership = IdentityUserRole {
            user_id: user.id,
            role_id: role.id,
            ..Default::default()
        };
        self.inner.context.user_roles().insert_async(membership, token).await?;
        Ok(())
    }

    /// Removes the membership if there is one.
    pub async fn remove_from_role(
        &self,
        user: &IdentityUser,
        normalized_role_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check_user(user, token, "remove_from_role")?;
        require_text(normalized_role_name, "normalized_role_name")?;

        if let Some(role) = self.find_role(normalized_role_name, token).await? {
            if let Some(membership) = self.find_user_role(user.id, role.id, token).await? {
                self.inner.context.user_roles().delete_async(&membership, token).await?;
            }
        }
        Ok(())
    }

    /// Names of the roles `user` is a member of.
    pub async fn get_roles(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Vec<String>> {
        self.check_user(user, token, "get_roles")?;

        let memberships = self
            .inner
            .context
            .user_roles()
            .query_filter_async(field("user_id").eq(user.id), token)
            .await?
            .to_vec()?;
        let role_ids = memberships.iter().map(|m| m.role_id).unique().collect::<Vec<_>>();
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let roles = self
            .inner
            .context
            .roles()
            .query_filter_async(by_ids(role_ids), token)
            .await?
            .to_vec()?;
        Ok(roles.into_iter().map(|role| role.name).collect())
    }

    pub async fn is_in_role(
        &self,
        user: &IdentityUser,
        normalized_role_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<bool> {
        self.check_user(user, token, "is_in_role")?;
        require_text(normalized_role_name, "normalized_role_name")?;

        match self.find_role(normalized_role_name, token).await? {
            Some(role) => Ok(self.find_user_role(user.id, role.id, token).await?.is_some()),
            None => Ok(false),
        }
    }

    /// Members of the role; empty when the role does not exist.
    pub async fn get_users_in_role(
        &self,
        normalized_role_name: &str,
        token: &CancellationToken,
    ) -> RepoResult<Vec<IdentityUser>> {
        self.check(token, "get_users_in_role")?;
        require_text(normalized_role_name, "normalized_role_name")?;

        let role = match self.find_role(normalized_role_name, token).await? {
            Some(role) => role,
            None => return Ok(Vec::new()),
        };
        let memberships = self
            .inner
            .context
            .user_roles()
            .query_filter_async(field("role_id").eq(role.id), token)
            .await?
            .to_vec()?;
        let user_ids = memberships.iter().map(|m| m.user_id).unique().collect();
        self.users_by_ids(user_ids, token).await
    }

    async fn users_by_ids(&self, ids: Vec<ObjectId>, token: &CancellationToken) -> RepoResult<Vec<IdentityUser>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.inner
            .context
            .users()
            .query_filter_async(by_ids(ids), token)
            .await?
            .to_vec()
    }

    // claims

    fn claim_filter(user_id: ObjectId, claim: &Claim) -> Filter {
        field("user_id")
            .eq(user_id)
            .and(field("claim_type").eq(claim.claim_type.as_str()))
            .and(field("claim_value").eq(claim.value.as_str()))
    }

    pub async fn get_claims(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Vec<Claim>> {
        self.check_user(user, token, "get_claims")?;
        let rows = self
            .inner
            .context
            .user_claims()
            .query_filter_async(field("user_id").eq(user.id), token)
            .await?
            .to_vec()?;
        Ok(rows.iter().map(IdentityUserClaim::to_claim).collect())
    }

    /// Stores one claim row per claim.
    pub async fn add_claims(&self, user: &IdentityUser, claims: &[Claim], token: &CancellationToken) -> RepoResult<()> {
        self.check_user(user, token, "add_claims")?;
        let rows = claims
            .iter()
            .map(|claim| IdentityUserClaim::new(user.id, claim))
            .collect::<Vec<_>>();
        if rows.is_empty() {
            return Ok(());
        }
        self.inner.context.user_claims().insert_many_async(rows, token).await?;
        Ok(())
    }

    /// Rewrites every row of `user` holding `claim` to hold `new_claim`.
    /// Nothing happens when no row holds `claim`.
    pub async fn replace_claim(
        &self,
        user: &IdentityUser,
        claim: &Claim,
        new_claim: &Claim,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check_user(user, token, "replace_claim")?;
        let mut rows = self
            .inner
            .context
            .user_claims()
            .query_filter_async(Self::claim_filter(user.id, claim), token)
            .await?
            .to_vec()?;
        if rows.is_empty() {
            log::debug!("No claim {} to replace for user {}", claim, user.id);
            return Ok(());
        }

        for row in rows.iter_mut() {
            row.initialize_from_claim(new_claim);
        }
        self.inner.context.user_claims().update_many_async(&rows, token).await?;
        Ok(())
    }

    pub async fn remove_claims(&self, user: &IdentityUser, claims: &[Claim], token: &CancellationToken) -> RepoResult<()> {
        self.check_user(user, token, "remove_claims")?;
        for claim in claims {
            let rows = self
                .inner
                .context
                .user_claims()
                .query_filter_async(Self::claim_filter(user.id, claim), token)
                .await?
                .to_vec()?;
            self.inner.context.user_claims().delete_many_async(&rows, token).await?;
        }
        Ok(())
    }

    /// Users holding `claim`.
    pub async fn get_users_for_claim(&self, claim: &Claim, token: &CancellationToken) -> RepoResult<Vec<IdentityUser>> {
        self.check(token, "get_users_for_claim")?;
        require_text(&claim.claim_type, "claim")?;

        let filter = field("claim_type")
            .eq(claim.claim_type.as_str())
            .and(field("claim_value").eq(claim.value.as_str()));
        let rows = self
            .inner
            .context
            .user_claims()
            .query_filter_async(filter, token)
            .await?
            .to_vec()?;
        let user_ids = rows.iter().map(|row| row.user_id).unique().collect();
        self.users_by_ids(user_ids, token).await
    }

    // logins

    pub async fn add_login(&self, user: &IdentityUser, login: &UserLoginInfo, token: &CancellationToken) -> RepoResult<()> {
        self.check_user(user, token, "add_login")?;
        require_text(&login.login_provider, "login_provider")?;
        require_text(&login.provider_key, "provider_key")?;
        self.inner
            .context
            .user_logins()
            .insert_async(IdentityUserLogin::new(user.id, login), token)
            .await?;
        Ok(())
    }

    pub async fn remove_login(
        &self,
        user: &IdentityUser,
        login_provider: &str,
        provider_key: &str,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check_user(user, token, "remove_login")?;
        require_text(login_provider, "login_provider")?;
        require_text(provider_key, "provider_key")?;

        let filter = field("user_id")
            .eq(user.id)
            .and(field("login_provider").eq(login_provider))
            .and(field("provider_key").eq(provider_key));
        if let Some(entry) = self.inner.context.user_logins().find_filter_async(filter, token).await? {
            self.inner.context.user_logins().delete_async(&entry, token).await?;
        }
        Ok(())
    }

    pub async fn get_logins(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Vec<UserLoginInfo>> {
        self.check_user(user, token, "get_logins")?;
        let rows = self
            .inner
            .context
            .user_logins()
            .query_filter_async(field("user_id").eq(user.id), token)
            .await?
            .to_vec()?;
        Ok(rows.iter().map(IdentityUserLogin::to_login_info).collect())
    }

    /// The user owning the external login. Resolved in two steps: the
    /// login row first, then its user.
    pub async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        token: &CancellationToken,
    ) -> RepoResult<Option<IdentityUser>> {
        self.check(token, "find_by_login")?;
        require_text(login_provider, "login_provider")?;
        require_text(provider_key, "provider_key")?;

        let filter = field("login_provider")
            .eq(login_provider)
            .and(field("provider_key").eq(provider_key));
        match self.inner.context.user_logins().find_filter_async(filter, token).await? {
            Some(entry) => {
                self.inner
                    .context
                    .users()
                    .find_filter_async(by_id(entry.user_id), token)
                    .await
            }
            None => Ok(None),
        }
    }

    // tokens

    fn token_filter(user_id: ObjectId, login_provider: &str, name: &str) -> Filter {
        field("user_id")
            .eq(user_id)
            .and(field("login_provider").eq(login_provider))
            .and(field("name").eq(name))
    }

    pub async fn find_token(
        &self,
        user: &IdentityUser,
        login_provider: &str,
        name: &str,
        token: &CancellationToken,
    ) -> RepoResult<Option<IdentityUserToken>> {
        self.check_user(user, token, "find_token")?;
        require_text(login_provider, "login_provider")?;
        require_text(name, "name")?;
        self.inner
            .context
            .user_tokens()
            .find_filter_async(Self::token_filter(user.id, login_provider, name), token)
            .await
    }

    /// Stores `user_token`, replacing the value of an existing token with
    /// the same (user, provider, name) or inserting a new row.
    pub async fn add_user_token(&self, user_token: IdentityUserToken, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "add_user_token")?;
        require_id(user_token.user_id, "user_token.user_id")?;
        require_text(&user_token.login_provider, "user_token.login_provider")?;
        require_text(&user_token.name, "user_token.name")?;

        let filter = Self::token_filter(user_token.user_id, &user_token.login_provider, &user_token.name);
        let tokens = self.inner.context.user_tokens();
        match tokens.find_filter_async(filter, token).await? {
            Some(mut existing) => {
                existing.value = user_token.value;
                tokens.update_async(&existing, token).await?;
            }
            None => {
                tokens.insert_async(user_token, token).await?;
            }
        }
        Ok(())
    }

    /// Deletes the token with the same (user, provider, name), if any.
    pub async fn remove_user_token(&self, user_token: &IdentityUserToken, token: &CancellationToken) -> RepoResult<()> {
        self.check(token, "remove_user_token")?;
        require_id(user_token.user_id, "user_token.user_id")?;
        require_text(&user_token.login_provider, "user_token.login_provider")?;
        require_text(&user_token.name, "user_token.name")?;

        let filter = Self::token_filter(user_token.user_id, &user_token.login_provider, &user_token.name);
        let tokens = self.inner.context.user_tokens();
        if let Some(existing) = tokens.find_filter_async(filter, token).await? {
            tokens.delete_async(&existing, token).await?;
        }
        Ok(())
    }

    pub async fn set_token(
        &self,
        user: &IdentityUser,
        login_provider: &str,
        name: &str,
        value: Option<&str>,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check_user(user, token, "set_token")?;
        self.add_user_token(IdentityUserToken::new(user.id, login_provider, name, value), token)
            .await
    }

    pub async fn get_token(
        &self,
        user: &IdentityUser,
        login_provider: &str,
        name: &str,
        token: &CancellationToken,
    ) -> RepoResult<Option<String>> {
        Ok(self
            .find_token(user, login_provider, name, token)
            .await?
            .and_then(|found| found.value))
    }

    pub async fn remove_token(
        &self,
        user: &IdentityUser,
        login_provider: &str,
        name: &str,
        token: &CancellationToken,
    ) -> RepoResult<()> {
        self.check_user(user, token, "remove_token")?;
        self.remove_user_token(&IdentityUserToken::new(user.id, login_provider, name, None), token)
            .await
    }

    pub async fn set_authenticator_key(&self, user: &IdentityUser, key: &str, token: &CancellationToken) -> RepoResult<()> {
        self.set_token(user, INTERNAL_LOGIN_PROVIDER, AUTHENTICATOR_KEY_TOKEN, Some(key), token)
            .await
    }

    pub async fn get_authenticator_key(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Option<String>> {
        self.get_token(user, INTERNAL_LOGIN_PROVIDER, AUTHENTICATOR_KEY_TOKEN, token)
            .await
    }

    /// Replaces the user's recovery codes.
    pub async fn replace_codes(
        &self,
        user: &IdentityUser,
        recovery_codes: &[String],
        token: &CancellationToken,
    ) -> RepoResult<()> {
        let merged = recovery_codes.join(";");
        self.set_token(user, INTERNAL_LOGIN_PROVIDER, RECOVERY_CODES_TOKEN, Some(&merged), token)
            .await
    }

    /// Consumes `code` if it is one of the user's recovery codes.
    /// Returns whether it was.
    pub async fn redeem_code(&self, user: &IdentityUser, code: &str, token: &CancellationToken) -> RepoResult<bool> {
        self.check_user(user, token, "redeem_code")?;
        require_text(code, "code")?;
        let codes = self.recovery_codes(user, token).await?;
        if !codes.iter().any(|c| c == code) {
            return Ok(false);
        }

        let remaining = codes.into_iter().filter(|c| c != code).collect::<Vec<_>>();
        self.replace_codes(user, &remaining, token).await?;
        Ok(true)
    }

    pub async fn count_codes(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<usize> {
        Ok(self.recovery_codes(user, token).await?.len())
    }

    async fn recovery_codes(&self, user: &IdentityUser, token: &CancellationToken) -> RepoResult<Vec<String>> {
        let merged = self
            .get_token(user, INTERNAL_LOGIN_PROVIDER, RECOVERY_CODES_TOKEN, token)
            .await?
            .unwrap_or_default();
        Ok(merged
            .split(';')
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl ClaimStore<IdentityUser> for UserStore {
    async fn get_claims(&self, owner: &IdentityUser, token: &CancellationToken) -> RepoResult<Vec<Claim>> {
        UserStore::get_claims(self, owner, token).await
    }

    async fn add_claim(&self, owner: &IdentityUser, claim: &Claim, token: &CancellationToken) -> RepoResult<()> {
        self.add_claims(owner, std::slice::from_ref(claim), token).await
    }

    async fn remove_claim(&self, owner: &IdentityUser, claim: &Claim, token: &CancellationToken) -> RepoResult<()> {
        self.remove_claims(owner, std::slice::from_ref(claim), token).await
    }
}
