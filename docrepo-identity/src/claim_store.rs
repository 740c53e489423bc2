use async_trait::async_trait;
use docrepo::errors::RepoResult;
use tokio_util::sync::CancellationToken;

use crate::model::Claim;

/// Claim storage shared by user and role stores.
#[async_trait]
pub trait ClaimStore<Owner: Send + Sync> {
    async fn get_claims(&self, owner: &Owner, token: &CancellationToken) -> RepoResult<Vec<Claim>>;

    async fn add_claim(&self, owner: &Owner, claim: &Claim, token: &CancellationToken) -> RepoResult<()>;

    /// Removes every row of `owner` matching the claim's type and value.
    async fn remove_claim(&self, owner: &Owner, claim: &Claim, token: &CancellationToken) -> RepoResult<()>;
}
