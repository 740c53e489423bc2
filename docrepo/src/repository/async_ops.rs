use tokio_util::sync::CancellationToken;

use super::{Criteria, Entity, EntityCursor, Repository};
use crate::common::ensure_not_cancelled;
use crate::errors::RepoResult;
use crate::filter::Filter;

/// Awaitable variants of the repository operations.
///
/// Each one checks `token` first and returns `Cancelled` without touching
/// the store when it has been triggered; otherwise the synchronous operation
/// runs on tokio's blocking pool. Must be called from within a tokio runtime.
impl<T: Entity> Repository<T> {
    async fn run_blocking<R, F>(&self, token: &CancellationToken, operation: &str, f: F) -> RepoResult<R>
    where
        R: Send + 'static,
        F: FnOnce(Repository<T>) -> RepoResult<R> + Send + 'static,
    {
        ensure_not_cancelled(token, operation)?;
        let repository = self.clone();
        tokio::task::spawn_blocking(move || f(repository)).await?
    }

    pub async fn query_async(&self, criteria: Criteria<T>, token: &CancellationToken) -> RepoResult<EntityCursor<T>> {
        self.run_blocking(token, "query", move |repo| repo.query(criteria)).await
    }

    pub async fn query_filter_async(&self, filter: Filter, token: &CancellationToken) -> RepoResult<EntityCursor<T>> {
        self.run_blocking(token, "query_filter", move |repo| repo.query_filter(filter)).await
    }

    pub async fn find_async(&self, criteria: Criteria<T>, token: &CancellationToken) -> RepoResult<Option<T>> {
        self.run_blocking(token, "find", move |repo| repo.find(criteria)).await
    }

    pub async fn find_filter_async(&self, filter: Filter, token: &CancellationToken) -> RepoResult<Option<T>> {
        self.run_blocking(token, "find_filter", move |repo| repo.find_filter(filter)).await
    }

    pub async fn find_by_id_async(&self, id: &str, token: &CancellationToken) -> RepoResult<Option<T>> {
        let id = id.to_string();
        self.run_blocking(token, "find_by_id", move |repo| repo.find_by_id(&id)).await
    }

    pub async fn insert_async(&self, entity: T, token: &CancellationToken) -> RepoResult<T> {
        self.run_blocking(token, "insert", move |repo| repo.insert(entity)).await
    }

    pub async fn insert_many_async(&self, entities: Vec<T>, token: &CancellationToken) -> RepoResult<Vec<T>> {
        self.run_blocking(token, "insert_many", move |repo| repo.insert_many(entities)).await
    }

    pub async fn update_async(&self, entity: &T, token: &CancellationToken) -> RepoResult<u64> {
        let entity = entity.clone();
        self.run_blocking(token, "update", move |repo| repo.update(&entity)).await
    }

    pub async fn update_many_async(&self, entities: &[T], token: &CancellationToken) -> RepoResult<u64> {
        let entities = entities.to_vec();
        self.run_blocking(token, "update_many", move |repo| repo.update_many(&entities)).await
    }

    pub async fn delete_by_id_async(&self, id: &str, token: &CancellationToken) -> RepoResult<u64> {
        let id = id.to_string();
        self.run_blocking(token, "delete_by_id", move |repo| repo.delete_by_id(&id)).await
    }

    pub async fn delete_async(&self, entity: &T, token: &CancellationToken) -> RepoResult<u64> {
        let entity = entity.clone();
        self.run_blocking(token, "delete", move |repo| repo.delete(&entity)).await
    }

    pub async fn delete_many_async(&self, entities: &[T], token: &CancellationToken) -> RepoResult<u64> {
        let entities = entities.to_vec();
        self.run_blocking(token, "delete_many", move |repo| repo.delete_many(&entities)).await
    }

    pub async fn count_async(&self, criteria: Criteria<T>, token: &CancellationToken) -> RepoResult<u64> {
        self.run_blocking(token, "count", move |repo| repo.count(criteria)).await
    }
}
