use std::sync::atomic::{AtomicBool, Ordering};

use docrepo::collection::ObjectId;
use docrepo::common::ensure_not_cancelled;
use docrepo::errors::{ErrorKind, RepoError, RepoResult};
use tokio_util::sync::CancellationToken;

/// Per-store disposal flag and the argument checks every store operation
/// runs before touching a repository.
pub(crate) struct StoreGuard {
    store_name: &'static str,
    disposed: AtomicBool,
}

impl StoreGuard {
    pub(crate) fn new(store_name: &'static str) -> Self {
        StoreGuard {
            store_name,
            disposed: AtomicBool::new(false),
        }
    }

    /// Cancellation first, then disposal.
    pub(crate) fn check(&self, token: &CancellationToken, operation: &str) -> RepoResult<()> {
        ensure_not_cancelled(token, operation)?;
        if self.disposed.load(Ordering::Acquire) {
            log::error!("{} used after dispose in {}", self.store_name, operation);
            return Err(RepoError::new(
                &format!("{} has been disposed", self.store_name),
                ErrorKind::UseAfterDispose,
            ));
        }
        Ok(())
    }

    pub(crate) fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            log::debug!("{} already disposed", self.store_name);
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

pub(crate) fn require_text(value: &str, argument: &str) -> RepoResult<()> {
    if value.trim().is_empty() {
        log::error!("Argument {} cannot be blank", argument);
        return Err(RepoError::new(
            &format!("Argument {} cannot be null or empty", argument),
            ErrorKind::NullArgument,
        ));
    }
    Ok(())
}

/// Rejects the empty identifier, i.e. an entity that was never stored.
pub(crate) fn require_id(id: ObjectId, argument: &str) -> RepoResult<()> {
    if id.is_empty() {
        log::error!("Argument {} has no identifier", argument);
        return Err(RepoError::new(
            &format!("Argument {} has no identifier", argument),
            ErrorKind::NullArgument,
        ));
    }
    Ok(())
}
