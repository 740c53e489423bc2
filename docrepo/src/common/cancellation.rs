use tokio_util::sync::CancellationToken;

use crate::errors::{ErrorKind, RepoError, RepoResult};

/// Fails with `Cancelled` if `token` has already been triggered.
///
/// Async operations call this before touching the store; cancellation that
/// arrives after the store call has started is not observed.
pub fn ensure_not_cancelled(token: &CancellationToken, operation: &str) -> RepoResult<()> {
    if token.is_cancelled() {
        log::error!("Operation {} was cancelled before it started", operation);
        return Err(RepoError::new(
            &format!("Operation {} was cancelled", operation),
            ErrorKind::Cancelled,
        ));
    }
    Ok(())
}
