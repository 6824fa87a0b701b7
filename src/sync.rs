//! Apply-locally, confirm-remotely, revert-on-failure. Every optimistic UI
//! update (comment likes, interest toggles) goes through this one helper
//! instead of hand-rolling the rollback at each call site.

use crate::error::ClientError;
use std::future::Future;

/// Apply `apply` to `state` immediately, then await `confirm`. If the
/// confirmation fails, `revert` undoes the local change and the error is
/// returned for the caller to surface.
pub async fn optimistic<S, T, Fut>(
    state: &mut S,
    apply: impl FnOnce(&mut S),
    revert: impl FnOnce(&mut S),
    confirm: Fut,
) -> Result<T, ClientError>
where
    Fut: Future<Output = Result<T, ClientError>>,
{
    apply(state);
    match confirm.await {
        Ok(value) => Ok(value),
        Err(e) => {
            revert(state);
            Err(e)
        }
    }
}
