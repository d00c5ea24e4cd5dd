//! Cancellation of suspension points

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::IpSetError;

/// Drive `fut` to completion unless `cancel` fires first
///
/// Checks the token before polling `fut`, so an already-cancelled token
/// never starts the underlying call.
pub(crate) async fn until_cancelled<F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, IpSetError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(IpSetError::Cancelled),
        out = fut => Ok(out),
    }
}
