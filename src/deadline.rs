//! Deadline enforcement for store calls.

use crate::error::{ServiceError, ServiceResult};
use std::future::Future;
use std::time::Duration;

/// Awaits `operation`, failing with [`ServiceError::DeadlineExceeded`] once
/// `limit` elapses. With no limit the operation is awaited to completion.
///
/// The operation's own error is converted into [`ServiceError`].
///
/// # Errors
///
/// Returns [`ServiceError::DeadlineExceeded`] on timeout, or the converted
/// operation error.
pub async fn with_deadline<F, T, E>(limit: Option<Duration>, operation: F) -> ServiceResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ServiceError>,
{
    let outcome = match limit {
        Some(duration) => tokio::time::timeout(duration, operation)
            .await
            .map_err(|_| {
                tracing::warn!(timeout = ?duration, "store deadline exceeded");
                ServiceError::DeadlineExceeded
            })?,
        None => operation.await,
    };
    outcome.map_err(Into::into)
}
