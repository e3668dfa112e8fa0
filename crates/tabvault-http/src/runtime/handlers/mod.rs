//! Route handlers
//!
//! Store operations are blocking SQLite and file I/O, so every handler hands
//! its work to [`run_blocking`] and only maps the outcome.

pub mod backup;
pub mod health;
pub mod insert;
pub mod report;
pub mod restore;

pub use backup::backup_table;
pub use health::health_check;
pub use insert::insert_entries;
pub use report::query_view;
pub use restore::restore_artifact;

use tabvault_core::ErrorKind;
use tabvault_store::StoreResult;

use crate::runtime::error::{ApiError, Operation, RequestId};

/// Run a store operation on the blocking pool inside the current span.
pub(crate) async fn run_blocking<T, F>(
    operation: Operation,
    request_id: &RequestId,
    work: F,
) -> Result<T, ApiError>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    match tokio::task::spawn_blocking(move || span.in_scope(work)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(ApiError::from_store(operation, request_id.clone(), error)),
        Err(join_error) => Err(ApiError::new(
            operation,
            request_id.clone(),
            ErrorKind::InternalError,
            format!("{} task did not complete: {join_error}", operation.as_str()),
        )),
    }
}
