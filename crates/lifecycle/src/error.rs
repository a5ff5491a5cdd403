use huduma_core::error::CoreError;

/// Failure of a lifecycle operation.
///
/// Domain outcomes (validation, not found, forbidden, conflict) arrive as
/// [`CoreError`]; anything the store raised is passed through untouched so
/// the HTTP layer can classify it.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
