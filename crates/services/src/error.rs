//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by session services.
///
/// The state-machine variants mark programming-contract violations by the
/// caller, not user-facing failures: the operation is rejected and the
/// session is left unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already completed")]
    Completed,

    #[error("session is still in progress")]
    NotCompleted,

    #[error("current question already answered")]
    AlreadyAnswered,

    #[error("current question has not been answered")]
    NotAnswered,

    #[error("training sessions have no timer")]
    Untimed,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
