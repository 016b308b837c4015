use qatar_store::StoreError;
use qatar_types::IdentifierError;

/// Errors from queue operations.
///
/// Store and decode failures pass through unchanged; the queue adds no error
/// kinds of its own and never retries.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Failure from the ordered store (missing/existing location, I/O,
    /// engine errors).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored key or a caller-supplied string is not a valid identifier.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),
}

impl QueueError {
    /// True when opening found no queue at the location.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound { .. }))
    }

    /// True when creating found a queue already at the location.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Store(StoreError::AlreadyExists { .. }))
    }
}

/// Result alias for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
