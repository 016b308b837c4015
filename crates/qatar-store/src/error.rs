use std::path::PathBuf;

/// Errors from ordered store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Create-only open found an existing store at the location.
    #[error("store already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// Open-existing found no store at the location.
    #[error("no store found at {}", path.display())]
    NotFound { path: PathBuf },

    /// I/O error while preparing the storage location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the redb engine (including corruption).
    #[error("redb error: {0}")]
    Redb(#[from] Box<redb::Error>),
}

impl From<redb::Error> for StoreError {
    fn from(e: redb::Error) -> Self {
        Self::Redb(Box::new(e))
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        Self::from(redb::Error::from(e))
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        Self::from(redb::Error::from(e))
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        Self::from(redb::Error::from(e))
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        Self::from(redb::Error::from(e))
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        Self::from(redb::Error::from(e))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
