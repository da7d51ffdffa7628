/// Errors from ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("empty ledger key")]
    EmptyKey,

    /// Serialization or deserialization of the backing file failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backing data is malformed or cannot be decoded.
    #[error("corrupt store at {location}: {reason}")]
    Corrupt { location: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
