use tessera_types::Reference;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {reference}: computed {computed}")]
    HashMismatch {
        reference: Reference,
        computed: Reference,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store layout on disk is not what this backend expects.
    #[error("corrupt store at {path}: {reason}")]
    CorruptLayout { path: String, reason: String },

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
