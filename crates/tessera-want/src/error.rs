use tessera_encoding::EncodingError;
use tessera_schema::SchemaError;
use tessera_store::StoreError;
use tessera_types::Reference;

/// Errors from want computation and container operations.
///
/// A missing object is never an error: it is what the walk reports.
#[derive(Debug, thiserror::Error)]
pub enum WantError {
    /// A schema object exists but does not decode.
    #[error("invalid schema {reference}: {source}")]
    InvalidSchema {
        reference: Reference,
        #[source]
        source: SchemaError,
    },

    /// Object bytes that do not fit their schema.
    #[error("object {object} at {path}: {source}")]
    Decode {
        object: Reference,
        path: String,
        #[source]
        source: EncodingError,
    },

    /// A schema the walk needs cannot be resolved (undeclared or unbound
    /// reference target, unbound link).
    #[error("object {object} at {path}: {source}")]
    Resolve {
        object: Reference,
        path: String,
        #[source]
        source: SchemaError,
    },

    /// The walk nested deeper than its limit.
    #[error("object {object} at {path}: nesting deeper than {limit}")]
    TooDeep {
        object: Reference,
        path: String,
        limit: usize,
    },

    /// The object was expected in the store but is absent.
    #[error("object not found: {0}")]
    NotFound(Reference),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WantError {
    /// Returns `true` if the failure comes from a malformed or unresolvable
    /// schema rather than from the data or the store.
    pub fn is_invalid_schema(&self) -> bool {
        match self {
            WantError::InvalidSchema { .. } => true,
            WantError::Resolve { source, .. } | WantError::Schema(source) => matches!(
                source,
                SchemaError::InvalidSchema(_)
                    | SchemaError::NotFound(_)
                    | SchemaError::ReferenceNotFound(_)
            ),
            _ => false,
        }
    }

    /// Returns `true` if object bytes ended before their schema did.
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            WantError::Decode {
                source: EncodingError::Truncated { .. },
                ..
            } | WantError::Encoding(EncodingError::Truncated { .. })
        )
    }
}

/// Result alias for want operations.
pub type WantResult<T> = Result<T, WantError>;
