use tessera_encoding::EncodingError;
use tessera_store::StoreError;
use tessera_types::Reference;

use crate::kind::Kind;

/// Errors from schema derivation, persistence, and lookup.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Unsupported type shape, or persisted bytes that do not describe a
    /// well-formed schema.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Registration with a blank name.
    #[error("schema name must not be empty")]
    EmptyName,

    /// Registration under one of the reserved reference sentinels.
    #[error("schema name {0:?} is reserved")]
    ReservedName(String),

    /// No schema is bound to this name.
    #[error("schema not found: {0}")]
    NotFound(String),

    /// No schema is stored under this reference.
    #[error("schema not found in store: {0}")]
    ReferenceNotFound(Reference),

    /// An accessor that does not apply to this kind (e.g. `length` of a struct).
    #[error("{operation} is not applicable to kind {kind}")]
    NotApplicable { operation: &'static str, kind: Kind },

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
