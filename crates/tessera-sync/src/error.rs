use thiserror::Error;

use tessera_schema::SchemaError;
use tessera_store::StoreError;
use tessera_want::WantError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source error: {0}")]
    Source(String),

    #[error("want computation failed: {0}")]
    Want(#[from] WantError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type SyncResult<T> = Result<T, SyncError>;
