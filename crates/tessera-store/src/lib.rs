//! Content-addressed object storage for tessera.
//!
//! Every encoded value tessera knows about, schemas and data objects alike,
//! lives in one flat namespace keyed by the BLAKE3 hash of its bytes. The
//! store is deliberately dumb: it never looks inside the bytes. Interpreting
//! them is the job of the schema registry and the want walker.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- one file per object under a root directory
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: writing the same bytes twice stores them once.
//! 3. Concurrent reads are always safe.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use traits::ObjectStore;
