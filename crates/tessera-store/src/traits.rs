use tessera_types::Reference;

use crate::error::StoreResult;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written: the same bytes always produce the
///   same reference, and a reference's bytes never change.
/// - Repeated reads of one key during a single walk see the same answer.
/// - The store never interprets object contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read the bytes stored under `reference`.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn get(&self, reference: &Reference) -> StoreResult<Option<Vec<u8>>>;

    /// Store `data` and return its content hash.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn put(&self, data: &[u8]) -> StoreResult<Reference>;

    /// Check whether an object exists in the store.
    fn exists(&self, reference: &Reference) -> StoreResult<bool>;

    /// Delete an object. Returns `true` if the object existed.
    ///
    /// Deleting a referenced object leaves its parents incomplete; a later
    /// want computation will report it as missing again.
    fn delete(&self, reference: &Reference) -> StoreResult<bool>;

    /// Read multiple objects in a batch.
    fn get_batch(&self, references: &[Reference]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        references.iter().map(|r| self.get(r)).collect()
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<S> {
    fn get(&self, reference: &Reference) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(reference)
    }

    fn put(&self, data: &[u8]) -> StoreResult<Reference> {
        (**self).put(data)
    }

    fn exists(&self, reference: &Reference) -> StoreResult<bool> {
        (**self).exists(reference)
    }

    fn delete(&self, reference: &Reference) -> StoreResult<bool> {
        (**self).delete(reference)
    }
}
