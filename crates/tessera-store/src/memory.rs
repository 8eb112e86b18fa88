use std::collections::HashMap;
use std::sync::RwLock;

use tessera_types::Reference;

use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// Object store that keeps every object in a map keyed by its hash.
///
/// Used by tests and by callers that build a graph before persisting it.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<Reference, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct objects held.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get(&self, reference: &Reference) -> StoreResult<Option<Vec<u8>>> {
        let objects = self.objects.read().expect("lock poisoned");
        Ok(objects.get(reference).cloned())
    }

    fn put(&self, data: &[u8]) -> StoreResult<Reference> {
        let reference = Reference::sum(data);
        self.objects
            .write()
            .expect("lock poisoned")
            .entry(reference)
            .or_insert_with(|| data.to_vec());
        Ok(reference)
    }

    fn exists(&self, reference: &Reference) -> StoreResult<bool> {
        let objects = self.objects.read().expect("lock poisoned");
        Ok(objects.contains_key(reference))
    }

    fn delete(&self, reference: &Reference) -> StoreResult<bool> {
        let mut objects = self.objects.write().expect("lock poisoned");
        Ok(objects.remove(reference).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .finish()
    }
}
