use std::sync::Arc;

use async_trait::async_trait;

use tessera_schema::Registry;
use tessera_store::ObjectStore;
use tessera_types::Reference;

use crate::error::SyncResult;

/// Somewhere objects can be fetched from by hash.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Schema names the source has bound, with the schema hash of each.
    async fn list_names(&self) -> SyncResult<Vec<(String, Reference)>>;

    /// Fetch the objects the source holds among `wants`. Absent objects are
    /// left out of the answer.
    async fn fetch(&self, wants: &[Reference]) -> SyncResult<Vec<(Reference, Vec<u8>)>>;
}

/// An [`ObjectSource`] backed by a local registry and its store.
pub struct StoreSource {
    registry: Arc<Registry>,
}

impl StoreSource {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ObjectSource for StoreSource {
    async fn list_names(&self) -> SyncResult<Vec<(String, Reference)>> {
        Ok(self.registry.names())
    }

    async fn fetch(&self, wants: &[Reference]) -> SyncResult<Vec<(Reference, Vec<u8>)>> {
        let store = self.registry.store();
        let mut found = Vec::with_capacity(wants.len());
        for (reference, data) in wants.iter().zip(store.get_batch(wants)?) {
            if let Some(data) = data {
                found.push((*reference, data));
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_store::{InMemoryObjectStore, ObjectStore};

    #[tokio::test]
    async fn store_source_skips_absent_objects() {
        let store = Arc::new(InMemoryObjectStore::new());
        let present = store.put(b"present").unwrap();
        let absent = Reference::sum(b"absent");
        let source = StoreSource::new(Arc::new(Registry::new(store)));

        let fetched = source.fetch(&[present, absent]).await.unwrap();
        assert_eq!(fetched, vec![(present, b"present".to_vec())]);
        assert!(source.list_names().await.unwrap().is_empty());
    }
}
