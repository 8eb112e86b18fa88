use std::sync::Arc;

use tessera_encoding::{decode_from_slice, encode_to_vec, Decode, Encode};
use tessera_schema::{Registry, Typed};
use tessera_store::ObjectStore;
use tessera_types::{Dynamic, Reference, References};

use crate::error::{WantError, WantResult};
use crate::set::WantSet;
use crate::walker::compute_wants;

/// A registry and its store, plus the current root of an object graph.
///
/// The root is a dynamic reference, so the container needs no static
/// knowledge of the root's type.
pub struct Container {
    registry: Arc<Registry>,
    root: Option<Dynamic>,
}

impl Container {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            root: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        self.registry.store()
    }

    /// Encode and store one value.
    pub fn save<T: Encode>(&self, value: &T) -> WantResult<Reference> {
        let bytes = encode_to_vec(value)?;
        Ok(self.store().put(&bytes)?)
    }

    /// Encode and store each value, in order.
    pub fn save_all<T: Encode>(&self, values: &[T]) -> WantResult<References> {
        values.iter().map(|value| self.save(value)).collect()
    }

    /// Store a value together with its schema.
    pub fn dynamic<T: Typed + Encode>(&self, value: &T) -> WantResult<Dynamic> {
        let schema = self.registry.save_schema::<T>()?;
        let object = self.save(value)?;
        Ok(Dynamic::new(schema, object))
    }

    /// Load and decode a stored value.
    pub fn get<T: Decode>(&self, reference: &Reference) -> WantResult<T> {
        let bytes = self
            .store()
            .get(reference)?
            .ok_or(WantError::NotFound(*reference))?;
        Ok(decode_from_slice(&bytes)?)
    }

    pub fn root(&self) -> Option<Dynamic> {
        self.root
    }

    pub fn set_root(&mut self, root: Dynamic) {
        self.root = Some(root);
    }

    pub fn clear_root(&mut self) {
        self.root = None;
    }

    /// References missing below the current root. Empty without a root.
    pub fn want(&self) -> WantResult<WantSet> {
        match self.root {
            Some(root) => compute_wants(
                &self.registry,
                self.store().as_ref(),
                root.schema,
                root.object,
            ),
            None => Ok(WantSet::new()),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("registry", &self.registry)
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_schema::object;
    use tessera_store::InMemoryObjectStore;

    object! {
        #[object(name = "Author")]
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct Author {
            pub name: String,
            pub born: i32,
        }
    }

    object! {
        #[object(name = "Library")]
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct Library {
            #[schema = "Author"]
            pub authors: References,
            pub featured: Dynamic,
        }
    }

    fn container() -> (Arc<InMemoryObjectStore>, Container) {
        let store = Arc::new(InMemoryObjectStore::new());
        let registry = Arc::new(Registry::new(store.clone()));
        (store, Container::new(registry))
    }

    fn authors() -> Vec<Author> {
        vec![
            Author {
                name: "Le Guin".into(),
                born: 1929,
            },
            Author {
                name: "Lem".into(),
                born: 1921,
            },
        ]
    }

    #[test]
    fn no_root_wants_nothing() {
        let (_store, container) = container();
        assert!(container.root().is_none());
        assert!(container.want().unwrap().is_empty());
    }

    #[test]
    fn saved_graph_is_complete() {
        let (_store, mut container) = container();
        container.registry().schema_of::<Author>().unwrap();
        let saved = container.save_all(&authors()).unwrap();
        let featured = container.dynamic(&authors()[0]).unwrap();
        let root = container
            .dynamic(&Library {
                authors: saved,
                featured,
            })
            .unwrap();

        container.set_root(root);
        assert!(container.want().unwrap().is_empty());

        container.clear_root();
        assert!(container.root().is_none());
    }

    #[test]
    fn deleted_member_is_wanted_again() {
        let (store, mut container) = container();
        container.registry().schema_of::<Author>().unwrap();
        let authors = container.save_all(&authors()).unwrap();
        let root = container
            .dynamic(&Library {
                authors: authors.clone(),
                ..Default::default()
            })
            .unwrap();
        container.set_root(root);

        let gone = authors.as_slice()[1];
        assert!(store.delete(&gone).unwrap());
        assert_eq!(container.want().unwrap().into_sorted_vec(), vec![gone]);
    }

    #[test]
    fn get_decodes_saved_values() {
        let (_store, container) = container();
        let author = authors().remove(0);
        let reference = container.save(&author).unwrap();
        assert_eq!(container.get::<Author>(&reference).unwrap(), author);

        let missing = Reference::sum(b"nobody");
        assert!(matches!(
            container.get::<Author>(&missing),
            Err(WantError::NotFound(r)) if r == missing
        ));
    }

    #[test]
    fn get_with_wrong_type_is_an_encoding_error() {
        let (_store, container) = container();
        let reference = container.save(&7u8).unwrap();
        assert!(matches!(
            container.get::<Author>(&reference),
            Err(WantError::Encoding(_))
        ));
    }
}
