//! Schema registry: derivation cache, persistence, and the name index.
//!
//! Deriving a schema for a [`Typed`] type goes through a cache keyed by the
//! type's stable key. A slot is reserved before a type's members are derived,
//! so a type that reaches itself finds its own pending slot and emits a link
//! instead of recursing forever. Named types are persisted to the object
//! store and bound in the name index the first time they are derived.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use tessera_store::ObjectStore;
use tessera_types::Reference;

use crate::error::{SchemaError, SchemaResult};
use crate::kind::Kind;
use crate::schema::{is_reserved_name, Field, Schema, Shape};
use crate::typed::{TypeInfo, TypeKind, Typed};

/// A derivation cache entry.
enum Slot {
    /// Derivation of this type is in progress further up the stack.
    Pending {
        name: Option<&'static str>,
        kind: Kind,
    },
    Ready {
        schema: Schema,
        /// Set once the schema has been written to the store.
        reference: Option<Reference>,
    },
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<String, Slot>,
    names: HashMap<String, Reference>,
}

/// Maps Rust types to schemas and schema names to persisted schema hashes.
///
/// Each registry is an independent context over one object store. Any number
/// of registries can share a store.
pub struct Registry {
    store: Arc<dyn ObjectStore>,
    state: RwLock<RegistryState>,
}

/// Reject names that cannot be bound.
pub fn validate_name(name: &str) -> SchemaResult<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::EmptyName);
    }
    if is_reserved_name(name) {
        return Err(SchemaError::ReservedName(name.to_owned()));
    }
    Ok(())
}

impl Registry {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// The store schemas are persisted to.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Derive the schema of `T`.
    ///
    /// Anonymous types are only cached. Named types, including named types
    /// reached through `T`'s members, are persisted and bound.
    pub fn schema_of<T: Typed>(&self) -> SchemaResult<Schema> {
        let mut state = self.state.write().expect("lock poisoned");
        self.derive(&mut state, &T::type_info())
    }

    /// Derive and persist the schema of `T`, returning its content hash.
    pub fn save_schema<T: Typed>(&self) -> SchemaResult<Reference> {
        let info = T::type_info();
        let mut state = self.state.write().expect("lock poisoned");
        let schema = self.derive(&mut state, &info)?;

        if let Some(Slot::Ready {
            reference: Some(reference),
            ..
        }) = state.slots.get(&info.key)
        {
            return Ok(*reference);
        }

        let saved = self.persist(&schema)?;
        if let Some(Slot::Ready { reference, .. }) = state.slots.get_mut(&info.key) {
            *reference = Some(saved);
        }
        Ok(saved)
    }

    /// Persist the schema of `T` under `name` and bind the name to it.
    ///
    /// Rebinding a name only moves the pointer; schemas persisted under the
    /// previous binding stay readable by hash.
    pub fn register<T: Typed>(&self, name: &str) -> SchemaResult<Reference> {
        validate_name(name)?;
        let mut state = self.state.write().expect("lock poisoned");
        let schema = self.derive(&mut state, &T::type_info())?;
        if schema.is_reference() {
            return Err(SchemaError::InvalidSchema(format!(
                "reference shape cannot be registered as {name:?}"
            )));
        }
        let reference = self.persist(&schema.with_name(name))?;
        bind_locked(&mut state, name, reference);
        Ok(reference)
    }

    /// The schema currently bound to `name`, loaded from the store.
    pub fn schema_by_name(&self, name: &str) -> SchemaResult<Schema> {
        let reference = self.reference_by_name(name)?;
        self.schema_by_reference(&reference)
    }

    /// The hash currently bound to `name`.
    pub fn reference_by_name(&self, name: &str) -> SchemaResult<Reference> {
        let state = self.state.read().expect("lock poisoned");
        state
            .names
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::NotFound(name.to_owned()))
    }

    /// Load and decode the schema stored under `reference`.
    ///
    /// Always reads the store, never the derivation cache, so the result is
    /// exactly what any other holder of these bytes would decode.
    pub fn schema_by_reference(&self, reference: &Reference) -> SchemaResult<Schema> {
        let bytes = self
            .store
            .get(reference)?
            .ok_or(SchemaError::ReferenceNotFound(*reference))?;
        Schema::from_bytes(&bytes)
    }

    /// Bind `name` to a schema already present in the store.
    pub fn bind(&self, name: &str, reference: Reference) -> SchemaResult<()> {
        validate_name(name)?;
        self.schema_by_reference(&reference)?;
        let mut state = self.state.write().expect("lock poisoned");
        bind_locked(&mut state, name, reference);
        Ok(())
    }

    /// Load a persisted named schema and bind it under its own name.
    pub fn adopt(&self, reference: Reference) -> SchemaResult<Schema> {
        let schema = self.schema_by_reference(&reference)?;
        if !schema.is_named() {
            return Err(SchemaError::InvalidSchema(format!(
                "schema {} has no name to bind",
                reference.short_hex()
            )));
        }
        validate_name(schema.name())?;
        let mut state = self.state.write().expect("lock poisoned");
        bind_locked(&mut state, schema.name(), reference);
        Ok(schema)
    }

    /// Snapshot of the name index, sorted by name.
    pub fn names(&self) -> Vec<(String, Reference)> {
        let state = self.state.read().expect("lock poisoned");
        let mut names: Vec<_> = state
            .names
            .iter()
            .map(|(name, reference)| (name.clone(), *reference))
            .collect();
        names.sort();
        names
    }

    /// Follow a link to the schema bound to its name. Other schemas are
    /// returned as they are.
    pub fn resolve(&self, schema: &Schema) -> SchemaResult<Schema> {
        let Shape::Link(kind) = schema.shape() else {
            return Ok(schema.clone());
        };
        let target = self.schema_by_name(schema.name())?;
        target.expect_kind(*kind)?;
        Ok(target)
    }

    fn persist(&self, schema: &Schema) -> SchemaResult<Reference> {
        let bytes = schema.to_bytes()?;
        let reference = self.store.put(&bytes)?;
        debug!(
            schema = schema.name(),
            reference = %reference.short_hex(),
            size = bytes.len(),
            "schema persisted"
        );
        Ok(reference)
    }

    fn derive(&self, state: &mut RegistryState, info: &TypeInfo) -> SchemaResult<Schema> {
        if let Some(slot) = state.slots.get(&info.key) {
            return match slot {
                Slot::Ready { schema, .. } => Ok(schema.clone()),
                Slot::Pending {
                    name: Some(name),
                    kind,
                } => Ok(Schema::link(*name, *kind)),
                Slot::Pending { name: None, .. } => Err(SchemaError::InvalidSchema(format!(
                    "anonymous type {} contains itself",
                    info.key
                ))),
            };
        }

        match &info.kind {
            TypeKind::Reference => return Ok(Schema::reference()),
            TypeKind::References => return Ok(Schema::references()),
            TypeKind::Dynamic => return Ok(Schema::dynamic()),
            TypeKind::Scalar(kind) if info.name.is_none() => return Ok(Schema::scalar(*kind)),
            _ => {}
        }
        let Some(kind) = info.wire_kind() else {
            let reason = match &info.kind {
                TypeKind::Unsupported(reason) => *reason,
                _ => "no wire kind",
            };
            return Err(SchemaError::InvalidSchema(format!("{}: {reason}", info.key)));
        };
        if let Some(name) = info.name {
            validate_name(name)?;
        }

        state.slots.insert(
            info.key.clone(),
            Slot::Pending {
                name: info.name,
                kind,
            },
        );
        match self.build(state, info) {
            Ok((schema, reference)) => {
                state.slots.insert(
                    info.key.clone(),
                    Slot::Ready {
                        schema: schema.clone(),
                        reference,
                    },
                );
                Ok(schema)
            }
            Err(e) => {
                state.slots.remove(&info.key);
                Err(e)
            }
        }
    }

    fn build(
        &self,
        state: &mut RegistryState,
        info: &TypeInfo,
    ) -> SchemaResult<(Schema, Option<Reference>)> {
        let shape = match &info.kind {
            TypeKind::Scalar(kind) => Shape::Scalar(*kind),
            TypeKind::Array { element, length } => {
                let length = u32::try_from(*length).map_err(|_| {
                    SchemaError::InvalidSchema(format!("{}: array too long", info.key))
                })?;
                Shape::Array {
                    element: Box::new(self.nested(state, &element())?),
                    length,
                }
            }
            TypeKind::Slice { element } => Shape::Slice {
                element: Box::new(self.nested(state, &element())?),
            },
            TypeKind::Struct { fields } => {
                let mut seen = HashSet::new();
                let mut built = Vec::with_capacity(fields.len());
                for field in fields {
                    if !seen.insert(field.name) {
                        return Err(SchemaError::InvalidSchema(format!(
                            "{}: duplicate field {}",
                            info.key, field.name
                        )));
                    }
                    let schema = self.nested(state, &(field.ty)())?;
                    built.push(Field::new(field.name, field.tag, schema));
                }
                Shape::Struct { fields: built }
            }
            TypeKind::Reference
            | TypeKind::References
            | TypeKind::Dynamic
            | TypeKind::Unsupported(_) => {
                return Err(SchemaError::InvalidSchema(format!(
                    "{}: no body to build",
                    info.key
                )))
            }
        };

        let Some(name) = info.name else {
            return Ok((Schema::new("", shape), None));
        };
        let schema = Schema::new(name, shape);
        let reference = self.persist(&schema)?;
        bind_locked(state, name, reference);
        Ok((schema, Some(reference)))
    }

    /// Schema of a type used inside another: named types become links.
    fn nested(&self, state: &mut RegistryState, info: &TypeInfo) -> SchemaResult<Schema> {
        let schema = self.derive(state, info)?;
        if schema.is_named() && !schema.is_reference() && !schema.is_link() {
            Ok(Schema::link(schema.name(), schema.kind()))
        } else {
            Ok(schema)
        }
    }
}

fn bind_locked(state: &mut RegistryState, name: &str, reference: Reference) {
    match state.names.insert(name.to_owned(), reference) {
        Some(previous) if previous != reference => info!(
            schema = name,
            from = %previous.short_hex(),
            to = %reference.short_hex(),
            "schema name rebound"
        ),
        Some(_) => {}
        None => debug!(schema = name, reference = %reference.short_hex(), "schema name bound"),
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().expect("lock poisoned");
        f.debug_struct("Registry")
            .field("cached_types", &state.slots.len())
            .field("names", &state.names.len())
            .finish()
    }
}
