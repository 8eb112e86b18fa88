//! Schema-guided walk over raw object bytes.
//!
//! The walker never decodes values. It steps over scalars by width, follows
//! the three reference shapes, and records every reference whose object (or
//! schema) the store does not have. Reference fields name the schema of
//! their targets in the field tag; dynamic references carry it as data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use tessera_encoding::{Decoder, EncodingError};
use tessera_schema::{Kind, Registry, Schema, SchemaError, Shape};
use tessera_store::ObjectStore;
use tessera_types::{Reference, REFERENCE_SIZE};

use crate::error::{WantError, WantResult};
use crate::set::WantSet;

/// Deepest chain of nested values, links, and followed references one walk
/// descends before giving up on the graph.
pub const MAX_WALK_DEPTH: usize = 256;

/// Compute the set of references missing below the root `(schema, object)`.
///
/// Schema and object bytes are read from `store`; the registry resolves the
/// schema names that reference fields and links refer to.
pub fn compute_wants(
    registry: &Registry,
    store: &dyn ObjectStore,
    schema: Reference,
    object: Reference,
) -> WantResult<WantSet> {
    let mut walker = Walker::new(registry, store);
    walker.want_root(schema, object)?;
    Ok(walker.finish())
}

/// How the schema of a walked object was chosen.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Via {
    Stored(Reference),
    Named(String),
}

/// One want computation.
///
/// Name resolutions are memoized for the lifetime of the walker, so a walk
/// sees a single answer for every name even if the registry is rebound
/// while it runs.
pub struct Walker<'a> {
    registry: &'a Registry,
    store: &'a dyn ObjectStore,
    names: HashMap<String, Arc<Schema>>,
    walked: HashSet<(Via, Reference)>,
    wants: WantSet,
    depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(registry: &'a Registry, store: &'a dyn ObjectStore) -> Self {
        Self {
            registry,
            store,
            names: HashMap::new(),
            walked: HashSet::new(),
            wants: WantSet::new(),
            depth: 0,
        }
    }

    pub fn finish(self) -> WantSet {
        self.wants
    }

    /// Walk the object `object` described by the schema stored at `schema`.
    ///
    /// If the schema is missing it is wanted, and so is the object when the
    /// store happens to hold it: without the schema the object cannot be
    /// interpreted, so it is reported rather than walked.
    pub fn want_root(&mut self, schema: Reference, object: Reference) -> WantResult<()> {
        if schema.is_blank() && object.is_blank() {
            return Ok(());
        }
        if !self.walked.insert((Via::Stored(schema), object)) {
            return Ok(());
        }

        let Some(bytes) = self.store.get(&schema)? else {
            debug!(schema = %schema.short_hex(), "schema missing");
            self.wants.insert(schema);
            if self.store.exists(&object)? {
                self.wants.insert(object);
            }
            return Ok(());
        };
        let decoded = Schema::from_bytes(&bytes).map_err(|source| WantError::InvalidSchema {
            reference: schema,
            source,
        })?;
        self.want_by_schema(&decoded, object)
    }

    /// Walk the object `object` described by `schema`, or want it if the
    /// store does not have it.
    pub fn want_by_schema(&mut self, schema: &Schema, object: Reference) -> WantResult<()> {
        let Some(bytes) = self.store.get(&object)? else {
            debug!(object = %object.short_hex(), schema = schema.name(), "object missing");
            self.wants.insert(object);
            return Ok(());
        };

        let mut cursor = Cursor::new(object, &bytes);
        let consumed = self.walk(&mut cursor, schema, None)?;
        cursor.finish()?;
        trace!(object = %object.short_hex(), consumed, "object walked");
        Ok(())
    }

    /// Step over one value of `schema`, returning the bytes it occupies.
    ///
    /// Fails once the walk is nested [`MAX_WALK_DEPTH`] levels deep, counting
    /// across every object reached from the root.
    fn walk(
        &mut self,
        cur: &mut Cursor<'_>,
        schema: &Schema,
        target: Option<&str>,
    ) -> WantResult<usize> {
        if self.depth >= MAX_WALK_DEPTH {
            return Err(cur.too_deep());
        }
        self.depth += 1;
        let walked = self.walk_shape(cur, schema, target);
        self.depth -= 1;
        walked
    }

    fn walk_shape(
        &mut self,
        cur: &mut Cursor<'_>,
        schema: &Schema,
        target: Option<&str>,
    ) -> WantResult<usize> {
        let start = cur.position();
        match schema.shape() {
            Shape::Scalar(kind) => cur.skip_scalar(*kind)?,
            Shape::Reference => {
                let reference = cur.reference()?;
                self.want_target(cur, target, reference)?;
            }
            Shape::References => {
                let count = cur.counted_len(REFERENCE_SIZE)?;
                for i in 0..count {
                    cur.enter(format!("[{i}]"));
                    let reference = cur.reference()?;
                    self.want_target(cur, target, reference)?;
                    cur.leave();
                }
            }
            Shape::Dynamic => {
                let schema_ref = cur.reference()?;
                let object_ref = cur.reference()?;
                self.want_root(schema_ref, object_ref)?;
            }
            Shape::Array { element, length } => {
                self.walk_sequence(cur, element, *length as usize, target)?;
            }
            Shape::Slice { element } => {
                let count = cur.len_prefix()?;
                self.walk_sequence(cur, element, count, target)?;
            }
            Shape::Struct { fields } => {
                for field in fields {
                    cur.enter(field.name().to_owned());
                    self.walk(cur, field.schema(), field.target_schema_name())?;
                    cur.leave();
                }
            }
            Shape::Link(kind) => {
                let resolved = self.named(cur, schema.name(), Some(*kind))?;
                self.walk(cur, &resolved, target)?;
            }
        }
        Ok(cur.position() - start)
    }

    fn walk_sequence(
        &mut self,
        cur: &mut Cursor<'_>,
        element: &Schema,
        count: usize,
        target: Option<&str>,
    ) -> WantResult<()> {
        if let Shape::Scalar(kind) = element.shape() {
            if let Some(width) = kind.fixed_size() {
                return cur.skip_counted(count, width);
            }
        }
        for i in 0..count {
            cur.enter(format!("[{i}]"));
            let consumed = self.walk(cur, element, target)?;
            cur.leave();
            // A zero-width element has no variable parts, so neither has the rest.
            if consumed == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Follow one reference field to its declared target schema.
    ///
    /// A blank reference means "no link" and is neither wanted nor followed.
    fn want_target(
        &mut self,
        cur: &Cursor<'_>,
        target: Option<&str>,
        reference: Reference,
    ) -> WantResult<()> {
        let Some(name) = target else {
            return Err(cur.resolve_error(SchemaError::InvalidSchema(
                "reference has no declared target schema".into(),
            )));
        };
        if reference.is_blank() {
            return Ok(());
        }
        let schema = self.named(cur, name, None)?;
        if !self.walked.insert((Via::Named(name.to_owned()), reference)) {
            return Ok(());
        }
        self.want_by_schema(&schema, reference)
    }

    /// The schema bound to `name`, checked against `kind` when a link asks
    /// for one.
    fn named(
        &mut self,
        cur: &Cursor<'_>,
        name: &str,
        kind: Option<Kind>,
    ) -> WantResult<Arc<Schema>> {
        if let Some(schema) = self.names.get(name) {
            if let Some(kind) = kind {
                schema.expect_kind(kind).map_err(|e| cur.resolve_error(e))?;
            }
            return Ok(Arc::clone(schema));
        }
        let schema = match kind {
            Some(kind) => self.registry.resolve(&Schema::link(name, kind)),
            None => self.registry.schema_by_name(name),
        }
        .map(Arc::new)
        .map_err(|e| cur.resolve_error(e))?;
        self.names.insert(name.to_owned(), Arc::clone(&schema));
        Ok(schema)
    }
}

/// Read position inside one object, with the field path for error context.
struct Cursor<'b> {
    object: Reference,
    dec: Decoder<'b>,
    path: Vec<String>,
}

impl<'b> Cursor<'b> {
    fn new(object: Reference, data: &'b [u8]) -> Self {
        Self {
            object,
            dec: Decoder::new(data),
            path: Vec::new(),
        }
    }

    fn position(&self) -> usize {
        self.dec.position()
    }

    fn enter(&mut self, segment: String) {
        self.path.push(segment);
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    fn path(&self) -> String {
        if self.path.is_empty() {
            return "<root>".into();
        }
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    fn decode_error(&self, source: EncodingError) -> WantError {
        WantError::Decode {
            object: self.object,
            path: self.path(),
            source,
        }
    }

    fn resolve_error(&self, source: SchemaError) -> WantError {
        WantError::Resolve {
            object: self.object,
            path: self.path(),
            source,
        }
    }

    fn too_deep(&self) -> WantError {
        WantError::TooDeep {
            object: self.object,
            path: self.path(),
            limit: MAX_WALK_DEPTH,
        }
    }

    fn skip(&mut self, n: usize) -> WantResult<()> {
        self.dec.skip(n).map_err(|e| self.decode_error(e))
    }

    fn len_prefix(&mut self) -> WantResult<usize> {
        self.dec.get_len().map_err(|e| self.decode_error(e))
    }

    /// Count prefix of a sequence of `width`-byte items, checked against the
    /// bytes that remain.
    fn counted_len(&mut self, width: usize) -> WantResult<usize> {
        self.dec
            .get_counted_len(width)
            .map_err(|e| self.decode_error(e))
    }

    fn skip_counted(&mut self, count: usize, width: usize) -> WantResult<()> {
        let total = count
            .checked_mul(width)
            .ok_or_else(|| self.decode_error(EncodingError::LengthOverflow(count)))?;
        self.skip(total)
    }

    fn skip_scalar(&mut self, kind: Kind) -> WantResult<()> {
        match kind.fixed_size() {
            Some(width) => self.skip(width),
            None if kind == Kind::String => {
                let len = self.len_prefix()?;
                self.skip(len)
            }
            None => Err(self.resolve_error(SchemaError::InvalidSchema(format!(
                "{kind} is not a scalar"
            )))),
        }
    }

    fn reference(&mut self) -> WantResult<Reference> {
        self.dec
            .take_array::<REFERENCE_SIZE>()
            .map(Reference::from_hash)
            .map_err(|e| self.decode_error(e))
    }

    fn finish(&self) -> WantResult<()> {
        self.dec.finish().map_err(|e| self.decode_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_encoding::encode_to_vec;
    use tessera_schema::{object, Field};
    use tessera_store::InMemoryObjectStore;
    use tessera_types::{Dynamic, References};

    object! {
        #[object(name = "Note")]
        #[derive(Debug, Clone, Default)]
        pub struct Note {
            pub name: String,
        }
    }

    object! {
        #[object(name = "Folder")]
        #[derive(Debug, Clone, Default)]
        pub struct Folder {
            pub title: String,
            pub sizes: Vec<u64>,
            pub labels: Vec<String>,
            #[schema = "Note"]
            pub notes: References,
            #[schema = "Note"]
            pub pinned: Reference,
            pub attachment: Dynamic,
        }
    }

    object! {
        #[object(name = "Shelf")]
        #[derive(Debug, Clone, Default)]
        pub struct Shelf {
            pub folders: Vec<Folder>,
            #[schema = "Note"]
            pub spotlight: [Reference; 2],
        }
    }

    object! {
        #[object(name = "Loose")]
        #[derive(Debug, Clone, Default)]
        pub struct Loose {
            pub target: Reference,
        }
    }

    struct Fixture {
        store: Arc<InMemoryObjectStore>,
        registry: Registry,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryObjectStore::new());
            let registry = Registry::new(store.clone());
            registry.schema_of::<Note>().unwrap();
            Self { store, registry }
        }

        fn put<T: tessera_encoding::Encode>(&self, value: &T) -> Reference {
            self.store.put(&encode_to_vec(value).unwrap()).unwrap()
        }

        fn wants(&self, schema: Reference, object: Reference) -> WantResult<WantSet> {
            compute_wants(&self.registry, self.store.as_ref(), schema, object)
        }
    }

    fn note(name: &str) -> Note {
        Note { name: name.into() }
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn complete_graph_wants_nothing() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Note>().unwrap();
        let object = fx.put(&note("a"));
        assert!(fx.wants(schema, object).unwrap().is_empty());
    }

    #[test]
    fn missing_schema_is_wanted_alone() {
        let fx = Fixture::new();
        let schema = Reference::sum(b"no such schema");
        let object = Reference::sum(b"no such object");
        let wants = fx.wants(schema, object).unwrap();
        assert_eq!(wants.into_sorted_vec(), vec![schema]);
    }

    #[test]
    fn missing_schema_with_present_object_wants_both() {
        // Documented quirk: the present object is reported alongside the
        // missing schema, while an absent object would not be.
        let fx = Fixture::new();
        let schema = Reference::sum(b"no such schema");
        let object = fx.put(&note("orphan"));
        let wants = fx.wants(schema, object).unwrap();
        assert_eq!(wants.len(), 2);
        assert!(wants.contains(&schema));
        assert!(wants.contains(&object));
    }

    #[test]
    fn reference_list_wants_only_absent_members() {
        let fx = Fixture::new();
        let present = [fx.put(&note("one")), fx.put(&note("two"))];
        let absent = Reference::sum(&encode_to_vec(&note("three")).unwrap());

        let folder = Folder {
            title: "inbox".into(),
            notes: vec![present[0], absent, present[1]].into(),
            ..Default::default()
        };
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let object = fx.put(&folder);

        let wants = fx.wants(schema, object).unwrap();
        assert_eq!(wants.into_sorted_vec(), vec![absent]);
    }

    #[test]
    fn dynamic_with_present_schema_wants_object_only() {
        let fx = Fixture::new();
        let note_schema = fx.registry.save_schema::<Note>().unwrap();
        let missing_note = Reference::sum(b"not stored");

        let folder = Folder {
            attachment: Dynamic::new(note_schema, missing_note),
            ..Default::default()
        };
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let object = fx.put(&folder);

        let wants = fx.wants(schema, object).unwrap();
        assert_eq!(wants.into_sorted_vec(), vec![missing_note]);
    }

    #[test]
    fn recursive_type_walks_to_completion() {
        object! {
            #[object(name = "Node")]
            #[derive(Debug, Clone, Default)]
            pub struct Node {
                pub children: Vec<Node>,
                #[schema = "Node"]
                pub next: References,
            }
        }

        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Node>().unwrap();
        assert_eq!(fx.registry.reference_by_name("Node").unwrap(), schema);
        assert_eq!(
            fx.registry.schema_by_name("Node").unwrap(),
            fx.registry.schema_by_reference(&schema).unwrap()
        );

        let leaf = fx.put(&Node::default());
        let missing = Reference::sum(b"elsewhere");
        let tree = Node {
            children: vec![Node {
                children: vec![Node::default()],
                next: vec![leaf, missing].into(),
            }],
            next: References::new(),
        };
        let object = fx.put(&tree);
        assert_eq!(fx.wants(schema, object).unwrap().into_sorted_vec(), vec![missing]);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[test]
    fn wants_are_idempotent() {
        let fx = Fixture::new();
        let folder = Folder {
            notes: vec![Reference::sum(b"x"), Reference::sum(b"y")].into(),
            pinned: Reference::sum(b"z"),
            ..Default::default()
        };
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let object = fx.put(&folder);

        let first = fx.wants(schema, object).unwrap();
        let second = fx.wants(schema, object).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn absent_root_object_is_wanted_without_interpretation() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let object = Reference::sum(b"absent folder");
        assert_eq!(fx.wants(schema, object).unwrap().into_sorted_vec(), vec![object]);
    }

    #[test]
    fn filling_the_store_empties_the_wants() {
        let fx = Fixture::new();
        let child = note("later");
        let child_ref = Reference::sum(&encode_to_vec(&child).unwrap());
        let folder = Folder {
            pinned: child_ref,
            ..Default::default()
        };
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let object = fx.put(&folder);

        assert!(fx.wants(schema, object).unwrap().contains(&child_ref));
        fx.put(&child);
        assert!(fx.wants(schema, object).unwrap().is_empty());
    }

    #[test]
    fn blank_references_are_not_followed() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let object = fx.put(&Folder::default());
        assert!(fx.wants(schema, object).unwrap().is_empty());
        assert!(fx
            .wants(Reference::blank(), Reference::blank())
            .unwrap()
            .is_empty());
    }

    // -----------------------------------------------------------------------
    // Walk mechanics
    // -----------------------------------------------------------------------

    #[test]
    fn scalars_and_strings_are_skipped_in_nested_sequences() {
        let fx = Fixture::new();
        let missing = Reference::sum(b"deep");
        let shelf = Shelf {
            folders: vec![
                Folder {
                    title: "first".into(),
                    sizes: vec![1, 2, 3],
                    labels: vec!["a".into(), "bb".into()],
                    ..Default::default()
                },
                Folder {
                    title: "second".into(),
                    pinned: missing,
                    ..Default::default()
                },
            ],
            spotlight: [Reference::blank(), Reference::blank()],
        };
        let schema = fx.registry.save_schema::<Shelf>().unwrap();
        let object = fx.put(&shelf);
        assert_eq!(fx.wants(schema, object).unwrap().into_sorted_vec(), vec![missing]);
    }

    #[test]
    fn array_of_references_uses_field_target() {
        let fx = Fixture::new();
        let present = fx.put(&note("here"));
        let missing = Reference::sum(b"spot");
        let shelf = Shelf {
            spotlight: [present, missing],
            ..Default::default()
        };
        let schema = fx.registry.save_schema::<Shelf>().unwrap();
        let object = fx.put(&shelf);
        assert_eq!(fx.wants(schema, object).unwrap().into_sorted_vec(), vec![missing]);
    }

    #[test]
    fn reference_without_target_is_invalid() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Loose>().unwrap();
        let object = fx.put(&Loose {
            target: Reference::sum(b"anything"),
        });
        let err = fx.wants(schema, object).unwrap_err();
        assert!(err.is_invalid_schema(), "{err}");
        assert!(err.to_string().contains("target"), "{err}");
    }

    #[test]
    fn unbound_target_name_is_invalid() {
        let fx = Fixture::new();
        let schema = Schema::new(
            "Orphaned",
            Shape::Struct {
                fields: vec![Field::new("to", "schema=Nowhere", Schema::reference())],
            },
        );
        let schema_ref = fx.store.put(&schema.to_bytes().unwrap()).unwrap();
        let object = fx.store.put(Reference::sum(b"t").as_bytes()).unwrap();
        let err = fx.wants(schema_ref, object).unwrap_err();
        assert!(matches!(
            err,
            WantError::Resolve {
                source: SchemaError::NotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn truncated_object_is_a_decode_error() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let mut bytes = encode_to_vec(&Folder {
            title: "cut short".into(),
            ..Default::default()
        })
        .unwrap();
        bytes.truncate(bytes.len() - 10);
        let object = fx.store.put(&bytes).unwrap();

        let err = fx.wants(schema, object).unwrap_err();
        assert!(err.is_truncated(), "{err}");
        match err {
            WantError::Decode { object: o, path, .. } => {
                assert_eq!(o, object);
                assert_eq!(path, "attachment");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn oversized_length_prefix_does_not_panic() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Note>().unwrap();
        let object = fx.store.put(&u32::MAX.to_le_bytes()).unwrap();
        assert!(fx.wants(schema, object).unwrap_err().is_truncated());
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Note>().unwrap();
        let mut bytes = encode_to_vec(&note("x")).unwrap();
        bytes.push(0);
        let object = fx.store.put(&bytes).unwrap();
        assert!(matches!(
            fx.wants(schema, object),
            Err(WantError::Decode {
                source: EncodingError::TrailingBytes(1),
                ..
            })
        ));
    }

    #[test]
    fn deeply_nested_object_is_rejected_without_overflow() {
        object! {
            #[object(name = "Deep")]
            #[derive(Debug, Clone, Default)]
            pub struct Deep {
                pub children: Vec<Deep>,
            }
        }

        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Deep>().unwrap();

        let mut nested = Deep::default();
        for _ in 0..40 {
            nested = Deep {
                children: vec![nested],
            };
        }
        let object = fx.put(&nested);
        assert!(fx.wants(schema, object).unwrap().is_empty());

        // Every level claims one child, so the bytes nest far past the limit.
        let mut bytes = 1u32.to_le_bytes().repeat(20_000);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let object = fx.store.put(&bytes).unwrap();
        match fx.wants(schema, object).unwrap_err() {
            WantError::TooDeep {
                object: o,
                path,
                limit,
            } => {
                assert_eq!(o, object);
                assert_eq!(limit, MAX_WALK_DEPTH);
                assert!(path.starts_with("children[0].children[0]"), "{path}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn long_dynamic_chain_hits_the_depth_limit() {
        object! {
            #[object(name = "Hop")]
            #[derive(Debug, Clone, Default)]
            pub struct Hop {
                pub next: Dynamic,
            }
        }

        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Hop>().unwrap();
        let mut next = Dynamic::default();
        for _ in 0..MAX_WALK_DEPTH {
            let object = fx.put(&Hop { next });
            next = Dynamic::new(schema, object);
        }
        let err = fx.wants(next.schema, next.object).unwrap_err();
        assert!(matches!(err, WantError::TooDeep { .. }), "{err}");
    }

    #[test]
    fn link_to_a_rebound_name_of_another_kind_is_invalid() {
        object! {
            #[object(name = "Chain")]
            #[derive(Debug, Clone, Default)]
            pub struct Chain {
                pub rest: Vec<Chain>,
            }
        }

        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Chain>().unwrap();
        let object = fx.put(&Chain {
            rest: vec![Chain::default()],
        });
        fx.registry.register::<Vec<u8>>("Chain").unwrap();

        let err = fx.wants(schema, object).unwrap_err();
        assert!(err.is_invalid_schema(), "{err}");
        assert!(err.to_string().contains("expects struct"), "{err}");
    }

    #[test]
    fn corrupt_schema_object_is_invalid() {
        let fx = Fixture::new();
        let schema = fx.store.put(b"\xffnot a schema").unwrap();
        let object = fx.put(&note("n"));
        assert!(matches!(
            fx.wants(schema, object),
            Err(WantError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn walk_uses_one_resolution_per_name() {
        let fx = Fixture::new();
        let schema = fx.registry.save_schema::<Folder>().unwrap();
        let note_ref = fx.put(&note("kept"));
        let object = fx.put(&Folder {
            pinned: note_ref,
            ..Default::default()
        });

        let mut walker = Walker::new(&fx.registry, fx.store.as_ref());
        walker.want_root(schema, object).unwrap();

        // Rebinding mid-walk does not change what this walker resolves.
        fx.registry.register::<Folder>("Note").unwrap();
        let other = fx.put(&note("other"));
        let again = fx.put(&Folder {
            pinned: other,
            title: "again".into(),
            ..Default::default()
        });
        walker.want_root(schema, again).unwrap();
        assert!(walker.finish().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
                let fx = Fixture::new();
                let schema = fx.registry.save_schema::<Shelf>().unwrap();
                let object = fx.store.put(&data).unwrap();
                let _ = fx.wants(schema, object);
            }

            #[test]
            fn present_references_are_never_wanted(names in proptest::collection::vec("[a-z]{1,8}", 0..8)) {
                let fx = Fixture::new();
                let refs: Vec<Reference> = names.iter().map(|n| fx.put(&note(n))).collect();
                let schema = fx.registry.save_schema::<Folder>().unwrap();
                let object = fx.put(&Folder { notes: refs.into(), ..Default::default() });
                prop_assert!(fx.wants(schema, object).unwrap().is_empty());
            }
        }
    }
}
