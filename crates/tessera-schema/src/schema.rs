//! In-memory schema model.
//!
//! A [`Schema`] is a name plus a [`Shape`]. The three reserved reference
//! shapes are distinct variants, fixed when the schema is built or decoded,
//! so nothing downstream has to compare names to find them. Their sentinel
//! names only exist on the wire.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use tessera_types::REFERENCE_SIZE;

use crate::error::{SchemaError, SchemaResult};
use crate::kind::Kind;

/// Sentinel name of the single-reference shape.
pub const REFERENCE_NAME: &str = "reference";
/// Sentinel name of the reference-list shape.
pub const REFERENCES_NAME: &str = "reference-list";
/// Sentinel name of the dynamic-reference shape.
pub const DYNAMIC_NAME: &str = "dynamic";

/// Field tag key naming the schema a reference field points to.
pub const TAG_SCHEMA_KEY: &str = "schema";

/// Returns `true` for the three names reserved for reference shapes.
pub fn is_reserved_name(name: &str) -> bool {
    matches!(name, REFERENCE_NAME | REFERENCES_NAME | DYNAMIC_NAME)
}

/// The structure of a schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Bool, fixed-width number, or string.
    Scalar(Kind),
    /// `length` elements, no prefix.
    Array { element: Box<Schema>, length: u32 },
    /// Count-prefixed elements.
    Slice { element: Box<Schema> },
    /// Fields in wire order.
    Struct { fields: Vec<Field> },
    /// One 32-byte hash.
    Reference,
    /// Count-prefixed 32-byte hashes.
    References,
    /// Schema hash + object hash.
    Dynamic,
    /// A named type defined elsewhere, resolved by name through the registry.
    /// Carries the wire kind of the target.
    Link(Kind),
}

/// Description of one type's shape, optionally named.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Schema {
    name: String,
    shape: Shape,
}

/// A member of a struct schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    tag: String,
    schema: Schema,
}

fn byte_schema() -> &'static Schema {
    static BYTE: OnceLock<Schema> = OnceLock::new();
    BYTE.get_or_init(|| Schema::scalar(Kind::Uint8))
}

fn reference_schema() -> &'static Schema {
    static REFERENCE: OnceLock<Schema> = OnceLock::new();
    REFERENCE.get_or_init(Schema::reference)
}

fn dynamic_fields() -> &'static [Field] {
    static FIELDS: OnceLock<Vec<Field>> = OnceLock::new();
    FIELDS.get_or_init(|| {
        vec![
            Field::new("schema", "", Schema::reference()),
            Field::new("object", "", Schema::reference()),
        ]
    })
}

impl Schema {
    /// Build a schema from parts. The name is empty for anonymous types.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Anonymous scalar schema.
    pub fn scalar(kind: Kind) -> Self {
        Self::new("", Shape::Scalar(kind))
    }

    /// The single-reference shape.
    pub fn reference() -> Self {
        Self::new(REFERENCE_NAME, Shape::Reference)
    }

    /// The reference-list shape.
    pub fn references() -> Self {
        Self::new(REFERENCES_NAME, Shape::References)
    }

    /// The dynamic-reference shape.
    pub fn dynamic() -> Self {
        Self::new(DYNAMIC_NAME, Shape::Dynamic)
    }

    /// A link to the named type `name` of wire kind `kind`.
    pub fn link(name: impl Into<String>, kind: Kind) -> Self {
        Self::new(name, Shape::Link(kind))
    }

    /// The same shape under another name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Returns `true` for the single, list, and dynamic reference shapes.
    pub fn is_reference(&self) -> bool {
        matches!(
            self.shape,
            Shape::Reference | Shape::References | Shape::Dynamic
        )
    }

    pub fn is_link(&self) -> bool {
        matches!(self.shape, Shape::Link(_))
    }

    /// Wire kind. Reference shapes report the kind they are laid out as.
    pub fn kind(&self) -> Kind {
        match &self.shape {
            Shape::Scalar(kind) | Shape::Link(kind) => *kind,
            Shape::Array { .. } | Shape::Reference => Kind::Array,
            Shape::Slice { .. } | Shape::References => Kind::Slice,
            Shape::Struct { .. } | Shape::Dynamic => Kind::Struct,
        }
    }

    /// Error unless this schema has the `expected` kind, as a link to its
    /// name requires.
    pub fn expect_kind(&self, expected: Kind) -> SchemaResult<()> {
        if self.kind() == expected {
            return Ok(());
        }
        Err(SchemaError::InvalidSchema(format!(
            "link to {} expects {expected}, bound schema is {}",
            self.name,
            self.kind()
        )))
    }

    /// Element schema of an array or slice.
    pub fn element(&self) -> SchemaResult<&Schema> {
        match &self.shape {
            Shape::Array { element, .. } | Shape::Slice { element } => Ok(element),
            Shape::Reference => Ok(byte_schema()),
            Shape::References => Ok(reference_schema()),
            _ => Err(self.not_applicable("element")),
        }
    }

    /// Fixed element count of an array.
    pub fn length(&self) -> SchemaResult<usize> {
        match &self.shape {
            Shape::Array { length, .. } => Ok(*length as usize),
            Shape::Reference => Ok(REFERENCE_SIZE),
            _ => Err(self.not_applicable("length")),
        }
    }

    /// Fields of a struct in wire order; empty for everything else.
    pub fn fields(&self) -> &[Field] {
        match &self.shape {
            Shape::Struct { fields } => fields,
            Shape::Dynamic => dynamic_fields(),
            _ => &[],
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    fn not_applicable(&self, operation: &'static str) -> SchemaError {
        SchemaError::NotApplicable {
            operation,
            kind: self.kind(),
        }
    }

    fn fmt_type(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::Scalar(kind) => write!(f, "{kind}"),
            Shape::Array { element, length } => {
                write!(f, "[{length}]")?;
                element.fmt_ref(f)
            }
            Shape::Slice { element } => {
                write!(f, "[]")?;
                element.fmt_ref(f)
            }
            Shape::Struct { fields } => {
                write!(f, "struct {{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {field}")?;
                }
                write!(f, " }}")
            }
            Shape::Reference | Shape::References | Shape::Dynamic | Shape::Link(_) => {
                write!(f, "{}", self.name)
            }
        }
    }

    // Nested occurrence: named types print by name only.
    fn fmt_ref(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_named() {
            write!(f, "{}", self.name)
        } else {
            self.fmt_type(f)
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_named() && !self.is_reference() && !self.is_link() {
            write!(f, "{} ", self.name)?;
        }
        self.fmt_type(f)
    }
}

impl Field {
    pub fn new(name: impl Into<String>, tag: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Side-channel metadata, e.g. `schema=User`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn kind(&self) -> Kind {
        self.schema.kind()
    }

    /// Returns `true` if the field holds one of the reference shapes.
    pub fn is_reference(&self) -> bool {
        self.schema.is_reference()
    }

    /// Name of the schema the field's references point to, from a
    /// `schema=<Name>` entry in the tag.
    pub fn target_schema_name(&self) -> Option<&str> {
        self.tag
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|part| part.split_once('='))
            .find(|(key, _)| *key == TAG_SCHEMA_KEY)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name)?;
        self.schema.fmt_ref(f)?;
        if !self.tag.is_empty() {
            write!(f, " `{}`", self.tag)?;
        }
        Ok(())
    }
}
