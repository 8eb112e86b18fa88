//! Persisted encoding of schemas.
//!
//! A schema is stored as its own canonical encoding, in the same namespace
//! as data objects. The record layout is a plain struct:
//!
//! ```text
//! record  = kind:u8  name:string  length:u32  element:[]record  fields:[]field
//! field   = name:string  tag:string  schema:record
//! ```
//!
//! `element` holds zero or one record. Reserved shapes are written with their
//! sentinel names and wire kinds. A nested record whose name is non-empty and
//! not a sentinel is a link to a named type and carries no body.

use std::collections::HashSet;

use tessera_encoding::{Decoder, Encoder};
use tessera_types::REFERENCE_SIZE;

use crate::error::{SchemaError, SchemaResult};
use crate::kind::Kind;
use crate::schema::{Field, Schema, Shape, DYNAMIC_NAME, REFERENCES_NAME, REFERENCE_NAME};

/// Nesting limit for decoding, so hostile bytes cannot exhaust the stack.
pub const MAX_SCHEMA_DEPTH: usize = 64;

impl Schema {
    /// Canonical encoding of this schema.
    pub fn to_bytes(&self) -> SchemaResult<Vec<u8>> {
        let mut enc = Encoder::new();
        encode_record(self, &mut enc)?;
        Ok(enc.into_bytes())
    }

    /// Decode a schema persisted with [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(data: &[u8]) -> SchemaResult<Self> {
        let mut dec = Decoder::new(data);
        let schema = decode_record(&mut dec, 0)?;
        dec.finish()?;
        Ok(schema)
    }
}

fn encode_record(schema: &Schema, enc: &mut Encoder) -> SchemaResult<()> {
    enc.put_u8(schema.kind().code());
    enc.put_str(schema.name())?;

    let length = match schema.length() {
        Ok(length) => u32::try_from(length)
            .map_err(|_| SchemaError::InvalidSchema(format!("array length {length} too large")))?,
        Err(_) => 0,
    };
    enc.put_u32(length);

    match schema.element() {
        Ok(element) => {
            enc.put_len(1)?;
            encode_record(element, enc)?;
        }
        Err(_) => enc.put_len(0)?,
    }

    let fields = schema.fields();
    enc.put_len(fields.len())?;
    for field in fields {
        enc.put_str(field.name())?;
        enc.put_str(field.tag())?;
        encode_record(field.schema(), enc)?;
    }
    Ok(())
}

fn decode_record(dec: &mut Decoder<'_>, depth: usize) -> SchemaResult<Schema> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(invalid(format!("nesting deeper than {MAX_SCHEMA_DEPTH}")));
    }

    let code = dec.get_u8()?;
    let kind = Kind::from_code(code).ok_or_else(|| invalid(format!("unknown kind code {code}")))?;
    let name = dec.get_str()?.to_owned();
    let length = dec.get_u32()?;

    let element = match dec.get_len()? {
        0 => None,
        1 => Some(decode_record(dec, depth + 1)?),
        n => return Err(invalid(format!("{n} element schemas"))),
    };

    let count = dec.get_len()?;
    let mut fields = Vec::with_capacity(count.min(dec.remaining()));
    let mut seen = HashSet::new();
    for _ in 0..count {
        let field_name = dec.get_str()?.to_owned();
        let tag = dec.get_str()?.to_owned();
        let schema = decode_record(dec, depth + 1)?;
        if !seen.insert(field_name.clone()) {
            return Err(invalid(format!("duplicate field {field_name:?}")));
        }
        fields.push(Field::new(field_name, tag, schema));
    }

    let shape = match name.as_str() {
        REFERENCE_NAME => {
            let element_is_byte = element
                .as_ref()
                .is_some_and(|e| e.shape() == &Shape::Scalar(Kind::Uint8));
            if kind != Kind::Array || length as usize != REFERENCE_SIZE || !element_is_byte {
                return Err(invalid("malformed reference shape"));
            }
            Shape::Reference
        }
        REFERENCES_NAME => {
            let element_is_reference = element
                .as_ref()
                .is_some_and(|e| e.shape() == &Shape::Reference);
            if kind != Kind::Slice || !element_is_reference {
                return Err(invalid("malformed reference-list shape"));
            }
            Shape::References
        }
        DYNAMIC_NAME => {
            let well_formed = kind == Kind::Struct
                && fields.len() == 2
                && fields.iter().all(|f| f.schema().shape() == &Shape::Reference);
            if !well_formed {
                return Err(invalid("malformed dynamic shape"));
            }
            Shape::Dynamic
        }
        _ if depth > 0 && !name.is_empty() => {
            if element.is_some() || !fields.is_empty() {
                return Err(invalid(format!("link to {name:?} carries a body")));
            }
            Shape::Link(kind)
        }
        _ => body_shape(kind, length, element, fields)?,
    };

    Ok(Schema::new(name, shape))
}

fn body_shape(
    kind: Kind,
    length: u32,
    element: Option<Schema>,
    fields: Vec<Field>,
) -> SchemaResult<Shape> {
    match kind {
        Kind::Array => {
            let element = element.ok_or_else(|| invalid("array without element"))?;
            Ok(Shape::Array {
                element: Box::new(element),
                length,
            })
        }
        Kind::Slice => {
            let element = element.ok_or_else(|| invalid("slice without element"))?;
            Ok(Shape::Slice {
                element: Box::new(element),
            })
        }
        Kind::Struct => {
            if element.is_some() {
                return Err(invalid("struct with element"));
            }
            Ok(Shape::Struct { fields })
        }
        scalar => {
            if element.is_some() || !fields.is_empty() || length != 0 {
                return Err(invalid(format!("{scalar} with composite parts")));
            }
            Ok(Shape::Scalar(scalar))
        }
    }
}

fn invalid(reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidSchema(reason.into())
}
