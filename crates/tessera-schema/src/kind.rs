use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire kind of a schema: the primitive tag that decides the byte layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    /// Fixed-length homogeneous sequence.
    Array,
    /// Variable-length homogeneous sequence.
    Slice,
    /// Ordered product of named fields.
    Struct,
}

impl Kind {
    const ALL: [Kind; 15] = [
        Kind::Bool,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Float32,
        Kind::Float64,
        Kind::String,
        Kind::Array,
        Kind::Slice,
        Kind::Struct,
    ];

    /// Byte used for this kind in persisted schemas. Zero is never valid.
    pub fn code(self) -> u8 {
        Self::ALL
            .iter()
            .position(|k| *k == self)
            .map_or(0, |i| i as u8 + 1)
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    /// Encoded width of fixed-size scalars; `None` for strings and composites.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Kind::Bool | Kind::Int8 | Kind::Uint8 => Some(1),
            Kind::Int16 | Kind::Uint16 => Some(2),
            Kind::Int32 | Kind::Uint32 | Kind::Float32 => Some(4),
            Kind::Int64 | Kind::Uint64 | Kind::Float64 => Some(8),
            Kind::String | Kind::Array | Kind::Slice | Kind::Struct => None,
        }
    }

    /// Scalars (including strings) can never contain references.
    pub fn is_flat(self) -> bool {
        !matches!(self, Kind::Array | Kind::Slice | Kind::Struct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Slice => "slice",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
