//! Static type descriptors.
//!
//! A Rust type opts into schema derivation by implementing [`Typed`]. The
//! descriptor it returns is plain data: the registry turns it into a
//! [`Schema`](crate::Schema), caching by [`TypeInfo::key`]. Element and field
//! types are function pointers so a type can mention itself.

use tessera_types::{Dynamic, Reference, References};

use crate::kind::Kind;

/// A type with a describable shape.
pub trait Typed {
    fn type_info() -> TypeInfo;
}

/// Shape description of one Rust type.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    /// Stable identity of the type, used as the derivation cache key.
    pub key: String,
    /// Explicit name. Only named types are persisted and bound.
    pub name: Option<&'static str>,
    pub kind: TypeKind,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Scalar(Kind),
    Array {
        element: fn() -> TypeInfo,
        length: usize,
    },
    Slice {
        element: fn() -> TypeInfo,
    },
    Struct {
        fields: Vec<FieldInfo>,
    },
    Reference,
    References,
    Dynamic,
    /// A type with no wire representation; deriving it fails.
    Unsupported(&'static str),
}

/// One member of a struct descriptor.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: &'static str,
    pub tag: &'static str,
    pub ty: fn() -> TypeInfo,
}

impl TypeInfo {
    /// Descriptor for an anonymous type.
    pub fn anonymous(key: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            key: key.into(),
            name: None,
            kind,
        }
    }

    /// Descriptor for an explicitly named type.
    pub fn named(key: impl Into<String>, name: &'static str, kind: TypeKind) -> Self {
        Self {
            key: key.into(),
            name: Some(name),
            kind,
        }
    }

    /// Wire kind this descriptor will derive to, if it derives at all.
    pub fn wire_kind(&self) -> Option<Kind> {
        match &self.kind {
            TypeKind::Scalar(kind) => Some(*kind),
            TypeKind::Array { .. } | TypeKind::Reference => Some(Kind::Array),
            TypeKind::Slice { .. } | TypeKind::References => Some(Kind::Slice),
            TypeKind::Struct { .. } | TypeKind::Dynamic => Some(Kind::Struct),
            TypeKind::Unsupported(_) => None,
        }
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::anonymous(Kind::$kind.as_str(), TypeKind::Scalar(Kind::$kind))
                }
            }
        )*
    };
}

impl_scalar!(
    bool => Bool,
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => Uint8, u16 => Uint16, u32 => Uint32, u64 => Uint64,
    f32 => Float32, f64 => Float64,
    String => String,
);

macro_rules! impl_unsupported {
    ($($ty:ty => $reason:literal),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::anonymous(stringify!($ty), TypeKind::Unsupported($reason))
                }
            }
        )*
    };
}

impl_unsupported!(
    usize => "usize has no fixed width",
    isize => "isize has no fixed width",
    char => "char has no wire kind",
    () => "unit has no wire representation",
);

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> TypeInfo {
        let element = T::type_info();
        TypeInfo::anonymous(
            format!("[]{}", element.key),
            TypeKind::Slice {
                element: T::type_info,
            },
        )
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> TypeInfo {
        let element = T::type_info();
        TypeInfo::anonymous(
            format!("[{N}]{}", element.key),
            TypeKind::Array {
                element: T::type_info,
                length: N,
            },
        )
    }
}

impl Typed for Reference {
    fn type_info() -> TypeInfo {
        TypeInfo::anonymous("reference", TypeKind::Reference)
    }
}

impl Typed for References {
    fn type_info() -> TypeInfo {
        TypeInfo::anonymous("reference-list", TypeKind::References)
    }
}

impl Typed for Dynamic {
    fn type_info() -> TypeInfo {
        TypeInfo::anonymous("dynamic", TypeKind::Dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_keys_nest_element_keys() {
        assert_eq!(<Vec<String>>::type_info().key, "[]string");
        assert_eq!(<[u8; 4]>::type_info().key, "[4]uint8");
        assert_eq!(<Vec<[i16; 2]>>::type_info().key, "[][2]int16");
    }

    #[test]
    fn elements_are_described_lazily() {
        let info = <Vec<Reference>>::type_info();
        match info.kind {
            TypeKind::Slice { element } => {
                assert!(matches!(element().kind, TypeKind::Reference));
            }
            other => panic!("expected slice, got {other:?}"),
        }
    }

    #[test]
    fn machine_words_are_unsupported() {
        for info in [usize::type_info(), isize::type_info(), <()>::type_info()] {
            assert!(matches!(info.kind, TypeKind::Unsupported(_)));
            assert_eq!(info.wire_kind(), None);
        }
    }

    #[test]
    fn reference_shapes_are_anonymous() {
        for info in [
            Reference::type_info(),
            References::type_info(),
            Dynamic::type_info(),
        ] {
            assert!(info.name.is_none());
        }
        assert_eq!(Dynamic::type_info().wire_kind(), Some(Kind::Struct));
    }
}
