use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reference::Reference;

/// A reference to an object together with a reference to its schema.
///
/// The concrete type of the target is only known at read time, by loading
/// the schema `schema` points to. This is how polymorphic values are stored,
/// and it is also the shape of a root: the entry point of a walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dynamic {
    /// Reference to the schema describing the object.
    pub schema: Reference,
    /// Reference to the object's encoded bytes.
    pub object: Reference,
}

impl Dynamic {
    /// Pair a schema reference with an object reference.
    pub const fn new(schema: Reference, object: Reference) -> Self {
        Self { schema, object }
    }

    /// Returns `true` if both halves are blank.
    pub fn is_blank(&self) -> bool {
        self.schema.is_blank() && self.object.is_blank()
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.schema.short_hex(), self.object.short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_blank() {
        assert!(Dynamic::default().is_blank());
    }

    #[test]
    fn exposes_components() {
        let s = Reference::sum(b"schema");
        let o = Reference::sum(b"object");
        let d = Dynamic::new(s, o);
        assert_eq!(d.schema, s);
        assert_eq!(d.object, o);
        assert!(!d.is_blank());
    }

    #[test]
    fn display_uses_short_hex() {
        let d = Dynamic::new(Reference::sum(b"s"), Reference::sum(b"o"));
        let shown = d.to_string();
        assert_eq!(shown.len(), 17);
        assert!(shown.contains(':'));
    }
}
