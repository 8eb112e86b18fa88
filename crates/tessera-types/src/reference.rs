use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Size of a content hash in bytes.
pub const REFERENCE_SIZE: usize = 32;

/// Content address of one encoded value.
///
/// A `Reference` is the BLAKE3 hash of an object's canonical encoding.
/// Identical encodings always collapse to the same `Reference`, which is what
/// makes objects deduplicatable. Equality and hashing are byte-wise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Reference([u8; REFERENCE_SIZE]);

impl Reference {
    /// Compute the `Reference` of raw encoded bytes.
    pub fn sum(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Wrap a pre-computed hash.
    pub const fn from_hash(hash: [u8; REFERENCE_SIZE]) -> Self {
        Self(hash)
    }

    /// Build a reference from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; REFERENCE_SIZE] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: REFERENCE_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// The blank reference (all zeros). Points to nothing.
    pub const fn blank() -> Self {
        Self([0u8; REFERENCE_SIZE])
    }

    /// Returns `true` if this is the blank reference.
    pub fn is_blank(&self) -> bool {
        self.0 == [0u8; REFERENCE_SIZE]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; REFERENCE_SIZE] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.short_hex())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Reference {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; REFERENCE_SIZE]> for Reference {
    fn from(bytes: [u8; REFERENCE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Reference> for [u8; REFERENCE_SIZE] {
    fn from(r: Reference) -> Self {
        r.0
    }
}

// Human-readable formats (JSON, TOML) carry the hex form; binary formats
// carry the raw bytes.
impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; REFERENCE_SIZE]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Ordered list of references: a one-to-many link.
///
/// On the wire this is a length-prefixed sequence of fixed 32-byte hashes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct References(Vec<Reference>);

impl References {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a reference.
    pub fn push(&mut self, reference: Reference) {
        self.0.push(reference);
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.0.iter()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[Reference] {
        &self.0
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<Reference> {
        self.0
    }
}

impl From<Vec<Reference>> for References {
    fn from(refs: Vec<Reference>) -> Self {
        Self(refs)
    }
}

impl FromIterator<Reference> for References {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for References {
    type Item = Reference;
    type IntoIter = std::vec::IntoIter<Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a References {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sum_is_deterministic() {
        let data = b"hello world";
        assert_eq!(Reference::sum(data), Reference::sum(data));
    }

    #[test]
    fn different_data_produces_different_references() {
        assert_ne!(Reference::sum(b"hello"), Reference::sum(b"world"));
    }

    #[test]
    fn blank_is_all_zeros() {
        let blank = Reference::blank();
        assert!(blank.is_blank());
        assert_eq!(blank, Reference::default());
        assert!(!Reference::sum(b"x").is_blank());
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = Reference::from_slice(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 3
            }
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            Reference::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(Reference::sum(b"test").short_hex().len(), 8);
    }

    #[test]
    fn display_is_full_hex() {
        let r = Reference::sum(b"test");
        let display = format!("{r}");
        assert_eq!(display.len(), 64);
        assert_eq!(display.parse::<Reference>().unwrap(), r);
    }

    #[test]
    fn json_uses_hex() {
        let r = Reference::sum(b"serde test");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, format!("\"{}\"", r.to_hex()));
        let parsed: Reference = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn references_collect_and_iterate_in_order() {
        let a = Reference::sum(b"a");
        let b = Reference::sum(b"b");
        let refs: References = vec![a, b].into_iter().collect();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.as_slice(), &[a, b]);
        let back: Vec<Reference> = refs.into_iter().collect();
        assert_eq!(back, vec![a, b]);
    }

    proptest! {
        #[test]
        fn hex_parse_inverts_display(bytes in proptest::array::uniform32(any::<u8>())) {
            let r = Reference::from_hash(bytes);
            prop_assert_eq!(Reference::from_hex(&r.to_hex()).unwrap(), r);
        }
    }
}
