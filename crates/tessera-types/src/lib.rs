//! Reference types for the tessera object store.
//!
//! Every value tessera stores is addressed by the BLAKE3 hash of its canonical
//! encoding. Structural links between stored values are expressed with the
//! three reference shapes defined here.
//!
//! # Key Types
//!
//! - [`Reference`] -- content hash of one encoded value
//! - [`References`] -- ordered list of references (one-to-many link)
//! - [`Dynamic`] -- schema reference + object reference (polymorphic link)

pub mod dynamic;
pub mod error;
pub mod reference;

pub use dynamic::Dynamic;
pub use error::TypeError;
pub use reference::{Reference, References, REFERENCE_SIZE};
