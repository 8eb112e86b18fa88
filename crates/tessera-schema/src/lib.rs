//! Schemas for tessera: describing, naming, and content-addressing the shape
//! of stored values.
//!
//! A [`Schema`] tells the want walker how to step through an object's bytes
//! without decoding it. Schemas are derived from Rust types that implement
//! [`Typed`] (usually through the [`object!`] macro), and named schemas are
//! persisted into the same object store as the data they describe.
//!
//! # Modules
//!
//! - [`kind`] -- wire kinds
//! - [`schema`] -- [`Schema`], [`Shape`], [`Field`] and the reserved reference shapes
//! - [`record`] -- persisted schema encoding
//! - [`typed`] -- [`Typed`] descriptors for Rust types
//! - [`registry`] -- [`Registry`]: derivation cache and name index

pub mod error;
pub mod kind;
mod macros;
pub mod record;
pub mod registry;
pub mod schema;
pub mod typed;

pub use tessera_encoding as encoding;

pub use error::{SchemaError, SchemaResult};
pub use kind::Kind;
pub use record::MAX_SCHEMA_DEPTH;
pub use registry::{validate_name, Registry};
pub use schema::{
    is_reserved_name, Field, Schema, Shape, DYNAMIC_NAME, REFERENCES_NAME, REFERENCE_NAME,
    TAG_SCHEMA_KEY,
};
pub use typed::{FieldInfo, TypeInfo, TypeKind, Typed};
