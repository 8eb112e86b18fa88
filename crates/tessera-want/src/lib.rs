//! Missing-object discovery for tessera.
//!
//! Given a root `(schema, object)` pair, the walker steps through the
//! object's raw bytes as its schema describes, follows every reference it
//! finds, and collects the hashes the local store does not hold. The result
//! is exactly what a peer has to send before the root's graph can be read
//! locally.
//!
//! # Key Types
//!
//! - [`Walker`] / [`compute_wants`] -- the walk itself
//! - [`WantSet`] -- deduplicated result
//! - [`Container`] -- registry + store + current root, with save helpers

pub mod container;
pub mod error;
pub mod set;
pub mod walker;

pub use container::Container;
pub use error::{WantError, WantResult};
pub use set::WantSet;
pub use walker::{compute_wants, Walker, MAX_WALK_DEPTH};
