//! Replication for tessera.
//!
//! A [`Replicator`] brings one root's object graph into the local store: it
//! computes the want set, asks an [`ObjectSource`] for exactly those hashes,
//! verifies what comes back, and repeats until nothing is missing. Every
//! received object is checked against the hash it was requested under
//! before it is stored.

pub mod error;
pub mod replicator;
pub mod transport;
pub mod types;
pub mod verifier;

pub use error::{SyncError, SyncResult};
pub use replicator::Replicator;
pub use transport::{ObjectSource, StoreSource};
pub use types::{FillReport, Rejection, RejectReason, ReplicatorConfig, VerificationReport};
pub use verifier::ObjectVerifier;
