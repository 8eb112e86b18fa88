use serde::{Deserialize, Serialize};

use tessera_types::Reference;

/// Limits for one replication run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicatorConfig {
    /// Maximum number of want/fetch rounds before giving up.
    pub max_rounds: usize,
    /// Maximum number of references requested in one fetch.
    pub batch_size: usize,
    /// Check every received object against the hash it was requested under.
    pub verify_hashes: bool,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 64,
            batch_size: 256,
            verify_hashes: true,
        }
    }
}

/// Outcome of [`Replicator::fill`](crate::Replicator::fill).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Fetch rounds performed.
    pub rounds: usize,
    /// Objects received and stored.
    pub received: usize,
    /// Objects received and thrown away.
    pub rejected: usize,
    /// Schema names newly bound from the source.
    pub names_bound: usize,
    /// `true` if nothing below the root is missing any more.
    pub complete: bool,
    /// What was still missing when the run stopped.
    pub missing: Vec<Reference>,
}

/// Why a received object was thrown away.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The object was not asked for.
    Unrequested,
    /// The bytes hash to something other than the reference they came with.
    HashMismatch { computed: Reference },
    /// The same reference arrived twice in one batch.
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reference: Reference,
    pub reason: RejectReason,
}

/// Result of checking one received batch.
#[derive(Clone, Debug, Default)]
pub struct VerificationReport {
    pub accepted: Vec<(Reference, Vec<u8>)>,
    pub rejected: Vec<Rejection>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
