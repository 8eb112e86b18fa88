use std::collections::HashSet;

use tessera_types::Reference;

use crate::types::{Rejection, RejectReason, VerificationReport};

/// Checks objects received from a source before they are stored.
pub struct ObjectVerifier;

impl ObjectVerifier {
    /// Split `received` into objects that answer `requested` and objects to
    /// throw away. With `check_hashes` off only the request check is made.
    pub fn verify_batch(
        requested: &[Reference],
        received: Vec<(Reference, Vec<u8>)>,
        check_hashes: bool,
    ) -> VerificationReport {
        let requested: HashSet<&Reference> = requested.iter().collect();
        let mut seen = HashSet::new();
        let mut report = VerificationReport::default();

        for (reference, data) in received {
            let reason = if !requested.contains(&reference) {
                Some(RejectReason::Unrequested)
            } else if !seen.insert(reference) {
                Some(RejectReason::Duplicate)
            } else if check_hashes {
                let computed = Reference::sum(&data);
                (computed != reference).then_some(RejectReason::HashMismatch { computed })
            } else {
                None
            };

            match reason {
                Some(reason) => report.rejected.push(Rejection { reference, reason }),
                None => report.accepted.push((reference, data)),
            }
        }
        report
    }
}
