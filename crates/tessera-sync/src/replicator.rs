use std::sync::Arc;

use tracing::{debug, info, warn};

use tessera_schema::Registry;
use tessera_store::ObjectStore;
use tessera_types::{Dynamic, Reference};
use tessera_want::compute_wants;

use crate::error::SyncResult;
use crate::transport::ObjectSource;
use crate::types::{FillReport, ReplicatorConfig};
use crate::verifier::ObjectVerifier;

/// Pulls the objects a root is missing from an [`ObjectSource`].
pub struct Replicator {
    registry: Arc<Registry>,
    config: ReplicatorConfig,
}

impl Replicator {
    pub fn new(registry: Arc<Registry>, config: ReplicatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ReplicatorConfig {
        &self.config
    }

    /// Bind the source's schema names locally, fetching schemas we lack.
    ///
    /// Names already bound to the same hash are left alone. Returns the
    /// number of names bound.
    pub async fn sync_names(&self, source: &dyn ObjectSource) -> SyncResult<usize> {
        let store = self.registry.store();
        let mut bound = 0;
        for (name, reference) in source.list_names().await? {
            if self.registry.reference_by_name(&name).ok() == Some(reference) {
                continue;
            }
            if !store.exists(&reference)? {
                if self.fetch_batch(&[reference], source).await?.0 == 0 {
                    warn!(schema = %name, reference = %reference.short_hex(), "schema unavailable at source");
                    continue;
                }
            }
            self.registry.bind(&name, reference)?;
            bound += 1;
        }
        Ok(bound)
    }

    /// Fetch everything missing below `root` until the graph is complete,
    /// a round makes no progress, or the round limit is reached.
    pub async fn fill(&self, root: Dynamic, source: &dyn ObjectSource) -> SyncResult<FillReport> {
        let mut report = FillReport {
            names_bound: self.sync_names(source).await?,
            ..FillReport::default()
        };
        let store = self.registry.store();

        loop {
            let wants = compute_wants(&self.registry, store.as_ref(), root.schema, root.object)?;
            if wants.is_empty() {
                report.complete = true;
                break;
            }
            let wanted = wants.into_sorted_vec();
            if report.rounds >= self.config.max_rounds {
                warn!(rounds = report.rounds, missing = wanted.len(), "round limit reached");
                report.missing = wanted;
                break;
            }
            report.rounds += 1;

            let mut stored = 0;
            for batch in wanted.chunks(self.config.batch_size.max(1)) {
                let (accepted, rejected) = self.fetch_batch(batch, source).await?;
                stored += accepted;
                report.rejected += rejected;
            }
            info!(
                round = report.rounds,
                wanted = wanted.len(),
                stored,
                "replication round"
            );
            report.received += stored;

            if stored == 0 {
                warn!(missing = wanted.len(), "source has none of the missing objects");
                report.missing = wanted;
                break;
            }
        }

        debug!(
            rounds = report.rounds,
            received = report.received,
            complete = report.complete,
            "fill finished"
        );
        Ok(report)
    }

    /// Fetch, verify, and store one batch. Returns how many requested
    /// objects were stored under the hash they were requested by, and how
    /// many received objects were rejected.
    async fn fetch_batch(
        &self,
        batch: &[Reference],
        source: &dyn ObjectSource,
    ) -> SyncResult<(usize, usize)> {
        let received = source.fetch(batch).await?;
        let verified = ObjectVerifier::verify_batch(batch, received, self.config.verify_hashes);
        for rejection in &verified.rejected {
            warn!(
                reference = %rejection.reference.short_hex(),
                reason = ?rejection.reason,
                "rejected object from source"
            );
        }

        let store = self.registry.store();
        let mut stored = 0;
        for (requested, data) in verified.accepted {
            if store.put(&data)? == requested {
                stored += 1;
            }
        }
        Ok((stored, verified.rejected.len()))
    }
}
