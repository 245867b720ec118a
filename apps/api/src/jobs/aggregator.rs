//! Aggregator — one concurrent fan-out over every registered source per request.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{info, warn};

use crate::models::{Job, SourceCounts};
use crate::sources::JobSource;

pub struct Aggregator {
    sources: Vec<Arc<dyn JobSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn JobSource>>) -> Self {
        Self { sources }
    }

    /// Keys of every registered source, in registration order.
    pub fn source_keys(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.info().key).collect()
    }

    /// Zero count for every source. Used for degraded responses.
    pub fn empty_counts(&self) -> SourceCounts {
        SourceCounts::zeroed(self.source_keys())
    }

    /// Runs every source as its own task and waits for all of them to settle.
    ///
    /// Never fails: a source that errors or panics contributes zero jobs.
    /// Jobs are concatenated in source registration order.
    pub async fn aggregate(&self) -> (Vec<Job>, SourceCounts) {
        let started = Instant::now();

        let handles = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            tokio::spawn(async move { source.fetch().await })
        });
        let results = join_all(handles).await;

        let mut jobs = Vec::new();
        let mut counts = self.empty_counts();

        for (source, result) in self.sources.iter().zip(results) {
            let key = source.info().key;
            match result {
                Ok(batch) => {
                    counts.record(key, batch.len());
                    jobs.extend(batch);
                }
                Err(e) => warn!(source = key, "source task aborted: {e}"),
            }
        }

        info!(
            total = counts.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation run complete"
        );

        (jobs, counts)
    }
}
