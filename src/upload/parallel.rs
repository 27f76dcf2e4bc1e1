//! Parallel fan-out to the remaining backup destinations

use crate::destination::CapabilityTable;
use crate::image::ArtifactCache;
use crate::logging::{LOG_PREFIX, LogSink};
use crate::merge::MergedRecord;
use crate::upload::RetryingUploadExecutor;
use futures::future::join_all;
use std::sync::Arc;

/// Settled results of one fan-out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Successful records, in the order the destinations were given
    pub records: Vec<MergedRecord>,
    /// Destinations dropped from the results
    pub failed: Vec<String>,
}

pub struct ParallelDispatcher {
    executor: RetryingUploadExecutor,
    capabilities: CapabilityTable,
    log: Arc<dyn LogSink>,
}

impl ParallelDispatcher {
    pub fn new(
        executor: RetryingUploadExecutor,
        capabilities: CapabilityTable,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            executor,
            capabilities,
            log,
        }
    }

    /// Upload to every destination at once, one task each, and wait for all of them to
    /// settle. A failing or panicking destination never cancels the others.
    pub async fn dispatch_all(
        &self,
        destinations: &[String],
        cache: &Arc<ArtifactCache>,
        unified_filename: Option<&str>,
    ) -> DispatchOutcome {
        if destinations.is_empty() {
            return DispatchOutcome::default();
        }

        self.log.info(&format!(
            "{} 🚀 Parallel uploading to: {}{}",
            LOG_PREFIX,
            destinations.join(", "),
            unified_filename
                .map(|name| format!(" (filename: {})", name))
                .unwrap_or_default()
        ));

        let tasks = destinations.iter().map(|id| {
            let filename = unified_filename
                .filter(|_| self.capabilities.supports_custom_filename(id))
                .map(str::to_string);
            self.executor.spawn(id.clone(), Arc::clone(cache), filename)
        });

        let settled = join_all(tasks).await;

        let mut outcome = DispatchOutcome::default();
        for (id, result) in destinations.iter().zip(settled) {
            match result {
                Err(join_error) => {
                    self.log.error(&format!(
                        "{} Backup task exception for {}: {}",
                        LOG_PREFIX, id, join_error
                    ));
                    outcome.failed.push(id.clone());
                }
                Ok(Err(e)) => {
                    self.log.warn(&format!(
                        "{} {} returned empty results: {}",
                        LOG_PREFIX, id, e
                    ));
                    outcome.failed.push(id.clone());
                }
                Ok(Ok(items)) => outcome
                    .records
                    .extend(items.into_iter().map(|item| MergedRecord::new(id.clone(), item))),
            }
        }
        outcome
    }
}
