//! Fan-out orchestration for one batch
//!
//! classify -> resolve filename (maybe priming upload) -> parallel dispatch -> merge.
//! Every failure degrades the result; [`FanOutEngine::run`] itself cannot fail.

use crate::config::{MultiUploaderConfig, primary_destination};
use crate::destination::{CapabilityTable, DestinationClassifier};
use crate::filename::FilenameResolver;
use crate::host::HostContext;
use crate::image::{ArtifactCache, ImageItem};
use crate::logging::LOG_PREFIX;
use crate::merge::{MergedRecord, ResultMerger, tag_primary};
use crate::upload::{ParallelDispatcher, RetryingUploadExecutor};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

pub const FINISHED_EVENT: &str = "multi-uploader:finished";

/// Recoverable outcomes that left the batch with fewer results than requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum Degradation {
    NoDestinations,
    NoBackups,
    FilenameConflict(Vec<String>),
    DestinationFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub records: Vec<MergedRecord>,
    pub unified_filename: Option<String>,
    pub failed: Vec<String>,
    pub degradations: Vec<Degradation>,
}

impl BatchReport {
    fn primary_only(records: Vec<MergedRecord>, degradation: Degradation) -> Self {
        Self {
            records,
            degradations: vec![degradation],
            ..Default::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

pub struct FanOutEngine {
    host: HostContext,
    classifier: DestinationClassifier,
}

impl FanOutEngine {
    pub fn new(host: HostContext, capabilities: CapabilityTable) -> Self {
        Self {
            host,
            classifier: DestinationClassifier::new(capabilities),
        }
    }

    pub async fn run(
        &self,
        options: &MultiUploaderConfig,
        primary_output: &[ImageItem],
        snapshot: Arc<ArtifactCache>,
    ) -> BatchReport {
        let log = self.host.log.as_ref();
        let primary = primary_destination(self.host.config.as_ref());
        let primary_records = tag_primary(primary_output, primary.as_deref());

        let beds = options.enabled_beds();
        if beds.is_empty() {
            log.warn(&format!("{} No image beds configured", LOG_PREFIX));
            return self.finish(BatchReport::primary_only(
                primary_records,
                Degradation::NoDestinations,
            ));
        }

        let classification = self.classifier.classify(&beds, primary.as_deref());
        if !classification.has_backups() {
            log.warn(&format!("{} No backup beds found, skipping", LOG_PREFIX));
            return self.finish(BatchReport::primary_only(
                primary_records,
                Degradation::NoBackups,
            ));
        }

        let executor = RetryingUploadExecutor::new(
            Arc::clone(&self.host.registry),
            Arc::clone(&self.host.config),
            Arc::clone(&self.host.log),
            options.retry_policy(),
        );

        let resolution = FilenameResolver::new(&executor, log)
            .resolve(
                options.unify_file_name,
                &primary_records,
                &snapshot,
                &classification,
            )
            .await;

        let mut report = BatchReport {
            unified_filename: resolution.filename.clone(),
            ..Default::default()
        };
        if let Some(conflict) = resolution.conflict.clone() {
            report
                .degradations
                .push(Degradation::FilenameConflict(conflict));
        }
        if resolution.priming_failed {
            if let Some(primed) = &resolution.primed_destination {
                report.failed.push(primed.clone());
            }
        }

        let remaining: Vec<String> = classification
            .backups
            .iter()
            .filter(|id| resolution.primed_destination.as_ref() != Some(*id))
            .cloned()
            .collect();

        let dispatcher = ParallelDispatcher::new(
            executor,
            self.classifier.capabilities().clone(),
            Arc::clone(&self.host.log),
        );
        let outcome = dispatcher
            .dispatch_all(&remaining, &snapshot, resolution.filename.as_deref())
            .await;
        report.failed.extend(outcome.failed);
        report.degradations.extend(
            report
                .failed
                .iter()
                .cloned()
                .map(Degradation::DestinationFailed),
        );

        report.records = ResultMerger::merge(primary_records, resolution.priming, outcome.records);

        log.success(&format!(
            "{} 🎉 Multi-bed upload completed ({} results)",
            LOG_PREFIX,
            report.records.len()
        ));
        self.finish(report)
    }

    /// Announce the finished batch; every run ends here
    fn finish(&self, report: BatchReport) -> BatchReport {
        self.host.emit(
            FINISHED_EVENT,
            json!({
                "results": report.records.len(),
                "failed": report.failed,
            }),
        );
        report
    }
}
