//! Lifecycle hooks exposed to the host
//!
//! The host runs [`CaptureHook`] before its own upload and [`FanOutHook`] after it. The
//! snapshot travels between the two inside the [`UploadBatch`], never in global state.

use crate::config::{ConfigItem, MultiUploaderConfig, config_schema, primary_destination};
use crate::destination::{CapabilityTable, DestinationClassifier};
use crate::engine::FanOutEngine;
use crate::error::Result;
use crate::filename::generate_unified_filename;
use crate::host::{HostContext, UploadBatch};
use crate::image::ArtifactCache;
use crate::logging::LOG_PREFIX;
use crate::merge::MergedRecord;
use crate::output::SummaryFormatter;
use async_trait::async_trait;
use std::sync::Arc;

pub const PLUGIN_NAME: &str = "multi-uploader";

#[async_trait]
pub trait UploadHook: Send + Sync {
    fn name(&self) -> &str;
    async fn handle(&self, host: &HostContext, batch: &mut UploadBatch) -> Result<()>;
}

/// Pre-upload hook: captures the snapshot, and names the primary upload up front when
/// every destination will accept the same generated filename.
pub struct CaptureHook {
    classifier: DestinationClassifier,
}

#[async_trait]
impl UploadHook for CaptureHook {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn handle(&self, host: &HostContext, batch: &mut UploadBatch) -> Result<()> {
        let log = host.log.as_ref();
        let mut snapshot = ArtifactCache::capture(&batch.output);
        log.info(&format!(
            "{} Cached {} files for upload",
            LOG_PREFIX,
            snapshot.len()
        ));

        let options = MultiUploaderConfig::load(host.config.as_ref(), log);
        if options.unify_file_name && snapshot.len() == 1 {
            let primary = primary_destination(host.config.as_ref());
            let classification = self
                .classifier
                .classify(&options.enabled_beds(), primary.as_deref());
            if classification.has_backups() && classification.no_custom_set().is_empty() {
                let filename = generate_unified_filename(snapshot.first_extension());
                if let Some(item) = batch.output.first_mut() {
                    item.file_name = Some(filename.clone());
                }
                log.info(&format!(
                    "{} 📝 Unified filename applied to primary upload: {}",
                    LOG_PREFIX, filename
                ));
                snapshot = snapshot.with_preset_filename(filename);
            }
        }

        batch.snapshot = Some(Arc::new(snapshot));
        Ok(())
    }
}

/// Post-upload hook: fans out, then replaces the batch output with the merged records
pub struct FanOutHook {
    capabilities: CapabilityTable,
}

#[async_trait]
impl UploadHook for FanOutHook {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn handle(&self, host: &HostContext, batch: &mut UploadBatch) -> Result<()> {
        let log = host.log.as_ref();
        let options = MultiUploaderConfig::load(host.config.as_ref(), log);

        let snapshot = match batch.snapshot.take() {
            Some(snapshot) => snapshot,
            None => {
                log.warn(&format!(
                    "{} No cached images for this batch, capturing from upload output",
                    LOG_PREFIX
                ));
                Arc::new(ArtifactCache::capture(&batch.output))
            }
        };

        let engine = FanOutEngine::new(host.clone(), self.capabilities.clone());
        let report = engine.run(&options, &batch.output, snapshot).await;

        batch.output = report
            .records
            .iter()
            .cloned()
            .map(MergedRecord::into_item)
            .collect();

        if options.generate_markdown && !report.records.is_empty() {
            let markdown = SummaryFormatter::render(&report.records);
            log.block("\n📋 Markdown Link Summary:\n");
            log.block(&markdown);
            batch.summary = Some(markdown);
        }

        batch.report = Some(report);
        Ok(())
    }
}

/// Both hook registrations
#[derive(Clone)]
pub struct PluginHooks {
    pub before_upload: Arc<dyn UploadHook>,
    pub after_upload: Arc<dyn UploadHook>,
}

/// Entry point for hosts
#[derive(Debug, Clone, Default)]
pub struct MultiUploader {
    capabilities: CapabilityTable,
}

impl MultiUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capabilities(capabilities: CapabilityTable) -> Self {
        Self { capabilities }
    }

    pub fn hooks(&self) -> PluginHooks {
        PluginHooks {
            before_upload: Arc::new(CaptureHook {
                classifier: DestinationClassifier::new(self.capabilities.clone()),
            }),
            after_upload: Arc::new(FanOutHook {
                capabilities: self.capabilities.clone(),
            }),
        }
    }

    pub fn config_schema(&self) -> Vec<ConfigItem> {
        config_schema()
    }

    /// Settings descriptor as the host's JSON
    pub fn config_schema_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.config_schema())?)
    }
}
