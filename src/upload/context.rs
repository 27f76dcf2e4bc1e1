//! Isolated per-attempt upload context

use crate::config::ConfigSource;
use crate::error::DestinationError;
use crate::image::{ArtifactCache, ImageItem};
use crate::logging::LogSink;
use serde_json::Value;
use std::sync::Arc;

/// State handed to a destination for exactly one attempt.
///
/// `output` is a fresh copy of the snapshot, never shared with another destination or with
/// another attempt of the same destination. The destination fills in the URL fields.
pub struct UploadAttemptContext {
    pub destination: String,
    /// Zero-based attempt number
    pub attempt: u32,
    pub output: Vec<ImageItem>,
    config: Arc<dyn ConfigSource>,
    log: Arc<dyn LogSink>,
}

impl UploadAttemptContext {
    /// The only way to build a context: clones every artifact, applies the filename
    /// override, attaches the decoded buffer and leaves encoded text and URLs cleared.
    pub fn new(
        destination: &str,
        attempt: u32,
        cache: &ArtifactCache,
        filename_override: Option<&str>,
        config: Arc<dyn ConfigSource>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            destination: destination.to_string(),
            attempt,
            output: cache.upload_items(filename_override),
            config,
            log,
        }
    }

    pub fn get_config(&self, key: &str) -> Option<Value> {
        self.config.get(key)
    }

    pub fn log(&self) -> &dyn LogSink {
        self.log.as_ref()
    }

    /// Every item must carry content before the destination is called
    pub fn ensure_content(&self) -> Result<(), DestinationError> {
        match self.output.iter().find(|item| item.buffer.is_none()) {
            Some(item) => Err(DestinationError::MalformedArtifact(
                item.file_name.clone().unwrap_or_default(),
            )),
            None => Ok(()),
        }
    }

    /// Accept the output only if it is non-empty and at least one item carries a URL
    pub fn into_results(self) -> Result<Vec<ImageItem>, DestinationError> {
        if self.output.is_empty() {
            return Err(DestinationError::EmptyOutput(self.destination));
        }
        if !self.output.iter().any(ImageItem::has_url) {
            return Err(DestinationError::MissingUrl(self.destination));
        }
        Ok(self
            .output
            .into_iter()
            .map(ImageItem::into_result)
            .collect())
    }
}

impl std::fmt::Debug for UploadAttemptContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadAttemptContext")
            .field("destination", &self.destination)
            .field("attempt", &self.attempt)
            .field("output", &self.output.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonConfig;
    use crate::logging::MemoryLogger;
    use serde_json::json;

    fn context(items: &[ImageItem], filename: Option<&str>) -> UploadAttemptContext {
        let cache = ArtifactCache::capture(items);
        UploadAttemptContext::new(
            "github",
            0,
            &cache,
            filename,
            Arc::new(JsonConfig::new(json!({ "github": { "repo": "me/img" } }))),
            Arc::new(MemoryLogger::new()),
        )
    }

    fn png(name: &str) -> ImageItem {
        ImageItem {
            file_name: Some(name.to_string()),
            buffer: Some(vec![1, 2, 3]),
            url: Some("https://stale/x.png".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_context_shape() {
        let ctx = context(&[png("a.png"), png("b.png")], Some("same.png"));
        assert_eq!(ctx.output.len(), 2);
        assert!(ctx.output.iter().all(|i| i.file_name.as_deref() == Some("same.png")));
        assert!(ctx.output.iter().all(|i| !i.has_url() && i.base64_image.is_none()));
        assert_eq!(ctx.get_config("github.repo"), Some(json!("me/img")));
        assert!(ctx.ensure_content().is_ok());
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let ctx = context(&[ImageItem::default()], None);
        assert!(matches!(
            ctx.ensure_content(),
            Err(DestinationError::MalformedArtifact(_))
        ));
    }

    #[test]
    fn test_validation() {
        let ctx = context(&[], None);
        assert_eq!(
            ctx.into_results(),
            Err(DestinationError::EmptyOutput("github".to_string()))
        );

        let ctx = context(&[png("a.png")], None);
        assert_eq!(
            ctx.into_results(),
            Err(DestinationError::MissingUrl("github".to_string()))
        );

        let mut ctx = context(&[png("a.png"), png("b.png")], None);
        ctx.output[1].img_url = Some("https://cdn/b.png".to_string());
        let results = ctx.into_results().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|i| i.buffer.is_none()));
    }
}
