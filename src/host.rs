//! Host collaborators and batch-scoped state

use crate::config::ConfigSource;
use crate::destination::DestinationRegistry;
use crate::engine::BatchReport;
use crate::image::{ArtifactCache, ImageItem};
use crate::logging::LogSink;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Optional host notification hook
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

/// Event sink that records every emitted event
#[derive(Debug, Default)]
pub struct MemoryEvents {
    events: Mutex<Vec<(String, Value)>>,
}

impl MemoryEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemoryEvents {
    fn emit(&self, event: &str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event.to_string(), payload));
        }
    }
}

/// Everything the host lends the engine
#[derive(Clone)]
pub struct HostContext {
    pub config: Arc<dyn ConfigSource>,
    pub log: Arc<dyn LogSink>,
    pub registry: Arc<DestinationRegistry>,
    pub events: Option<Arc<dyn EventSink>>,
}

impl HostContext {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        log: Arc<dyn LogSink>,
        registry: Arc<DestinationRegistry>,
    ) -> Self {
        Self {
            config,
            log,
            registry,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn emit(&self, event: &str, payload: Value) {
        if let Some(events) = &self.events {
            events.emit(event, payload);
        }
    }
}

/// State of one upload batch, threaded through both hooks
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    pub output: Vec<ImageItem>,
    pub snapshot: Option<Arc<ArtifactCache>>,
    pub summary: Option<String>,
    pub report: Option<BatchReport>,
}

impl UploadBatch {
    pub fn new(output: Vec<ImageItem>) -> Self {
        Self {
            output,
            ..Default::default()
        }
    }
}
