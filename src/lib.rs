//! Multi-destination image uploader
//!
//! Extends a host's single image upload into a fan-out to several image beds: the same
//! images are uploaded in parallel to every configured backup destination, with fixed-delay
//! retries, a filename kept identical across destinations wherever their naming rules
//! allow it, and a Markdown link summary of everything that succeeded.

pub mod config;
pub mod destination;
pub mod engine;
pub mod error;
pub mod filename;
pub mod host;
pub mod image;
pub mod logging;
pub mod merge;
pub mod output;
pub mod plugin;
pub mod upload;

pub use config::{ConfigSource, JsonConfig, MultiUploaderConfig};
pub use destination::{CapabilityTable, Destination, DestinationRegistry, NamingCapability};
pub use engine::{BatchReport, Degradation, FanOutEngine};
pub use error::{DestinationError, EngineError, Result, UploadError};
pub use host::{EventSink, HostContext, UploadBatch};
pub use image::{ArtifactCache, ImageItem};
pub use logging::{LogSink, Logger, MemoryLogger};
pub use merge::MergedRecord;
pub use plugin::{MultiUploader, PluginHooks, UploadHook};
pub use upload::{RetryPolicy, UploadAttemptContext};
