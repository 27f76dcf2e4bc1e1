//! Error types for the fan-out engine
//!
//! Three layers of failure exist: a single destination attempt ([`DestinationError`]),
//! the retrying executor's verdict for one destination ([`UploadError`]), and the
//! [`EngineError`] returned by host-facing calls. A batch never fails as a whole: upload
//! problems only shrink its results.

use thiserror::Error;

/// Failure of one upload attempt against one destination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Uploader {0} returned no valid output")]
    EmptyOutput(String),
    #[error("Uploader {0} returned no URL/imgUrl")]
    MissingUrl(String),
    #[error("Artifact {0} has no decodable content")]
    MalformedArtifact(String),
}

/// Final outcome of the retrying executor for one destination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Configuration error; never retried.
    #[error("Uploader not found: {0}")]
    UnknownDestination(String),
    #[error("{destination} upload failed after {attempts} attempts: {last}")]
    Exhausted {
        destination: String,
        attempts: u32,
        last: DestinationError,
    },
    /// The upload task panicked or was aborted
    #[error("{destination} upload task failed: {reason}")]
    TaskFailed { destination: String, reason: String },
}

impl UploadError {
    pub fn destination(&self) -> &str {
        match self {
            UploadError::UnknownDestination(id) => id,
            UploadError::Exhausted { destination, .. } => destination,
            UploadError::TaskFailed { destination, .. } => destination,
        }
    }
}

/// Errors surfaced to the host through the lifecycle hooks and configuration loading.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
