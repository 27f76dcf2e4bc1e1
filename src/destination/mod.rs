//! Destinations (image beds) and their naming capabilities
//!
//! A destination is an opaque upload capability looked up by id in the
//! [`DestinationRegistry`]. Whether it honours a caller-supplied filename is a static
//! property of its id, held in the [`CapabilityTable`].

pub mod capability;
pub mod classifier;

pub use capability::{CapabilityTable, NamingCapability};
pub use classifier::{Classification, DestinationClassifier};

use crate::error::DestinationError;
use crate::upload::UploadAttemptContext;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Upload capability of one destination.
///
/// Implementations must set a URL-bearing field on every item in `ctx.output`, or return
/// an error. The context is owned by a single attempt and discarded afterwards.
#[async_trait]
pub trait Destination: Send + Sync {
    async fn upload(&self, ctx: &mut UploadAttemptContext) -> Result<(), DestinationError>;
}

/// Lookup of destination capabilities by id
#[derive(Default, Clone)]
pub struct DestinationRegistry {
    destinations: HashMap<String, Arc<dyn Destination>>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, destination: Arc<dyn Destination>) {
        self.destinations.insert(id.into(), destination);
    }

    pub fn with(mut self, id: impl Into<String>, destination: Arc<dyn Destination>) -> Self {
        self.register(id, destination);
        self
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<dyn Destination>> {
        self.destinations.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.destinations.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.destinations.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for DestinationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationRegistry")
            .field("destinations", &self.ids())
            .finish()
    }
}
