//! Filename capability lookup

use std::collections::HashMap;

/// How a destination names what it stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingCapability {
    /// Accepts the caller-supplied filename
    CustomFilename,
    /// Always derives its own filename
    ProviderAssigned,
}

/// Destination id (case-insensitive) -> naming capability. Unknown ids accept custom names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    entries: HashMap<String, NamingCapability>,
}

impl CapabilityTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_capability(mut self, id: &str, capability: NamingCapability) -> Self {
        self.set(id, capability);
        self
    }

    pub fn set(&mut self, id: &str, capability: NamingCapability) {
        self.entries.insert(id.to_lowercase(), capability);
    }

    pub fn capability(&self, id: &str) -> NamingCapability {
        self.entries
            .get(&id.to_lowercase())
            .copied()
            .unwrap_or(NamingCapability::CustomFilename)
    }

    pub fn supports_custom_filename(&self, id: &str) -> bool {
        self.capability(id) == NamingCapability::CustomFilename
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::empty()
            .with_capability("smms", NamingCapability::ProviderAssigned)
            .with_capability("imgur", NamingCapability::ProviderAssigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = CapabilityTable::default();
        assert!(!table.supports_custom_filename("smms"));
        assert!(!table.supports_custom_filename("Imgur"));
        assert!(table.supports_custom_filename("github"));
        assert!(table.supports_custom_filename("never-heard-of-it"));
    }

    #[test]
    fn test_capability_is_data() {
        let table = CapabilityTable::default()
            .with_capability("qiniu", NamingCapability::ProviderAssigned)
            .with_capability("SMMS", NamingCapability::CustomFilename);
        assert_eq!(table.capability("qiniu"), NamingCapability::ProviderAssigned);
        assert!(table.supports_custom_filename("smms"));
    }
}
