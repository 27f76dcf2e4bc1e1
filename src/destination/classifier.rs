use super::capability::CapabilityTable;

/// Split of the configured destinations around the primary one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub primary: Option<String>,
    /// Every configured destination except the primary, in configured order
    pub backups: Vec<String>,
    pub no_custom_filename_backups: Vec<String>,
    pub custom_filename_backups: Vec<String>,
    pub primary_supports_custom: bool,
}

impl Classification {
    pub fn has_backups(&self) -> bool {
        !self.backups.is_empty()
    }

    /// Destinations, primary included, that impose their own filename
    pub fn no_custom_set(&self) -> Vec<String> {
        let mut set = self.no_custom_filename_backups.clone();
        if !self.primary_supports_custom {
            if let Some(primary) = &self.primary {
                set.push(primary.clone());
            }
        }
        set
    }
}

#[derive(Debug, Clone, Default)]
pub struct DestinationClassifier {
    capabilities: CapabilityTable,
}

impl DestinationClassifier {
    pub fn new(capabilities: CapabilityTable) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub fn supports_custom_filename(&self, id: &str) -> bool {
        self.capabilities.supports_custom_filename(id)
    }

    /// Partition `all_ids` around `primary`. An unknown primary constrains nothing.
    pub fn classify(&self, all_ids: &[String], primary: Option<&str>) -> Classification {
        let mut backups: Vec<String> = Vec::new();
        for id in all_ids {
            if Some(id.as_str()) != primary && !backups.contains(id) {
                backups.push(id.clone());
            }
        }

        let (custom_filename_backups, no_custom_filename_backups): (Vec<String>, Vec<String>) =
            backups
                .iter()
                .cloned()
                .partition(|id| self.supports_custom_filename(id));

        Classification {
            primary: primary.map(str::to_string),
            primary_supports_custom: primary
                .map(|id| self.supports_custom_filename(id))
                .unwrap_or(true),
            backups,
            no_custom_filename_backups,
            custom_filename_backups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_primary_excluded_and_order_kept() {
        let classifier = DestinationClassifier::default();
        let c = classifier.classify(&ids(&["smms", "github", "custom1"]), Some("smms"));
        assert_eq!(c.backups, ids(&["github", "custom1"]));
        assert!(c.no_custom_filename_backups.is_empty());
        assert_eq!(c.custom_filename_backups, ids(&["github", "custom1"]));
        assert!(!c.primary_supports_custom);
        assert_eq!(c.no_custom_set(), ids(&["smms"]));
    }

    #[test]
    fn test_conflicting_backups() {
        let classifier = DestinationClassifier::default();
        let c = classifier.classify(&ids(&["smms", "imgur"]), Some("github"));
        assert_eq!(c.no_custom_set(), ids(&["smms", "imgur"]));
        assert!(c.primary_supports_custom);
    }

    #[test]
    fn test_only_primary_configured() {
        let classifier = DestinationClassifier::default();
        let c = classifier.classify(&ids(&["github"]), Some("github"));
        assert!(!c.has_backups());
    }

    #[test]
    fn test_unknown_primary() {
        let classifier = DestinationClassifier::default();
        let c = classifier.classify(&ids(&["github", "github", "imgur"]), None);
        assert_eq!(c.backups, ids(&["github", "imgur"]));
        assert!(c.primary_supports_custom);
        assert_eq!(c.no_custom_set(), ids(&["imgur"]));
    }
}
