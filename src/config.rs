//! Configuration access and the engine's option block

use crate::error::{EngineError, Result};
use crate::logging::{LOG_PREFIX, LogSink};
use crate::upload::RetryPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Host key under which the option block is stored
pub const CONFIG_KEY: &str = "multi-uploader";

/// Host keys holding the id of the destination the primary upload used
pub const PRIMARY_UPLOADER_KEY: &str = "picBed.uploader";
pub const PRIMARY_CURRENT_KEY: &str = "picBed.current";

/// Read-only accessor to host configuration
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

/// In-memory configuration tree with dotted-key lookup
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    root: Value,
}

impl JsonConfig {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a host configuration file's contents
    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        if !root.is_object() {
            return Err(EngineError::Configuration(
                "configuration root must be a JSON object".to_string(),
            ));
        }
        Ok(Self { root })
    }
}

impl ConfigSource for JsonConfig {
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.root.get(key) {
            return Some(value.clone());
        }
        key.split('.')
            .try_fold(&self.root, |node, part| node.get(part))
            .cloned()
    }
}

/// Id of the destination the host's own upload path used
pub fn primary_destination(config: &dyn ConfigSource) -> Option<String> {
    [PRIMARY_UPLOADER_KEY, PRIMARY_CURRENT_KEY]
        .iter()
        .filter_map(|key| config.get(key))
        .filter_map(|value| value.as_str().map(str::to_string))
        .find(|id| !id.is_empty())
}

fn default_enabled_beds() -> String {
    "smms,github".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    2000
}

/// The option block, as stored by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiUploaderConfig {
    #[serde(default = "default_enabled_beds")]
    pub enabled_beds: String,
    #[serde(default = "default_true")]
    pub unify_file_name: bool,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Milliseconds between attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    #[serde(default = "default_true")]
    pub generate_markdown: bool,
}

impl Default for MultiUploaderConfig {
    fn default() -> Self {
        Self {
            enabled_beds: default_enabled_beds(),
            unify_file_name: true,
            retry_count: default_retry_count(),
            retry_delay: default_retry_delay(),
            generate_markdown: true,
        }
    }
}

impl MultiUploaderConfig {
    /// Load the block from the host, falling back to defaults when it is missing or malformed
    pub fn load(config: &dyn ConfigSource, log: &dyn LogSink) -> Self {
        match config.get(CONFIG_KEY) {
            None | Some(Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                log.warn(&format!(
                    "{} Invalid configuration block, using defaults: {}",
                    LOG_PREFIX, e
                ));
                Self::default()
            }),
        }
    }

    /// Enabled destination ids in configured order, trimmed and deduplicated
    pub fn enabled_beds(&self) -> Vec<String> {
        let mut beds: Vec<String> = Vec::new();
        for bed in self.enabled_beds.split(',').map(str::trim) {
            if !bed.is_empty() && !beds.iter().any(|b| b == bed) {
                beds.push(bed.to_string());
            }
        }
        beds
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.retry_delay))
    }
}

/// One entry of the settings descriptor shown by host settings UIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub default: Value,
    pub message: String,
    pub alias: String,
}

impl ConfigItem {
    fn new(name: &str, kind: &str, default: Value, message: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            default,
            message: message.to_string(),
            alias: alias.to_string(),
        }
    }
}

/// Static descriptor of the option block
pub fn config_schema() -> Vec<ConfigItem> {
    let defaults = MultiUploaderConfig::default();
    vec![
        ConfigItem::new(
            "enabledBeds",
            "string",
            Value::from(defaults.enabled_beds),
            "Enabled image beds (comma-separated)",
            "Enabled Beds",
        ),
        ConfigItem::new(
            "unifyFileName",
            "boolean",
            Value::from(defaults.unify_file_name),
            "Whether to maintain a unified filename across all beds",
            "Unify Filename",
        ),
        ConfigItem::new(
            "retryCount",
            "number",
            Value::from(defaults.retry_count),
            "Number of retry attempts on failure",
            "Retry Count",
        ),
        ConfigItem::new(
            "retryDelay",
            "number",
            Value::from(defaults.retry_delay),
            "Delay between retries (milliseconds)",
            "Retry Delay",
        ),
        ConfigItem::new(
            "generateMarkdown",
            "boolean",
            Value::from(defaults.generate_markdown),
            "Whether to generate a Markdown summary of links",
            "Generate Markdown",
        ),
    ]
}
