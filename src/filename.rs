//! Unified filename resolution
//!
//! Decides, once per batch, the single filename every destination that accepts custom
//! names should use. Destinations that name files themselves constrain the choice:
//!
//! - none of them: a synthetic `<base36 millis><random><ext>` name is generated;
//! - exactly one: its name is learned from its URL, which for a backup destination
//!   means uploading to it first (the priming upload);
//! - two or more: no name can satisfy all of them and unification is skipped.

use crate::destination::Classification;
use crate::image::ArtifactCache;
use crate::image::cache::unix_millis;
use crate::logging::{LOG_PREFIX, LogSink};
use crate::merge::MergedRecord;
use crate::upload::RetryingUploadExecutor;
use std::sync::Arc;

const RANDOM_SUFFIX_LEN: usize = 8;

/// Result of filename resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub filename: Option<String>,
    /// Records of the priming upload, already tagged
    pub priming: Option<Vec<MergedRecord>>,
    /// Destination consumed by the priming upload, whether it succeeded or not
    pub primed_destination: Option<String>,
    pub priming_failed: bool,
    /// Set when two or more destinations impose their own names
    pub conflict: Option<Vec<String>>,
}

pub struct FilenameResolver<'a> {
    executor: &'a RetryingUploadExecutor,
    log: &'a dyn LogSink,
}

impl<'a> FilenameResolver<'a> {
    pub fn new(executor: &'a RetryingUploadExecutor, log: &'a dyn LogSink) -> Self {
        Self { executor, log }
    }

    pub async fn resolve(
        &self,
        unify: bool,
        primary_records: &[MergedRecord],
        cache: &Arc<ArtifactCache>,
        classification: &Classification,
    ) -> Resolution {
        let mut resolution = Resolution::default();
        if !unify {
            return resolution;
        }

        let no_custom = classification.no_custom_set();
        match no_custom.as_slice() {
            [] => {
                let filename = match cache.preset_filename() {
                    Some(preset) => preset.to_string(),
                    None => generate_unified_filename(cache.first_extension()),
                };
                self.log.info(&format!(
                    "{} 📝 Generated unified filename: {}",
                    LOG_PREFIX, filename
                ));
                resolution.filename = Some(filename);
            }
            [only] if classification.primary.as_deref() == Some(only.as_str()) => {
                resolution.filename = primary_records
                    .first()
                    .and_then(MergedRecord::url)
                    .and_then(extract_filename_from_url);
                match &resolution.filename {
                    Some(name) => self.log.info(&format!(
                        "{} 📝 Extracted filename from {}: {}",
                        LOG_PREFIX, only, name
                    )),
                    None => self.log.warn(&format!(
                        "{} ⚠️ {} returned no URL to take a filename from",
                        LOG_PREFIX, only
                    )),
                }
            }
            [only] => {
                self.log.info(&format!(
                    "{} 🚀 Uploading to {} first (no custom filename support)...",
                    LOG_PREFIX, only
                ));
                match self.executor.attempt_isolated(only, cache, None).await {
                    Ok(items) if !items.is_empty() => {
                        resolution.filename = items
                            .first()
                            .and_then(|item| item.resolved_url())
                            .and_then(extract_filename_from_url);
                        if let Some(name) = &resolution.filename {
                            self.log.info(&format!(
                                "{} 📝 Extracted filename from {}: {}",
                                LOG_PREFIX, only, name
                            ));
                        }
                        resolution.priming = Some(
                            items
                                .into_iter()
                                .map(|item| MergedRecord::new(only.clone(), item))
                                .collect(),
                        );
                    }
                    Ok(_) | Err(_) => resolution.priming_failed = true,
                }
                resolution.primed_destination = Some(only.clone());
            }
            _ => {
                self.log.warn(&format!(
                    "{} ⚠️ Unified filename disabled, beds without custom filenames: {}",
                    LOG_PREFIX,
                    no_custom.join(", ")
                ));
                resolution.conflict = Some(no_custom.clone());
            }
        }
        resolution
    }
}

/// Last path segment of a URL, without its query string
pub fn extract_filename_from_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let last = url.rsplit('/').next().unwrap_or(url);
    let name = last.split('?').next().unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}

/// `<base36 timestamp><random base36 suffix><extension>`
pub fn generate_unified_filename(extension: &str) -> String {
    let random = uuid::Uuid::new_v4().as_u128();
    let mut suffix = to_base36(random);
    suffix.truncate(RANDOM_SUFFIX_LEN);
    format!("{}{}{}", to_base36(unix_millis()), suffix, extension)
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_filename() {
        assert_eq!(
            extract_filename_from_url("https://i.loli.net/2024/01/01/AbCd1234.png").as_deref(),
            Some("AbCd1234.png")
        );
        assert_eq!(
            extract_filename_from_url("https://cdn.example.com/img/x.jpg?v=2&s=1").as_deref(),
            Some("x.jpg")
        );
        assert_eq!(extract_filename_from_url("plain.gif").as_deref(), Some("plain.gif"));
        assert_eq!(extract_filename_from_url(""), None);
        assert_eq!(extract_filename_from_url("https://cdn.example.com/dir/"), None);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_generated_names_are_unique_and_keep_extension() {
        let a = generate_unified_filename(".webp");
        let b = generate_unified_filename(".webp");
        assert!(a.ends_with(".webp"));
        assert_ne!(a, b);
        assert!(
            a.trim_end_matches(".webp")
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }
}
