//! Tagged, ordered result merging

use crate::image::ImageItem;
use serde::{Deserialize, Serialize};

/// Tag used when the primary destination id is unknown
pub const PRIMARY_TAG: &str = "primary";

/// One upload result tagged with the destination that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub uploader: String,
    pub item: ImageItem,
}

impl MergedRecord {
    pub fn new(uploader: impl Into<String>, item: ImageItem) -> Self {
        Self {
            uploader: uploader.into(),
            item,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.item.resolved_url()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.item.file_name.as_deref()
    }

    /// Host-facing item carrying the tag in its `uploader` field
    pub fn into_item(self) -> ImageItem {
        let mut item = self.item;
        item.uploader = Some(self.uploader);
        item
    }
}

/// Tag the host's own output with the primary destination id
pub fn tag_primary(items: &[ImageItem], primary: Option<&str>) -> Vec<MergedRecord> {
    let tag = primary.unwrap_or(PRIMARY_TAG);
    items
        .iter()
        .cloned()
        .map(|item| MergedRecord::new(tag, item.into_result()))
        .collect()
}

pub struct ResultMerger;

impl ResultMerger {
    /// Primary records, then the priming record(s), then dispatched records in the order
    /// they were handed over (configured destination order, not completion order).
    pub fn merge(
        primary: Vec<MergedRecord>,
        priming: Option<Vec<MergedRecord>>,
        dispatched: Vec<MergedRecord>,
    ) -> Vec<MergedRecord> {
        let mut merged = primary;
        merged.extend(priming.into_iter().flatten());
        merged.extend(dispatched);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> ImageItem {
        ImageItem {
            file_name: Some("a.png".to_string()),
            url: Some(url.to_string()),
            buffer: Some(vec![1]),
            ..Default::default()
        }
    }

    #[test]
    fn test_primary_tag_fallback() {
        let records = tag_primary(&[item("https://p/a.png")], None);
        assert_eq!(records[0].uploader, "primary");
        assert_eq!(records[0].item.buffer, None);

        let records = tag_primary(&[item("https://p/a.png")], Some("smms"));
        assert_eq!(records[0].uploader, "smms");
    }

    #[test]
    fn test_merge_order() {
        let merged = ResultMerger::merge(
            tag_primary(&[item("https://p/a.png")], Some("smms")),
            Some(vec![MergedRecord::new("imgur", item("https://i/a.png"))]),
            vec![
                MergedRecord::new("github", item("https://g/a.png")),
                MergedRecord::new("custom1", item("https://c/a.png")),
            ],
        );
        let tags: Vec<_> = merged.iter().map(|r| r.uploader.as_str()).collect();
        assert_eq!(tags, vec!["smms", "imgur", "github", "custom1"]);
    }

    #[test]
    fn test_into_item_sets_uploader() {
        let item = MergedRecord::new("github", item("https://g/a.png")).into_item();
        assert_eq!(item.uploader.as_deref(), Some("github"));
    }
}
