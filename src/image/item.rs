use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-image record exchanged with the host and with destinations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extname: Option<String>,
    #[serde(skip)]
    pub buffer: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Provider-specific fields, kept as-is
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ImageItem {
    /// First non-empty URL-bearing field, in `url`, `imgUrl`, `image`, `source` order
    pub fn resolved_url(&self) -> Option<&str> {
        [&self.url, &self.img_url, &self.image, &self.source]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|url| !url.is_empty())
    }

    pub fn has_url(&self) -> bool {
        self.resolved_url().is_some()
    }

    /// Clear every URL-bearing field
    pub fn clear_urls(&mut self) {
        self.url = None;
        self.img_url = None;
        self.image = None;
        self.source = None;
    }

    /// Drop the content so the record can be kept around as a result
    pub fn into_result(mut self) -> Self {
        self.buffer = None;
        self.base64_image = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolved_url_priority() {
        let mut item = ImageItem {
            source: Some("https://s/4.png".to_string()),
            image: Some("https://i/3.png".to_string()),
            ..Default::default()
        };
        assert_eq!(item.resolved_url(), Some("https://i/3.png"));

        item.url = Some(String::new());
        item.img_url = Some("https://m/2.png".to_string());
        assert_eq!(item.resolved_url(), Some("https://m/2.png"));

        item.clear_urls();
        assert!(!item.has_url());
    }

    #[test]
    fn test_host_json_shape() {
        let item: ImageItem = serde_json::from_value(json!({
            "fileName": "a.png",
            "imgUrl": "https://x/a.png",
            "delete": "https://x/delete/abc"
        }))
        .unwrap();
        assert_eq!(item.file_name.as_deref(), Some("a.png"));
        assert_eq!(item.metadata.get("delete"), Some(&json!("https://x/delete/abc")));

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["imgUrl"], json!("https://x/a.png"));
        assert!(value.get("url").is_none());
    }
}
