use super::item::ImageItem;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_EXTENSION: &str = ".png";

// Hosts hand over base64 with or without padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Content of a captured image; exactly one form is retained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactContent {
    Bytes(Vec<u8>),
    Encoded(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub file_name: String,
    pub extension: String,
    pub content: ArtifactContent,
}

impl ImageArtifact {
    /// Resolve the content to one decoded buffer. `None` marks a malformed artifact.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        match &self.content {
            ArtifactContent::Bytes(bytes) => Some(bytes.clone()),
            ArtifactContent::Encoded(text) => decode_base64_image(text),
            ArtifactContent::Missing => None,
        }
    }

    /// Fresh upload item for one attempt: content decoded into the buffer, encoded text and
    /// every URL field cleared so the destination performs a real upload.
    pub fn to_upload_item(&self, filename_override: Option<&str>) -> ImageItem {
        ImageItem {
            file_name: Some(
                filename_override
                    .map(str::to_string)
                    .unwrap_or_else(|| self.file_name.clone()),
            ),
            extname: Some(self.extension.clone()),
            buffer: self.decoded_bytes(),
            ..Default::default()
        }
    }
}

/// Immutable snapshot of the batch's images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactCache {
    artifacts: Vec<ImageArtifact>,
    preset_filename: Option<String>,
}

impl ArtifactCache {
    /// Capture the host's output items. No I/O happens here.
    pub fn capture(items: &[ImageItem]) -> Self {
        let artifacts = items
            .iter()
            .map(|item| {
                let extension = item
                    .extname
                    .clone()
                    .filter(|ext| !ext.is_empty())
                    .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
                let file_name = item
                    .file_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| format!("{}{}", unix_millis(), extension));
                let content = match (&item.buffer, &item.base64_image) {
                    (Some(bytes), _) => ArtifactContent::Bytes(bytes.clone()),
                    (None, Some(text)) if !text.is_empty() => {
                        ArtifactContent::Encoded(text.clone())
                    }
                    _ => ArtifactContent::Missing,
                };
                ImageArtifact {
                    file_name,
                    extension,
                    content,
                }
            })
            .collect();

        Self {
            artifacts,
            preset_filename: None,
        }
    }

    /// Record a canonical filename chosen before the primary upload ran
    pub fn with_preset_filename(mut self, filename: String) -> Self {
        self.preset_filename = Some(filename);
        self
    }

    pub fn preset_filename(&self) -> Option<&str> {
        self.preset_filename.as_deref()
    }

    pub fn artifacts(&self) -> &[ImageArtifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Extension of the first image, used for generated filenames
    pub fn first_extension(&self) -> &str {
        self.artifacts
            .first()
            .map(|a| a.extension.as_str())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// Fresh, independent upload items for one attempt
    pub fn upload_items(&self, filename_override: Option<&str>) -> Vec<ImageItem> {
        self.artifacts
            .iter()
            .map(|artifact| artifact.to_upload_item(filename_override))
            .collect()
    }
}

/// Decode base64 image text, stripping a leading `data:<mime>;base64,` prefix
pub fn decode_base64_image(text: &str) -> Option<Vec<u8>> {
    let payload = strip_data_url_prefix(text);
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    LENIENT_BASE64.decode(compact.as_bytes()).ok()
}

fn strip_data_url_prefix(text: &str) -> &str {
    const MARKER: &str = ";base64,";
    if let Some(rest) = text.strip_prefix("data:") {
        if let Some(pos) = rest.find(MARKER) {
            let mime = &rest[..pos];
            if !mime.is_empty() && !mime.chars().any(char::is_whitespace) {
                return &rest[pos + MARKER.len()..];
            }
        }
    }
    text
}

pub(crate) fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
