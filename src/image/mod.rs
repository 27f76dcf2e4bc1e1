//! Image records and the per-batch artifact snapshot
//!
//! This module provides the host-facing [`ImageItem`] (the record a destination fills in with
//! its URL) and the [`ArtifactCache`], an immutable snapshot of the batch's images captured
//! once before any destination is touched.
//!
//! # Overview
//!
//! The host hands the engine a list of [`ImageItem`]s whose content is either a raw byte
//! buffer or base64 text (optionally a `data:` URL). [`ArtifactCache::capture`] resolves a
//! filename and extension for each of them and keeps exactly one form of the content.
//! Every upload attempt later derives its own items from the snapshot by cloning, so the
//! snapshot itself is never mutated.
//!
//! # Examples
//!
//! ```
//! use multi_uploader::image::{ArtifactCache, ImageItem};
//!
//! let item = ImageItem {
//!     file_name: Some("cat.png".to_string()),
//!     base64_image: Some("data:image/png;base64,aGVsbG8=".to_string()),
//!     ..Default::default()
//! };
//! let cache = ArtifactCache::capture(&[item]);
//! assert_eq!(cache.artifacts()[0].decoded_bytes().as_deref(), Some(&b"hello"[..]));
//! ```

pub mod cache;
pub mod item;

pub use cache::{ArtifactCache, ArtifactContent, ImageArtifact, decode_base64_image};
pub use item::ImageItem;
