//! Image and knowledge libraries.
//!
//! Entries are created by [`ingest`] once a file has been fully read and
//! validated, and leave only through explicit removal. Nothing here is
//! garbage-collected, so a long session only grows.

pub mod ingest;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deck::ImageRef;

pub trait Asset {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime: String,
    pub size: u64,
    /// Object URL or embedded `data:` URI.
    pub src: String,
    pub date_added: DateTime<Utc>,
}

impl Asset for ImageAsset {
    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&ImageAsset> for ImageRef {
    fn from(asset: &ImageAsset) -> Self {
        ImageRef {
            url: asset.src.clone(),
            id: Some(asset.id.clone()),
            name: Some(asset.name.clone()),
            size: Some(asset.size),
            mime: Some(asset.mime.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    Text,
    Pdf,
}

impl std::fmt::Display for KnowledgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeAsset {
    pub id: String,
    pub title: String,
    pub original_filename: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeKind,
    /// Inline text, for `text` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Embedded `data:` URI, for `pdf` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub date_added: DateTime<Utc>,
}

impl Asset for KnowledgeAsset {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered list of assets, unique by id.
///
/// Entries are shared between snapshots: copying a library copies pointers,
/// never the embedded payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library<T> {
    entries: Vec<Arc<T>>,
}

impl<T> Default for Library<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

pub type ImageLibrary = Library<ImageAsset>;
pub type KnowledgeLibrary = Library<KnowledgeAsset>;

impl<T: Asset + PartialEq> Library<T> {
    /// Copy with `asset` appended. An entry with the same id is replaced in
    /// place instead, so the latest ingestion of a file wins.
    pub fn with(&self, asset: T) -> Self {
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|e| e.id() == asset.id()) {
            Some(existing) if **existing == asset => {}
            Some(existing) => *existing = Arc::new(asset),
            None => {
                log::info!("Registered asset {}", asset.id());
                entries.push(Arc::new(asset));
            }
        }
        Self { entries }
    }

    /// Copy without the entry `id`. Unknown ids leave the list as is.
    pub fn without(&self, id: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|e| e.id() != id)
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.iter().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both libraries hold the very same entries, compared by
    /// pointer rather than by content.
    pub fn shares_entries(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, name: &str) -> ImageAsset {
        ImageAsset {
            id: id.to_string(),
            name: name.to_string(),
            mime: "image/png".to_string(),
            size: 12,
            src: format!("data:image/png;base64,{id}"),
            date_added: Utc::now(),
        }
    }

    #[test]
    fn test_add_and_remove() {
        let lib = ImageLibrary::default()
            .with(image("a", "a.png"))
            .with(image("b", "b.png"));
        assert_eq!(lib.len(), 2);
        let lib = lib.without("a");
        assert_eq!(lib.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let lib = ImageLibrary::default().with(image("a", "a.png"));
        assert_eq!(lib.without("zzz"), lib);
    }

    #[test]
    fn test_same_id_replaces() {
        let lib = ImageLibrary::default()
            .with(image("a", "first.png"))
            .with(image("b", "b.png"))
            .with(image("a", "second.png"));
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("a").unwrap().name, "second.png");
        assert_eq!(lib.iter().next().unwrap().id, "a");
    }

    #[test]
    fn test_copies_share_entries() {
        let lib = ImageLibrary::default()
            .with(image("a", "a.png"))
            .with(image("b", "b.png"));
        let copy = lib.clone();
        assert!(copy.shares_entries(&lib));

        let grown = lib.with(image("c", "c.png"));
        assert!(!grown.shares_entries(&lib));
        assert!(grown.without("c").shares_entries(&lib));
    }

    #[test]
    fn test_identical_readd_keeps_entry() {
        let asset = image("a", "a.png");
        let lib = ImageLibrary::default().with(asset.clone());
        assert!(lib.with(asset).shares_entries(&lib));
    }

    #[test]
    fn test_image_ref_copies_fields() {
        let asset = image("img-1", "cat.png");
        let r = ImageRef::from(&asset);
        assert_eq!(r.url, asset.src);
        assert_eq!(r.id.as_deref(), Some("img-1"));
        assert_eq!(r.mime.as_deref(), Some("image/png"));
    }
}
