use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use chrono::Utc;
use log::{debug, warn};
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

use super::{ImageAsset, KnowledgeAsset, KnowledgeKind};

const MIB: u64 = 1024 * 1024;

pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

const PDF_TYPE: &str = "application/pdf";

const TEXT_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "text/html",
    "application/json",
    "text/csv",
];

const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md", ".markdown", ".html", ".json", ".csv"];

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("extension pattern"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_-]").expect("separator pattern"));

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Why a file did not make it into a library. Each one names its file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("{name} is not a valid image file. Please upload JPEG, PNG, GIF, or WebP files.")]
    NotAnImage { name: String },

    #[error("{name} is not a valid knowledge file. Please upload PDF or text files.")]
    NotKnowledge { name: String },

    #[error("{name} is too large. Maximum file size is {limit_mb}MB.")]
    TooLarge { name: String, limit_mb: u64 },

    #[error("Failed to process {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

impl AssetError {
    pub fn file_name(&self) -> &str {
        match self {
            Self::NotAnImage { name }
            | Self::NotKnowledge { name }
            | Self::TooLarge { name, .. }
            | Self::Unreadable { name, .. } => name,
        }
    }
}

/// Size caps applied at ingestion, in MiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub image_max_mb: u64,
    pub knowledge_max_mb: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            image_max_mb: 5,
            knowledge_max_mb: 10,
        }
    }
}

/// A file as handed over by the upload UI: name, declared type and bytes,
/// fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).map_err(|e| AssetError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let mime = mime_from_extension(&name).to_string();
        Ok(Self { name, mime, bytes })
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Best-effort MIME type for a file name; empty when unknown.
pub fn mime_from_extension(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => PDF_TYPE,
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "",
    }
}

fn next_id(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{seq}", Utc::now().timestamp_millis())
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// "quarterly_sales-2024.md" -> "quarterly sales 2024"
pub fn title_from_filename(filename: &str) -> String {
    let stem = EXTENSION.replace(filename, "");
    SEPARATORS.replace_all(&stem, " ").into_owned()
}

/// Validate an image upload and turn it into a library entry.
///
/// Checks run in order: declared type against the allow-list, size against
/// the cap, then the bytes themselves must be one of the allowed raster
/// formats. The stored type is the one the bytes turned out to be.
pub fn ingest_image(file: &RawFile, policy: &UploadPolicy) -> Result<ImageAsset, AssetError> {
    if !IMAGE_TYPES.contains(&file.mime.as_str()) {
        return Err(AssetError::NotAnImage {
            name: file.name.clone(),
        });
    }
    if file.size() > policy.image_max_mb.saturating_mul(MIB) {
        return Err(AssetError::TooLarge {
            name: file.name.clone(),
            limit_mb: policy.image_max_mb,
        });
    }
    let sniffed = image::guess_format(&file.bytes).map_err(|_| AssetError::NotAnImage {
        name: file.name.clone(),
    })?;
    if !matches!(
        sniffed,
        image::ImageFormat::Png
            | image::ImageFormat::Jpeg
            | image::ImageFormat::Gif
            | image::ImageFormat::WebP
    ) {
        return Err(AssetError::NotAnImage {
            name: file.name.clone(),
        });
    }
    let mime = sniffed.to_mime_type();
    if mime != file.mime {
        debug!("{}: declared {}, contents are {mime}", file.name, file.mime);
    }
    Ok(ImageAsset {
        id: next_id("img"),
        name: file.name.clone(),
        mime: mime.to_string(),
        size: file.size(),
        src: data_uri(mime, &file.bytes),
        date_added: Utc::now(),
    })
}

/// Classify a knowledge upload by declared type, falling back to the
/// extension for text files with an unhelpful type.
pub fn knowledge_kind(file: &RawFile) -> Option<KnowledgeKind> {
    if file.mime == PDF_TYPE {
        return Some(KnowledgeKind::Pdf);
    }
    if TEXT_TYPES.contains(&file.mime.as_str()) {
        return Some(KnowledgeKind::Text);
    }
    let lower = file.name.to_ascii_lowercase();
    TEXT_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
        .then_some(KnowledgeKind::Text)
}

pub fn ingest_knowledge(
    file: &RawFile,
    policy: &UploadPolicy,
) -> Result<KnowledgeAsset, AssetError> {
    let kind = knowledge_kind(file).ok_or_else(|| AssetError::NotKnowledge {
        name: file.name.clone(),
    })?;
    if file.size() > policy.knowledge_max_mb.saturating_mul(MIB) {
        return Err(AssetError::TooLarge {
            name: file.name.clone(),
            limit_mb: policy.knowledge_max_mb,
        });
    }
    let (content, data) = match kind {
        KnowledgeKind::Text => {
            let text =
                String::from_utf8(file.bytes.clone()).map_err(|e| AssetError::Unreadable {
                    name: file.name.clone(),
                    reason: e.to_string(),
                })?;
            (Some(text), None)
        }
        KnowledgeKind::Pdf => (None, Some(data_uri(PDF_TYPE, &file.bytes))),
    };
    Ok(KnowledgeAsset {
        id: next_id("k"),
        title: title_from_filename(&file.name),
        original_filename: file.name.clone(),
        kind,
        content,
        data,
        size: Some(file.size()),
        date_added: Utc::now(),
    })
}

/// A typed note, not backed by a file.
pub fn note(title: Option<&str>, content: &str) -> KnowledgeAsset {
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("Untitled Note")
        .to_string();
    KnowledgeAsset {
        id: next_id("k"),
        original_filename: title.clone(),
        title,
        kind: KnowledgeKind::Text,
        content: Some(content.to_string()),
        data: None,
        size: None,
        date_added: Utc::now(),
    }
}

/// Outcome of a multi-file upload, in input order.
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    pub accepted: Vec<T>,
    pub failures: Vec<AssetError>,
}

impl<T> BatchReport<T> {
    fn from_results(results: Vec<Result<T, AssetError>>) -> Self {
        let mut accepted = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(asset) => accepted.push(asset),
                Err(e) => {
                    warn!("{e}");
                    failures.push(e);
                }
            }
        }
        Self { accepted, failures }
    }
}

/// Ingest a batch in parallel. One bad file never stops the others.
pub fn ingest_batch<T, F>(files: &[RawFile], ingest: F) -> BatchReport<T>
where
    T: Send,
    F: Fn(&RawFile) -> Result<T, AssetError> + Sync,
{
    let results: Vec<Result<T, AssetError>> = files.par_iter().map(&ingest).collect();
    BatchReport::from_results(results)
}

/// Read and ingest files from disk in parallel; unreadable files are
/// reported like validation failures.
pub fn ingest_paths<T, F>(paths: &[PathBuf], ingest: F) -> BatchReport<T>
where
    T: Send,
    F: Fn(&RawFile) -> Result<T, AssetError> + Sync,
{
    let results: Vec<Result<T, AssetError>> = paths
        .par_iter()
        .map(|path| RawFile::from_path(path).and_then(|file| ingest(&file)))
        .collect();
    BatchReport::from_results(results)
}

/// Proof of which ingestion request a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Drops results of ingestions that were superseded before they finished.
///
/// One per upload target: every new file pick takes a ticket, and only the
/// result carrying the newest ticket is accepted.
#[derive(Debug, Default)]
pub struct LatestOnly {
    issued: u64,
}

impl LatestOnly {
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn accept<T>(&self, ticket: Ticket, result: T) -> Option<T> {
        (ticket.0 == self.issued).then_some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn png(name: &str, size: usize) -> RawFile {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(size.max(PNG_MAGIC.len()), 0);
        RawFile::new(name, "image/png", bytes)
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("quarterly_sales-2024.md"), "quarterly sales 2024");
        assert_eq!(title_from_filename("notes"), "notes");
        assert_eq!(title_from_filename("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn test_image_type_rejected() {
        let file = RawFile::new("scan.tiff", "image/tiff", vec![0; 10]);
        let err = ingest_image(&file, &UploadPolicy::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "scan.tiff is not a valid image file. Please upload JPEG, PNG, GIF, or WebP files."
        );
    }

    #[test]
    fn test_image_bytes_must_sniff() {
        let file = RawFile::new("fake.png", "image/png", b"not an image at all".to_vec());
        assert!(matches!(
            ingest_image(&file, &UploadPolicy::default()),
            Err(AssetError::NotAnImage { .. })
        ));
    }

    #[test]
    fn test_image_accepted() {
        let asset = ingest_image(&png("cat.png", 64), &UploadPolicy::default()).unwrap();
        assert_eq!(asset.name, "cat.png");
        assert_eq!(asset.size, 64);
        assert!(asset.id.starts_with("img-"));
        assert!(asset.src.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_type_comes_from_contents() {
        let mut bytes = b"\xff\xd8\xff\xe0".to_vec();
        bytes.resize(64, 0);
        let file = RawFile::new("photo.png", "image/png", bytes);
        let asset = ingest_image(&file, &UploadPolicy::default()).unwrap();
        assert_eq!(asset.mime, "image/jpeg");
        assert!(asset.src.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_huge_cap_does_not_overflow() {
        let policy = UploadPolicy {
            image_max_mb: u64::MAX / 2,
            knowledge_max_mb: u64::MAX,
        };
        assert!(ingest_image(&png("cat.png", 100), &policy).is_ok());
        let text = RawFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(ingest_knowledge(&text, &policy).is_ok());
    }

    #[test]
    fn test_oversized_image_in_batch() {
        let files = vec![png("huge.png", 6 * 1024 * 1024), png("small.png", 100)];
        let report = ingest_batch(&files, |f| ingest_image(f, &UploadPolicy::default()));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file_name(), "huge.png");
        assert_eq!(
            report.failures[0].to_string(),
            "huge.png is too large. Maximum file size is 5MB."
        );
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].name, "small.png");
    }

    #[test]
    fn test_knowledge_kinds() {
        let pdf = RawFile::new("deck.pdf", PDF_TYPE, b"%PDF-1.4".to_vec());
        let md = RawFile::new("notes.md", "", b"# hi".to_vec());
        let bin = RawFile::new("tool.exe", "application/octet-stream", vec![0]);
        assert_eq!(knowledge_kind(&pdf), Some(KnowledgeKind::Pdf));
        assert_eq!(knowledge_kind(&md), Some(KnowledgeKind::Text));
        assert_eq!(knowledge_kind(&bin), None);
    }

    #[test]
    fn test_knowledge_text_and_pdf() {
        let policy = UploadPolicy::default();
        let text = ingest_knowledge(
            &RawFile::new("meeting_notes.txt", "text/plain", b"Agenda".to_vec()),
            &policy,
        )
        .unwrap();
        assert_eq!(text.title, "meeting notes");
        assert_eq!(text.original_filename, "meeting_notes.txt");
        assert_eq!(text.content.as_deref(), Some("Agenda"));
        assert!(text.data.is_none());
        assert!(text.id.starts_with("k-"));

        let pdf = ingest_knowledge(
            &RawFile::new("brief.pdf", PDF_TYPE, b"%PDF-1.4".to_vec()),
            &policy,
        )
        .unwrap();
        assert_eq!(pdf.kind, KnowledgeKind::Pdf);
        assert!(pdf.content.is_none());
        assert!(pdf.data.unwrap().starts_with("data:application/pdf;base64,"));
    }

    #[test]
    fn test_knowledge_not_utf8() {
        let file = RawFile::new("bad.txt", "text/plain", vec![0xff, 0xfe, 0xfd]);
        let err = ingest_knowledge(&file, &UploadPolicy::default()).unwrap_err();
        assert!(matches!(err, AssetError::Unreadable { .. }));
        assert_eq!(err.file_name(), "bad.txt");
    }

    #[test]
    fn test_knowledge_size_cap() {
        let file = RawFile::new("big.txt", "text/plain", vec![b'a'; 11 * 1024 * 1024]);
        let err = ingest_knowledge(&file, &UploadPolicy::default()).unwrap_err();
        assert_eq!(err.to_string(), "big.txt is too large. Maximum file size is 10MB.");
    }

    #[test]
    fn test_note_defaults_title() {
        let n = note(None, "remember this");
        assert_eq!(n.title, "Untitled Note");
        assert_eq!(n.kind, KnowledgeKind::Text);
        assert_eq!(note(Some("Plan"), "").title, "Plan");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = note(None, "");
        let b = note(None, "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_unreadable_path_reported() {
        let report = ingest_paths(&[PathBuf::from("/definitely/not/here.png")], |f| {
            ingest_image(f, &UploadPolicy::default())
        });
        assert!(report.accepted.is_empty());
        assert_eq!(report.failures[0].file_name(), "here.png");
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("Photo.JPG"), "image/jpeg");
        assert_eq!(mime_from_extension("readme"), "");
    }

    #[test]
    fn test_latest_only_discards_superseded() {
        let mut slot = LatestOnly::default();
        let first = slot.issue();
        let second = slot.issue();
        assert_eq!(slot.accept(first, "old.png"), None);
        assert_eq!(slot.accept(second, "new.png"), Some("new.png"));
    }
}
