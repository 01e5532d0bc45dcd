//! Document-to-markdown conversion.
//!
//! The handlers only see [`DocumentConverter`]: give it the path of a stored
//! upload and get markdown back. [`MarkdownConverter`] is the production
//! implementation. It picks a renderer from the file's magic bytes and
//! extension and runs it on the blocking pool under a timeout.

pub mod pdf;
pub mod tabular;

use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Render the document at `path` as markdown.
    async fn convert(&self, path: &Path) -> AppResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Markdown,
    PlainText,
    Csv,
}

impl DocumentKind {
    /// Classify a document by its leading bytes, falling back to the extension.
    pub fn detect(path: &Path, content: &[u8]) -> AppResult<Self> {
        if content.starts_with(PDF_MAGIC) {
            return Ok(DocumentKind::Pdf);
        }

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("application", "pdf") => Ok(DocumentKind::Pdf),
            ("text", "markdown") | ("text", "x-markdown") => Ok(DocumentKind::Markdown),
            ("text", "csv") => Ok(DocumentKind::Csv),
            ("text", _) | ("application", "json") => Ok(DocumentKind::PlainText),
            _ => Err(AppError::UnsupportedDocument(mime.to_string())),
        }
    }
}

pub struct MarkdownConverter {
    timeout: Duration,
}

impl MarkdownConverter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl DocumentConverter for MarkdownConverter {
    async fn convert(&self, path: &Path) -> AppResult<String> {
        let owned: PathBuf = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || convert_blocking(&owned));

        // On timeout the blocking task keeps running detached; its result is discarded.
        let markdown = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(AppError::Conversion(format!("conversion task failed: {}", e)))
            }
            Err(_) => {
                return Err(AppError::Conversion(format!(
                    "conversion timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        info!("Converted {} to {} characters of markdown", path.display(), markdown.len());
        Ok(markdown)
    }
}

fn convert_blocking(path: &Path) -> AppResult<String> {
    let content = std::fs::read(path)?;
    let kind = DocumentKind::detect(path, &content)?;
    debug!("Detected {:?} document at {}", kind, path.display());

    match kind {
        DocumentKind::Pdf => pdf::to_markdown(&content),
        DocumentKind::Csv => tabular::to_markdown(&content),
        DocumentKind::Markdown | DocumentKind::PlainText => decode_text(&content),
    }
}

fn decode_text(content: &[u8]) -> AppResult<String> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    String::from_utf8(content.to_vec())
        .map_err(|e| AppError::Conversion(format!("document is not valid UTF-8: {}", e)))
}
