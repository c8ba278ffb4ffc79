//! Loading documents from disk.
//!
//! Plain text and markdown are read directly. PDF text extraction is
//! delegated to poppler's `pdftotext`, which must be on `PATH`.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// The document formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Markdown,
}

impl DocumentKind {
    /// File extensions accepted for upload and ingestion.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 4] = ["pdf", "txt", "md", "markdown"];

    /// Classify a file by its extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Classify a path or file name by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }

    /// The canonical extension for this kind, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
            Self::Markdown => "md",
        }
    }
}

/// Load a document from disk and extract its text.
///
/// The returned [`Document`] has a fresh id and its `source` metadata set
/// to the file name.
///
/// # Errors
///
/// Returns [`RagError::IngestionError`] if the file is missing, unreadable,
/// not valid UTF-8, of an unsupported type, or text extraction fails.
pub async fn load_document(path: &Path) -> Result<Document> {
    let source = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    load_document_as(path, &source).await
}

/// Like [`load_document`], but records `source` as the document's origin.
///
/// Used when the file on disk is a temporary copy of something the caller
/// knows by another name.
pub async fn load_document_as(path: &Path, source: &str) -> Result<Document> {
    let shown = path.display().to_string();
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        RagError::ingestion(
            &shown,
            format!(
                "unsupported document type; expected one of: {}",
                DocumentKind::SUPPORTED_EXTENSIONS.join(", ")
            ),
        )
    })?;

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| RagError::ingestion(&shown, format!("cannot access file: {e}")))?;
    if !metadata.is_file() {
        return Err(RagError::ingestion(&shown, "not a regular file"));
    }

    let text = match kind {
        DocumentKind::Text | DocumentKind::Markdown => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| RagError::ingestion(&shown, format!("failed to read file: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|_| RagError::ingestion(&shown, "file is not valid UTF-8 text"))?
        }
        DocumentKind::Pdf => extract_pdf_text(path, &shown).await?,
    };

    debug!(path = %shown, ?kind, text_len = text.len(), "loaded document");
    Ok(Document::new(text).with_source(source))
}

async fn extract_pdf_text(path: &Path, shown: &str) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to run pdftotext");
            RagError::ingestion(shown, format!("pdftotext could not be run (is poppler installed?): {e}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RagError::ingestion(shown, format!("pdftotext failed: {}", stderr.trim())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_extensions_case_insensitively() {
        assert_eq!(DocumentKind::from_path("paper.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path("notes.txt"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_path("README.md"), Some(DocumentKind::Markdown));
        assert_eq!(DocumentKind::from_path("payload.exe"), None);
        assert_eq!(DocumentKind::from_path("no_extension"), None);
    }

    #[test]
    fn advertised_extensions_match_accepted_ones() {
        for extension in DocumentKind::SUPPORTED_EXTENSIONS {
            assert!(DocumentKind::from_extension(extension).is_some(), "{extension}");
        }
        assert_eq!(DocumentKind::from_path("guide.markdown"), Some(DocumentKind::Markdown));
    }

    #[tokio::test]
    async fn loads_markdown_long_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.markdown");
        std::fs::write(&path, "# Sky\n\nThe sky is blue.").unwrap();

        let document = load_document(&path).await.unwrap();
        assert!(document.text.contains("The sky is blue."));
        assert_eq!(document.metadata.get("source").map(String::as_str), Some("guide.markdown"));
    }

    #[tokio::test]
    async fn loads_text_file_with_source_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.txt");
        std::fs::write(&path, "The sky is blue.").unwrap();

        let document = load_document(&path).await.unwrap();
        assert_eq!(document.text, "The sky is blue.");
        assert_eq!(document.metadata.get("source").map(String::as_str), Some("sky.txt"));
    }

    #[tokio::test]
    async fn missing_file_is_ingestion_error() {
        let err = load_document(Path::new("/definitely/not/here.txt")).await.unwrap_err();
        assert!(matches!(err, RagError::IngestionError { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();

        let err = load_document(&path).await.unwrap_err();
        assert!(matches!(err, RagError::IngestionError { .. }));
        assert!(err.to_string().contains("pdf, txt, md, markdown"), "{err}");
    }

    #[tokio::test]
    async fn invalid_utf8_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xffu8, 0xfe, 0xfd]).unwrap();

        let err = load_document(&path).await.unwrap_err();
        assert!(matches!(err, RagError::IngestionError { .. }));
    }
}
