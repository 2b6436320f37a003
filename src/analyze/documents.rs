// src/analyze/documents.rs
//! Uploaded document handling: save to the upload dir, OCR, clean up.
//!
//! Supported inputs: `jpg`/`jpeg`/`png` (tesseract directly) and `pdf`
//! (rasterised with `pdftoppm`, then tesseract per page). Anything else
//! yields an empty string. Extraction is best effort: failures are logged
//! and reported as `""`, never propagated to the request.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
    Unsupported,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" => DocumentKind::Image,
            "pdf" => DocumentKind::Pdf,
            _ => DocumentKind::Unsupported,
        }
    }
}

#[async_trait]
pub trait DocumentTextExtractor: Send + Sync {
    async fn extract_text(&self, path: &Path) -> Result<String, CollaboratorError>;
    fn name(&self) -> &'static str;
}

/// OCR through the `tesseract` and `pdftoppm` command-line tools.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    tesseract_bin: PathBuf,
    pdftoppm_bin: PathBuf,
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self {
            tesseract_bin: PathBuf::from("tesseract"),
            pdftoppm_bin: PathBuf::from("pdftoppm"),
        }
    }
}

impl TesseractExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binaries(tesseract_bin: impl Into<PathBuf>, pdftoppm_bin: impl Into<PathBuf>) -> Self {
        Self {
            tesseract_bin: tesseract_bin.into(),
            pdftoppm_bin: pdftoppm_bin.into(),
        }
    }

    async fn ocr_image(&self, image: &Path) -> Result<String, CollaboratorError> {
        let out = Command::new(&self.tesseract_bin)
            .arg(image)
            .arg("stdout")
            .output()
            .await?;
        if !out.status.success() {
            return Err(CollaboratorError::Tool {
                tool: "tesseract",
                status: out.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    async fn ocr_pdf(&self, pdf: &Path) -> Result<String, CollaboratorError> {
        let stem = pdf
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let prefix = pdf.with_file_name(format!("{stem}_page"));

        let out = Command::new(&self.pdftoppm_bin)
            .args(["-png", "-r", "300"])
            .arg(pdf)
            .arg(&prefix)
            .output()
            .await?;
        if !out.status.success() {
            return Err(CollaboratorError::Tool {
                tool: "pdftoppm",
                status: out.status.to_string(),
            });
        }

        let pages = page_images(&prefix).await?;
        let mut text = String::new();
        let mut result = Ok(());
        for page in &pages {
            match self.ocr_image(page).await {
                Ok(t) => text.push_str(&t),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        for page in &pages {
            let _ = tokio::fs::remove_file(page).await; // best-effort
        }
        result.map(|_| text)
    }
}

/// Page images written by pdftoppm for `prefix`, in page order.
async fn page_images(prefix: &Path) -> Result<Vec<PathBuf>, CollaboratorError> {
    let dir = prefix.parent().unwrap_or_else(|| Path::new("."));
    let stem = prefix
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let mut pages = Vec::new();
    let mut rd = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        let is_page = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|n| n.starts_with(&format!("{stem}-")) && n.ends_with(".png"));
        if is_page {
            pages.push(path);
        }
    }
    // pdftoppm zero-pads page numbers, so lexical order is page order.
    pages.sort();
    Ok(pages)
}

#[async_trait]
impl DocumentTextExtractor for TesseractExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, CollaboratorError> {
        match DocumentKind::from_path(path) {
            DocumentKind::Image => self.ocr_image(path).await,
            DocumentKind::Pdf => self.ocr_pdf(path).await,
            DocumentKind::Unsupported => Ok(String::new()),
        }
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

/// Per-upload result kept on the incident record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub extracted_chars: usize,
}

/// Saves uploads under `upload_dir`, extracts their text and removes them.
pub struct DocumentProcessor {
    upload_dir: PathBuf,
    extractor: std::sync::Arc<dyn DocumentTextExtractor>,
}

impl DocumentProcessor {
    /// Creates the upload dir if needed.
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        extractor: std::sync::Arc<dyn DocumentTextExtractor>,
    ) -> std::io::Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            upload_dir,
            extractor,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Writes `bytes` to `{upload_dir}/{incident_id}_{basename}`.
    pub async fn save_file(&self, incident_id: u64, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self
            .upload_dir
            .join(format!("{incident_id}_{}", sanitize_filename(filename)));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Best-effort text; failures log and return `""`.
    pub async fn extract_text(&self, path: &Path) -> String {
        match self.extractor.extract_text(path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %path.display(), extractor = self.extractor.name(), error = %e, "document text extraction failed");
                String::new()
            }
        }
    }

    /// Save, extract, remove. Only the save can fail.
    pub async fn process(&self, incident_id: u64, filename: &str, bytes: &[u8]) -> std::io::Result<(DocumentSummary, String)> {
        let path = self.save_file(incident_id, filename, bytes).await?;
        let text = self.extract_text(&path).await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!(file = %path.display(), error = %e, "could not remove upload");
        }
        let summary = DocumentSummary {
            filename: sanitize_filename(filename),
            extracted_chars: text.chars().count(),
        };
        Ok((summary, text))
    }
}

/// Base name only; separators and leading dots removed so uploads cannot
/// escape the upload dir.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').trim();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn unique_tmp_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("documents_test_{}", nanos));
        dir
    }

    struct FailingExtractor;

    #[async_trait]
    impl DocumentTextExtractor for FailingExtractor {
        async fn extract_text(&self, _path: &Path) -> Result<String, CollaboratorError> {
            Err(CollaboratorError::Tool {
                tool: "tesseract",
                status: "exit status: 1".into(),
            })
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn kind_by_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a/scan.JPG")), DocumentKind::Image);
        assert_eq!(DocumentKind::from_path(Path::new("bol.pdf")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("notes.txt")), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_path(Path::new("README")), DocumentKind::Unsupported);
    }

    #[test]
    fn filenames_cannot_traverse() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\bol.pdf"), "bol.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[tokio::test]
    async fn unsupported_file_yields_empty_text_and_is_removed() {
        let dir = unique_tmp_dir();
        let p = DocumentProcessor::new(&dir, Arc::new(TesseractExtractor::new())).unwrap();

        let (summary, text) = p.process(7, "notes.txt", b"plain words").await.unwrap();
        assert_eq!(text, "");
        assert_eq!(summary.filename, "notes.txt");
        assert_eq!(summary.extracted_chars, 0);
        assert!(!dir.join("7_notes.txt").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn extractor_failure_degrades_to_empty_string() {
        let dir = unique_tmp_dir();
        let p = DocumentProcessor::new(&dir, Arc::new(FailingExtractor)).unwrap();

        let (_, text) = p.process(1, "scan.png", b"\x89PNG").await.unwrap();
        assert!(text.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
