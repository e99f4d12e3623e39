use crate::error::IntakeError;
use crate::extraction::{split_pages, PageContent, PdfExtractor};
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` so that label/value pairs and checkbox rows keep
/// their line structure.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IntakeError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| IntakeError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| IntakeError::Extraction(e.to_string()))?;

        // -layout keeps each checkbox row and "Label:   value" pair on one
        // physical line; the line normalizer splits the columns apart again.
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    IntakeError::PdftotextNotFound
                } else {
                    IntakeError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(IntakeError::PdftotextFailed { code, stderr });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(pages_from_layout_text(&text))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// pdftotext separates pages with form feeds and always ends with one.
fn pages_from_layout_text(text: &str) -> Vec<PageContent> {
    split_pages(text)
        .into_iter()
        .enumerate()
        .map(|(i, lines)| PageContent {
            page_number: i + 1,
            lines,
        })
        .filter(|p| !p.lines.is_empty() || p.page_number == 1)
        .collect()
}
