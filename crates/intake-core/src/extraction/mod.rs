pub mod pdftotext;

use crate::error::IntakeError;
use serde::{Deserialize, Serialize};

/// Text extracted from a single page of a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IntakeError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// The raw text of one questionnaire, page by page, as handed over by a
/// text-extraction backend. Never modified after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pages: Vec<PageContent>,
}

impl RawDocument {
    pub fn from_pages(pages: Vec<PageContent>) -> Self {
        RawDocument { pages }
    }

    /// A single-page document.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        RawDocument {
            pages: vec![PageContent {
                page_number: 1,
                lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
            }],
        }
    }

    /// Split plain text into pages on form feeds (the pdftotext page
    /// separator) and into lines on newlines.
    pub fn from_text(text: &str) -> Self {
        let pages = split_pages(text)
            .into_iter()
            .enumerate()
            .map(|(i, lines)| PageContent {
                page_number: i + 1,
                lines,
            })
            .collect();
        RawDocument { pages }
    }

    pub fn pages(&self) -> &[PageContent] {
        &self.pages
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }
}

/// Split text on form feeds into per-page line lists. A trailing empty page
/// (text ending in a form feed) is dropped.
pub(crate) fn split_pages(text: &str) -> Vec<Vec<String>> {
    let mut pages: Vec<Vec<String>> = text
        .split('\x0c')
        .map(|page_text| page_text.lines().map(|l| l.to_string()).collect())
        .collect();

    while pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }

    pages
}
