pub mod assemble;
pub mod error;
pub mod extract;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod template;
pub mod trace;
pub mod validate;

use error::IntakeError;
use extraction::{PdfExtractor, RawDocument};
use parsing::{ParsedQuestionnaire, QuestionnaireParser};
use tracing::debug;

/// Main API entry point: extract the text of a questionnaire PDF and parse it.
///
/// Only text extraction can fail. Once text is available the parse always
/// produces a record, flagged field by field in its manifest.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    parser: &QuestionnaireParser,
) -> Result<ParsedQuestionnaire, IntakeError> {
    let doc = extract_document(pdf_bytes, extractor)?;
    Ok(parse_document(&doc, parser))
}

/// Run a text-extraction backend over PDF bytes.
pub fn extract_document(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<RawDocument, IntakeError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "extracted PDF text"
    );
    Ok(RawDocument::from_pages(pages))
}

/// Parse already-extracted text.
pub fn parse_document(doc: &RawDocument, parser: &QuestionnaireParser) -> ParsedQuestionnaire {
    parser.parse(doc)
}

/// Parse plain text; form feeds separate pages.
pub fn parse_text(text: &str, parser: &QuestionnaireParser) -> ParsedQuestionnaire {
    parser.parse(&RawDocument::from_text(text))
}
