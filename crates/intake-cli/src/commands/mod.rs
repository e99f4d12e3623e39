pub mod batch;
pub mod parse;
pub mod template;

use intake_core::error::IntakeError;
use intake_core::extraction::pdftotext::PdftotextExtractor;
use intake_core::extraction::RawDocument;
use intake_core::parsing::QuestionnaireParser;
use intake_core::template::builtin::{load_preset, DEFAULT_PRESET};
use intake_core::template::load_template;
use std::path::Path;
use tracing::warn;

/// File extensions `read_document` understands.
pub const INPUT_EXTENSIONS: &[&str] = &["pdf", "txt", "json"];

/// Build a parser from `--template FILE` or `--preset NAME`.
pub fn load_parser(
    template: Option<&Path>,
    preset: Option<&str>,
) -> Result<QuestionnaireParser, IntakeError> {
    let def = match template {
        Some(path) => load_template(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "could not load template");
        })?,
        None => load_preset(preset.unwrap_or(DEFAULT_PRESET))?,
    };
    QuestionnaireParser::new(def)
}

/// Read a questionnaire into raw pages: PDFs go through pdftotext, text files
/// split on form feeds, JSON files hold an array of lines.
pub fn read_document(path: &Path) -> Result<RawDocument, IntakeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => {
            let bytes = std::fs::read(path)?;
            intake_core::extract_document(&bytes, &PdftotextExtractor::new())
        }
        "txt" => Ok(RawDocument::from_text(&std::fs::read_to_string(path)?)),
        "json" => {
            let lines: Vec<String> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(RawDocument::from_lines(&lines))
        }
        _ => Err(IntakeError::UnsupportedInput(format!(
            "{} (expected one of: {})",
            path.display(),
            INPUT_EXTENSIONS.join(", ")
        ))),
    }
}

/// Whether `read_document` accepts this path.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| INPUT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_json_lines() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"["Name: Ann", "Age: 30"]"#).unwrap();
        let doc = read_document(file.path()).unwrap();
        assert_eq!(doc.line_count(), 2);
    }

    #[test]
    fn test_read_text_pages() {
        let mut file = tempfile::Builder::new().suffix(".TXT").tempfile().unwrap();
        write!(file, "Name: Ann\n\x0cAge: 30\n").unwrap();
        let doc = read_document(file.path()).unwrap();
        assert_eq!(doc.pages().len(), 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = read_document(Path::new("answers.docx")).unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedInput(_)));
        assert!(!is_supported(Path::new("answers.docx")));
        assert!(is_supported(Path::new("answers.PDF")));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_parser(None, Some("yoga")).is_err());
        assert!(load_parser(None, None).is_ok());
    }
}
