use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("invalid value '{value}': expected {expected}")]
    InvalidValue { value: String, expected: String },

    #[error("failed to load template from {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    #[error("invalid template: {0}")]
    TemplateInvalid(String),

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("record is missing required field(s): {}", missing.join(", "))]
    IncompleteRecord { missing: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntakeError {
    pub(crate) fn invalid(value: &str, expected: &str) -> Self {
        IntakeError::InvalidValue {
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}
