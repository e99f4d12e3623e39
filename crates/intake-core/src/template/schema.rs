use crate::model::{FieldCategory, SectionKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A questionnaire template: the header vocabulary, label synonym tables and
/// field schema that drive extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub checkbox: CheckboxGlyphs,
    /// Ordered; when a header line matches several sections the first one
    /// declared wins.
    pub sections: Vec<SectionDef>,
    pub fields: Vec<FieldDef>,
}

impl TemplateDef {
    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Glyphs that open a checkbox line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckboxGlyphs {
    pub checked: Vec<String>,
    pub unchecked: Vec<String>,
}

impl Default for CheckboxGlyphs {
    fn default() -> Self {
        fn owned(glyphs: &[&str]) -> Vec<String> {
            glyphs.iter().map(|g| g.to_string()).collect()
        }

        CheckboxGlyphs {
            checked: owned(&[
                "[x]", "[X]", "[✓]", "[✔]", "(x)", "(X)", "☑", "☒", "✓", "✔", "✗", "✘", "■",
                "◉", "\u{f0fe}",
            ]),
            unchecked: owned(&["[ ]", "[]", "( )", "()", "☐", "□", "○", "◯", "\u{f0a8}", "\u{f06f}"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDef {
    pub kind: SectionKind,
    /// Header phrases, matched case-insensitively on whole words.
    pub headers: Vec<String>,
    /// Multi-select field that receives this section's checked boxes.
    #[serde(default)]
    pub selection_field: Option<String>,
    /// Free-text field that receives this section's unclaimed lines.
    #[serde(default)]
    pub narrative_field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Any non-empty string, optionally checked against `pattern`.
    Text,
    Integer,
    Decimal,
    /// One of `options`, canonicalized to the option text.
    Choice,
    /// 1-10 rating.
    Scale,
    /// Ordered list of chosen options.
    Selection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Namespaced identifier, e.g. "identity.name".
    pub id: String,
    pub category: FieldCategory,
    pub value_type: ValueType,
    /// Label synonyms as they appear on questionnaires.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub required: bool,
    /// Allowed answers for `choice`, known checkbox options for `selection`.
    #[serde(default)]
    pub options: Vec<String>,
    /// Regex a `text` answer must match.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Section whose first unlabeled line is taken as an inferred answer.
    #[serde(default)]
    pub fallback_section: Option<SectionKind>,
    #[serde(default)]
    pub description: Option<String>,
}
