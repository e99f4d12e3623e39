use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest value on the self-assessment axis.
pub const SCALE_MIN: u8 = 1;
/// Highest value on the self-assessment axis.
pub const SCALE_MAX: u8 = 10;
/// Value written for a scale the respondent did not answer.
pub const SCALE_DEFAULT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    PersonalInfo,
    HealthMetrics,
    AssessmentScales,
    Goals,
    Equipment,
    Schedule,
    Experience,
    Dietary,
    FreeText,
    /// Lines appearing before the first recognized header.
    Unsectioned,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SectionKind::PersonalInfo => "Personal Info",
            SectionKind::HealthMetrics => "Health Metrics",
            SectionKind::AssessmentScales => "Assessment Scales",
            SectionKind::Goals => "Goals",
            SectionKind::Equipment => "Equipment",
            SectionKind::Schedule => "Schedule",
            SectionKind::Experience => "Experience",
            SectionKind::Dietary => "Dietary",
            SectionKind::FreeText => "Free Text",
            SectionKind::Unsectioned => "Unsectioned",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    Identity,
    NumericMetric,
    ScaleRating,
    FreeText,
    MultiSelect,
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldCategory::Identity => write!(f, "Identity"),
            FieldCategory::NumericMetric => write!(f, "Health metrics"),
            FieldCategory::ScaleRating => write!(f, "Assessment scales"),
            FieldCategory::FreeText => write!(f, "Free text"),
            FieldCategory::MultiSelect => write!(f, "Selections"),
        }
    }
}

/// How a candidate value was found.
///
/// Ordering matters: `Matched` sorts above `Inferred`, which is what
/// conflict resolution relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Assigned by a positional or fallback heuristic.
    Inferred,
    /// Found through an explicit label or pattern.
    Matched,
}

/// Where a value came from in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub page_number: usize,
    /// 1-based index of the first physical line on its page.
    pub line_index: usize,
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}:l{}", self.page_number, self.line_index)
    }
}

/// A normalized field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Explicit marker for a field that could not be resolved.
    Unknown,
    Text(String),
    Integer(i64),
    Number(Decimal),
    /// Always within `SCALE_MIN..=SCALE_MAX`.
    Scale(u8),
    Selection(Vec<String>),
}

impl FieldValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Integer(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    pub fn as_scale(&self) -> Option<u8> {
        match self {
            FieldValue::Scale(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&[String]> {
        match self {
            FieldValue::Selection(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unknown => write!(f, "unknown"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Scale(v) => write!(f, "{v}/{SCALE_MAX}"),
            FieldValue::Selection(items) if items.is_empty() => write!(f, "(none)"),
            FieldValue::Selection(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// Resolved from a matched candidate.
    Recovered,
    /// Resolved from an inferred candidate (positional fallback, clamped or
    /// rounded rating). Present but low confidence.
    Inferred,
    /// Nothing usable was found; a substitute value was written.
    Defaulted,
    /// Nothing usable was found; the value is an unknown marker or empty.
    Missing,
    /// Like `Missing`, for a field the template marks as required.
    MissingRequired,
}

impl RecoveryStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RecoveryStatus::Recovered | RecoveryStatus::Inferred)
    }
}

impl fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStatus::Recovered => write!(f, "recovered"),
            RecoveryStatus::Inferred => write!(f, "inferred"),
            RecoveryStatus::Defaulted => write!(f, "defaulted"),
            RecoveryStatus::Missing => write!(f, "missing"),
            RecoveryStatus::MissingRequired => write!(f, "missing-required"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub status: RecoveryStatus,
    /// Confidence of the winning candidate, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Per-field bookkeeping of how each schema field was resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryManifest {
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl RecoveryManifest {
    pub fn status(&self, field: &str) -> Option<RecoveryStatus> {
        self.entries.get(field).map(|e| e.status)
    }

    pub fn count(&self, status: RecoveryStatus) -> usize {
        self.entries.values().filter(|e| e.status == status).count()
    }

    /// Field ids whose entry is `MissingRequired`, in id order.
    pub fn missing_required(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.status == RecoveryStatus::MissingRequired)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// The validated output of one parse.
///
/// Every field of the template schema has exactly one value and exactly one
/// manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRecord {
    /// Name of the template the record was built against.
    pub template: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub manifest: RecoveryManifest,
}

impl StructuredRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// The scale subset handed to chart rendering: every scale field with its
    /// 1-10 value, defaults included.
    pub fn scale_ratings(&self) -> BTreeMap<String, u8> {
        self.fields
            .iter()
            .filter_map(|(id, v)| v.as_scale().map(|s| (id.clone(), s)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.manifest.count(RecoveryStatus::MissingRequired) == 0
    }
}
