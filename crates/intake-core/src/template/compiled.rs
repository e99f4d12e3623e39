use crate::error::IntakeError;
use crate::model::SectionKind;
use crate::parsing::normalize::{contains_phrase, normalize_label};
use crate::template::schema::{FieldDef, SectionDef, TemplateDef, ValueType};
use crate::template::validate_template;
use regex::Regex;
use std::collections::HashMap;

/// Header lines longer than this are treated as prose.
const MAX_HEADER_WORDS: usize = 8;

/// How many leading words a keyword-form label may span.
const MAX_KEYWORD_LABEL_WORDS: usize = 6;

/// A template with its lookup tables built: normalized labels, header phrases,
/// glyphs and compiled patterns. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    def: TemplateDef,
    /// Normalized label -> index into `def.fields`.
    labels: HashMap<String, usize>,
    /// (section, normalized phrase) in declaration order.
    headers: Vec<(SectionKind, String)>,
    /// (glyph, checked), longest glyph first.
    glyphs: Vec<(String, bool)>,
    patterns: HashMap<String, Regex>,
    /// Field id -> (normalized option, option as written).
    options: HashMap<String, Vec<(String, String)>>,
}

/// A line split into a recognized label and the text after it.
#[derive(Debug, Clone, Copy)]
pub struct LabelSplit<'t, 'l> {
    pub field: &'t FieldDef,
    /// Trimmed answer text; may be empty.
    pub value: &'l str,
    pub form: LabelForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelForm {
    /// "Label: value"
    Colon,
    /// "Label value" or "Label - value"
    Keyword,
}

/// One box of a checkbox line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxItem {
    pub checked: bool,
    pub label: String,
}

impl CompiledTemplate {
    pub fn new(def: TemplateDef) -> Result<Self, IntakeError> {
        validate_template(&def)?;

        let mut labels = HashMap::new();
        let mut patterns = HashMap::new();
        let mut options = HashMap::new();
        for (idx, field) in def.fields.iter().enumerate() {
            for label in &field.labels {
                labels.insert(normalize_label(label), idx);
            }
            if let Some(ref pattern) = field.pattern {
                let re = Regex::new(pattern).map_err(|e| {
                    IntakeError::TemplateInvalid(format!(
                        "field '{}' has an invalid pattern: {}",
                        field.id, e
                    ))
                })?;
                patterns.insert(field.id.clone(), re);
            }
            if !field.options.is_empty() {
                let normalized = field
                    .options
                    .iter()
                    .map(|o| (normalize_label(o), o.clone()))
                    .collect();
                options.insert(field.id.clone(), normalized);
            }
        }

        let headers = def
            .sections
            .iter()
            .flat_map(|s| {
                s.headers
                    .iter()
                    .map(|h| (s.kind, normalize_label(h)))
                    .filter(|(_, h)| !h.is_empty())
            })
            .collect();

        let mut glyphs: Vec<(String, bool)> = def
            .checkbox
            .checked
            .iter()
            .map(|g| (g.clone(), true))
            .chain(def.checkbox.unchecked.iter().map(|g| (g.clone(), false)))
            .filter(|(g, _)| !g.trim().is_empty())
            .collect();
        glyphs.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        Ok(CompiledTemplate {
            def,
            labels,
            headers,
            glyphs,
            patterns,
            options,
        })
    }

    pub fn def(&self) -> &TemplateDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.def.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.def.field(id)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionDef> {
        self.def.section(kind)
    }

    pub fn pattern(&self, field_id: &str) -> Option<&Regex> {
        self.patterns.get(field_id)
    }

    /// Look up a raw label ("Full Name", "3. Age (years)").
    pub fn label_field(&self, raw_label: &str) -> Option<&FieldDef> {
        let key = normalize_label(raw_label);
        self.labels.get(&key).map(|&idx| &self.def.fields[idx])
    }

    /// Split "Label: value" at the first colon when the left side is a known label.
    pub fn split_colon<'l>(&self, line: &'l str) -> Option<LabelSplit<'_, 'l>> {
        let (left, right) = line.split_once(':')?;
        let field = self.label_field(left)?;
        Some(LabelSplit {
            field,
            value: right.trim(),
            form: LabelForm::Colon,
        })
    }

    /// Split "Label value" / "Label - value" on the longest known label that
    /// ends on a word boundary at the start of the line.
    pub fn split_keyword<'l>(&self, line: &'l str) -> Option<LabelSplit<'_, 'l>> {
        let mut best: Option<(usize, usize)> = None;
        let mut words = 0;
        let mut in_word = false;

        for (i, c) in line.char_indices() {
            let alnum = c.is_alphanumeric();
            if in_word && !alnum {
                words += 1;
                if let Some(&idx) = self.labels.get(&normalize_label(&line[..i])) {
                    best = Some((i, idx));
                }
                if words >= MAX_KEYWORD_LABEL_WORDS {
                    break;
                }
            }
            in_word = alnum;
        }
        if in_word && words < MAX_KEYWORD_LABEL_WORDS {
            if let Some(&idx) = self.labels.get(&normalize_label(line)) {
                best = Some((line.len(), idx));
            }
        }

        let (end, idx) = best?;
        let rest = line[end..].trim_start();
        let rest = rest
            .strip_prefix(['-', '=', '–', '—'])
            .unwrap_or(rest)
            .trim();
        Some(LabelSplit {
            field: &self.def.fields[idx],
            value: rest,
            form: LabelForm::Keyword,
        })
    }

    /// True if the line opens with a known field label in either form.
    pub fn starts_with_known_label(&self, line: &str) -> bool {
        self.split_colon(line).is_some() || self.split_keyword(line).is_some()
    }

    /// Recognize a section header line.
    ///
    /// The line must be short and header-shaped (colon-terminated, all caps,
    /// exactly a header phrase, or opening with "section"/"part"), must not be
    /// a checkbox line or a "known label: answer" pair, and must contain a
    /// header phrase on word boundaries. The first declared section wins.
    pub fn match_header(&self, line: &str) -> Option<SectionKind> {
        let line = line.trim();
        if line.is_empty()
            || line.split_whitespace().count() > MAX_HEADER_WORDS
            || self.is_checkbox_line(line)
        {
            return None;
        }

        if let Some(split) = self.split_colon(line) {
            if !split.value.is_empty() {
                return None;
            }
        }

        let normalized = normalize_label(line);
        if normalized.is_empty() {
            return None;
        }

        let colon_terminated = line.ends_with(':');
        let has_letters = line.chars().any(char::is_alphabetic);
        let all_caps = has_letters && !line.chars().any(char::is_lowercase);
        let numbered = normalized.starts_with("section ") || normalized.starts_with("part ");
        let exact = self.headers.iter().any(|(_, h)| *h == normalized);

        if !(colon_terminated || all_caps || numbered || exact) {
            return None;
        }

        self.headers
            .iter()
            .find(|(_, phrase)| contains_phrase(&normalized, phrase))
            .map(|(kind, _)| *kind)
    }

    /// True if the line opens with a checkbox glyph.
    pub fn is_checkbox_line(&self, line: &str) -> bool {
        let line = line.trim_start();
        self.glyphs.iter().any(|(g, _)| line.starts_with(g.as_str()))
    }

    /// Parse a checkbox line into its boxes. Several boxes may share a line
    /// ("[x] Morning [ ] Evening"); a glyph inside an option label only
    /// counts when preceded by whitespace.
    pub fn checkbox_items(&self, line: &str) -> Option<Vec<CheckboxItem>> {
        let line = line.trim();
        if !self.is_checkbox_line(line) {
            return None;
        }

        // (start, end, checked) of every glyph occurrence
        let mut marks: Vec<(usize, usize, bool)> = Vec::new();
        let mut prev: Option<char> = None;
        let mut skip_until = 0;
        for (i, c) in line.char_indices() {
            if i >= skip_until && prev.map_or(true, char::is_whitespace) {
                if let Some((g, checked)) =
                    self.glyphs.iter().find(|(g, _)| line[i..].starts_with(g.as_str()))
                {
                    marks.push((i, i + g.len(), *checked));
                    skip_until = i + g.len();
                }
            }
            prev = Some(c);
        }

        let items = marks
            .iter()
            .enumerate()
            .filter_map(|(n, &(_, end, checked))| {
                let stop = marks.get(n + 1).map_or(line.len(), |m| m.0);
                let label = clean_option_label(&line[end..stop]);
                (!label.is_empty()).then(|| CheckboxItem { checked, label })
            })
            .collect();
        Some(items)
    }

    /// The template's spelling of an option of a field, if the text names one.
    pub fn canonical_option(&self, field_id: &str, text: &str) -> Option<&str> {
        let key = normalize_label(text);
        self.options
            .get(field_id)?
            .iter()
            .find(|(norm, _)| *norm == key)
            .map(|(_, written)| written.as_str())
    }

    /// The longest option of a choice field contained in the answer.
    pub fn choice_option(&self, field_id: &str, answer: &str) -> Option<&str> {
        let key = normalize_label(answer);
        self.options
            .get(field_id)?
            .iter()
            .filter(|(norm, _)| contains_phrase(&key, norm))
            .max_by_key(|(norm, _)| norm.len())
            .map(|(_, written)| written.as_str())
    }

    /// The first selection field whose option vocabulary holds this option.
    pub fn option_owner(&self, option: &str) -> Option<&FieldDef> {
        let key = normalize_label(option);
        self.def.fields.iter().find(|f| {
            f.value_type == ValueType::Selection
                && self
                    .options
                    .get(&f.id)
                    .is_some_and(|opts| opts.iter().any(|(norm, _)| *norm == key))
        })
    }
}

fn clean_option_label(raw: &str) -> String {
    raw.trim()
        .trim_end_matches([',', ';', '|'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::builtin::load_preset;

    fn fitness() -> CompiledTemplate {
        CompiledTemplate::new(load_preset("fitness").unwrap()).unwrap()
    }

    #[test]
    fn test_label_synonyms() {
        let t = fitness();
        assert_eq!(t.label_field("Full Name").unwrap().id, "identity.name");
        assert_eq!(t.label_field("name").unwrap().id, "identity.name");
        assert_eq!(t.label_field("Weight (kg)").unwrap().id, "metric.weight");
        assert!(t.label_field("Favourite colour").is_none());
    }

    #[test]
    fn test_split_colon() {
        let t = fitness();
        let s = t.split_colon("Name:  John Doe ").unwrap();
        assert_eq!(s.field.id, "identity.name");
        assert_eq!(s.value, "John Doe");
        assert_eq!(s.form, LabelForm::Colon);
        assert!(t.split_colon("Something else: 3").is_none());
        assert!(t.split_colon("No colon here").is_none());
    }

    #[test]
    fn test_split_keyword_longest_label() {
        let t = fitness();
        let s = t.split_keyword("Resting heart rate - 62 bpm").unwrap();
        assert_eq!(s.field.id, "metric.resting_heart_rate");
        assert_eq!(s.value, "62 bpm");

        let s = t.split_keyword("Age 30").unwrap();
        assert_eq!(s.field.id, "identity.age");
        assert_eq!(s.value, "30");

        let s = t.split_keyword("Body fat percentage 21").unwrap();
        assert_eq!(s.field.id, "metric.body_fat");
        assert_eq!(s.value, "21");
    }

    #[test]
    fn test_split_keyword_needs_word_boundary() {
        let t = fitness();
        assert!(t.split_keyword("Agent Smith").is_none());
    }

    #[test]
    fn test_header_shapes() {
        let t = fitness();
        assert_eq!(t.match_header("PERSONAL INFORMATION:"), Some(SectionKind::PersonalInfo));
        assert_eq!(t.match_header("Assessment Scales (1-10)"), Some(SectionKind::AssessmentScales));
        assert_eq!(t.match_header("Section 3: Fitness Goals"), Some(SectionKind::Goals));
        assert_eq!(t.match_header("goals"), Some(SectionKind::Goals));
        assert_eq!(t.match_header("MEDICAL HISTORY"), Some(SectionKind::HealthMetrics));
        assert_eq!(t.match_header("ADDITIONAL NOTES"), Some(SectionKind::FreeText));
    }

    #[test]
    fn test_header_rejects_prose_and_pairs() {
        let t = fitness();
        assert_eq!(t.match_header("My goals are to get stronger"), None);
        assert_eq!(t.match_header("GOALS: lose weight"), None);
        assert_eq!(t.match_header("[x] Diet"), None);
        assert_eq!(t.match_header("HEALTH & FITNESS QUESTIONNAIRE"), None);
        assert_eq!(
            t.match_header("PLEASE LIST ANY EQUIPMENT YOU HAVE ACCESS TO AT HOME OR THE GYM"),
            None
        );
    }

    #[test]
    fn test_header_first_declared_wins() {
        let t = fitness();
        // both "goals" and "equipment" phrases occur
        assert_eq!(t.match_header("GOALS AND EQUIPMENT"), Some(SectionKind::Goals));
    }

    #[test]
    fn test_checkbox_single() {
        let t = fitness();
        let items = t.checkbox_items("[x] Lose weight").unwrap();
        assert_eq!(
            items,
            vec![CheckboxItem {
                checked: true,
                label: "Lose weight".into()
            }]
        );
        let items = t.checkbox_items("☐ Yoga mat").unwrap();
        assert!(!items[0].checked);
        assert!(t.checkbox_items("Lose weight").is_none());
    }

    #[test]
    fn test_checkbox_inline_group() {
        let t = fitness();
        let items = t.checkbox_items("[x] Morning  [ ] Afternoon  ☑ Evening").unwrap();
        let checked: Vec<&str> = items
            .iter()
            .filter(|i| i.checked)
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(items.len(), 3);
        assert_eq!(checked, vec!["Morning", "Evening"]);
    }

    #[test]
    fn test_checkbox_wingdings() {
        let t = fitness();
        let items = t.checkbox_items("\u{f0fe} Dumbbells \u{f0a8} Barbells").unwrap();
        assert!(items[0].checked);
        assert!(!items[1].checked);
    }

    #[test]
    fn test_choice_option_longest() {
        let t = fitness();
        assert_eq!(
            t.choice_option("metric.activity_level", "Very active lifestyle"),
            Some("very active")
        );
        assert_eq!(t.choice_option("metric.activity_level", "Moderate"), Some("moderate"));
        assert_eq!(t.choice_option("metric.activity_level", "couch"), None);
    }

    #[test]
    fn test_option_owner_and_canonical() {
        let t = fitness();
        assert_eq!(t.option_owner("yoga mat").unwrap().id, "multiselect.equipment");
        assert_eq!(t.option_owner("Evening").unwrap().id, "multiselect.workout_times");
        assert!(t.option_owner("Trampoline").is_none());
        assert_eq!(
            t.canonical_option("multiselect.goals", "lose  WEIGHT"),
            Some("Lose weight")
        );
    }
}
