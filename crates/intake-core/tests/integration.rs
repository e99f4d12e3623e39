//! Integration tests for the parse_pdf() end-to-end pipeline.
//!
//! Uses a MockExtractor that returns pre-built PageContent without
//! invoking pdftotext, so these tests run without poppler-utils.

use intake_core::error::IntakeError;
use intake_core::extraction::{PageContent, PdfExtractor, RawDocument};
use intake_core::model::{Confidence, FieldValue, RecoveryStatus, SCALE_DEFAULT};
use intake_core::parsing::QuestionnaireParser;
use intake_core::trace::Disposition;
use intake_core::{parse_document, parse_pdf, parse_text};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IntakeError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct FailingExtractor;

impl PdfExtractor for FailingExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IntakeError> {
        Err(IntakeError::PdftotextNotFound)
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    PageContent {
        page_number: number,
        lines: lines.iter().map(|s| s.to_string()).collect(),
    }
}

fn parser() -> QuestionnaireParser {
    QuestionnaireParser::with_preset("fitness").unwrap()
}

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.into())
}

fn selection(items: &[&str]) -> FieldValue {
    FieldValue::Selection(items.iter().map(|s| s.to_string()).collect())
}

// ---------------------------------------------------------------------------
// Test 1: The reference questionnaire
// ---------------------------------------------------------------------------
#[test]
fn reference_questionnaire() {
    let extractor = MockExtractor {
        pages: vec![page(
            1,
            &[
                "PERSONAL INFORMATION:",
                "Name: John Doe",
                "Age: 30",
                "ASSESSMENT SCALES:",
                "Fitness Level: 6",
                "Energy Level: 13",
                "GOALS:",
                "[x] Lose weight",
                "[ ] Improve endurance",
            ],
        )],
    };

    let parsed = parse_pdf(&[], &extractor, &parser()).unwrap();
    let record = &parsed.record;

    assert_eq!(record.get("identity.name"), Some(&text("John Doe")));
    assert_eq!(record.get("identity.age"), Some(&FieldValue::Integer(30)));
    assert_eq!(record.get("scale.fitness_level"), Some(&FieldValue::Scale(6)));
    assert_eq!(record.get("scale.energy_level"), Some(&FieldValue::Scale(10)));
    assert_eq!(record.get("multiselect.goals"), Some(&selection(&["Lose weight"])));

    let m = &record.manifest;
    assert_eq!(m.status("identity.name"), Some(RecoveryStatus::Recovered));
    assert_eq!(m.status("scale.fitness_level"), Some(RecoveryStatus::Recovered));
    let energy = &m.entries["scale.energy_level"];
    assert_eq!(energy.status, RecoveryStatus::Inferred);
    assert_eq!(energy.confidence, Some(Confidence::Inferred));
    assert_eq!(energy.notes, vec!["clamped from 13".to_string()]);

    assert_eq!(record.get("multiselect.equipment"), Some(&selection(&[])));
    assert_eq!(m.status("multiselect.equipment"), Some(RecoveryStatus::Missing));
    assert_eq!(m.status("scale.motivation"), Some(RecoveryStatus::Defaulted));
    assert!(record.is_complete());
}

// ---------------------------------------------------------------------------
// Test 2: Empty input yields a fully defaulted record
// ---------------------------------------------------------------------------
#[test]
fn empty_input_fully_defaulted() {
    let p = parser();
    let parsed = parse_document(&RawDocument::default(), &p);
    let record = &parsed.record;

    assert_eq!(record.fields.len(), p.template().fields().len());
    assert_eq!(record.manifest.entries.len(), record.fields.len());
    assert!(record
        .manifest
        .entries
        .values()
        .all(|e| !e.status.is_resolved()));
    assert_eq!(
        record.manifest.missing_required(),
        vec!["identity.age".to_string(), "identity.name".to_string()]
    );
    assert!(record.fields.values().all(|v| matches!(
        v,
        FieldValue::Unknown | FieldValue::Scale(SCALE_DEFAULT) | FieldValue::Selection(_)
    )));
    assert!(parsed.trace.candidates.is_empty());
}

// ---------------------------------------------------------------------------
// Test 3: Unrecognizable text never aborts
// ---------------------------------------------------------------------------
#[test]
fn unrecognized_text_still_produces_record() {
    let parsed = parse_text("Lorem ipsum dolor sit amet\n\u{0}\u{7}###\n::::\n[x]\n", &parser());
    assert!(!parsed.record.is_complete());
    assert_eq!(
        parsed.record.scale_ratings().values().copied().collect::<Vec<_>>(),
        vec![SCALE_DEFAULT; 6]
    );
}

// ---------------------------------------------------------------------------
// Test 4: Conflict resolution
// ---------------------------------------------------------------------------
#[test]
fn matched_answer_beats_inferred_in_either_order() {
    // positional name first, labelled name later
    let record = parse_text(
        "PERSONAL INFORMATION\nJohnny\nName: John Doe\nAge: 30",
        &parser(),
    )
    .record;
    assert_eq!(record.get("identity.name"), Some(&text("John Doe")));

    // labelled inferred scale after a matched one
    let record = parse_text(
        "ASSESSMENT SCALES\nStress level: 4\nGOALS\nStress level: 9",
        &parser(),
    )
    .record;
    assert_eq!(record.get("scale.stress_level"), Some(&FieldValue::Scale(4)));
}

#[test]
fn later_matched_answer_wins() {
    let parsed = parse_text("Age: 30\nWeight: 80 kg\nAge: 31", &parser());
    assert_eq!(parsed.record.get("identity.age"), Some(&FieldValue::Integer(31)));

    let dispositions: Vec<&Disposition> = parsed
        .trace
        .candidates_for("identity.age")
        .map(|c| &c.disposition)
        .collect();
    assert_eq!(
        dispositions,
        vec![&Disposition::Superseded, &Disposition::Selected]
    );
}

// ---------------------------------------------------------------------------
// Test 5: A fuller questionnaire across two pages
// ---------------------------------------------------------------------------
#[test]
fn multi_page_questionnaire() {
    let extractor = MockExtractor {
        pages: vec![
            page(
                1,
                &[
                    "HEALTH & FITNESS INTAKE QUESTIONNAIRE",
                    "",
                    "SECTION 1: PERSONAL INFORMATION",
                    "  Full name:   Maria Lopez            Age:  42",
                    "  Gender: Female",
                    "  Email: maria.lopez@example.com",
                    "",
                    "SECTION 2: HEALTH METRICS",
                    "  Weight (kg): 68,5",
                    "  Resting heart rate - 58 bpm",
                    "  Blood pressure: 118/76",
                    "  Body fat: about a quarter",
                    "  Activity level: Moderately active",
                ],
            ),
            page(
                2,
                &[
                    "ASSESSMENT SCALES (1-10)",
                    "  Fitness level: 7/10",
                    "  Sleep quality: 6",
                    "  Motivation: 8.5",
                    "  Stress level: -",
                    "EQUIPMENT AVAILABLE",
                    "  ☑ Dumbbells   ☐ Barbells   ☑ Yoga mat",
                    "DIETARY PREFERENCES",
                    "  [x] Vegetarian",
                    "  I avoid most processed food and try to",
                    "  eat fish twice a week.",
                    "Allergies: peanuts; shellfish",
                    "ADDITIONAL NOTES",
                    "Recovering from a knee injury in 2022.",
                ],
            ),
        ],
    };

    let parsed = parse_pdf(b"%PDF", &extractor, &parser()).unwrap();
    let r = &parsed.record;

    assert_eq!(r.get("identity.name"), Some(&text("Maria Lopez")));
    assert_eq!(r.get("identity.age"), Some(&FieldValue::Integer(42)));
    assert_eq!(r.get("identity.gender"), Some(&text("Female")));
    assert_eq!(r.get("identity.email"), Some(&text("maria.lopez@example.com")));
    assert_eq!(
        r.get("metric.weight").and_then(FieldValue::as_number),
        Some(rust_decimal::Decimal::new(685, 1))
    );
    assert_eq!(r.get("metric.resting_heart_rate"), Some(&FieldValue::Integer(58)));
    assert_eq!(r.get("metric.blood_pressure"), Some(&text("118/76")));
    assert_eq!(r.get("metric.body_fat"), Some(&FieldValue::Unknown));
    assert_eq!(r.manifest.entries["metric.body_fat"].notes.len(), 1);
    assert_eq!(r.get("metric.activity_level"), Some(&text("active")));

    let expected_scales: BTreeMap<String, u8> = [
        ("scale.energy_level", SCALE_DEFAULT),
        ("scale.fitness_level", 7),
        ("scale.motivation", 9),
        ("scale.nutrition_knowledge", SCALE_DEFAULT),
        ("scale.sleep_quality", 6),
        ("scale.stress_level", SCALE_DEFAULT),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(r.scale_ratings(), expected_scales);
    assert_eq!(r.manifest.status("scale.motivation"), Some(RecoveryStatus::Inferred));
    assert_eq!(r.manifest.status("scale.stress_level"), Some(RecoveryStatus::Defaulted));

    assert_eq!(
        r.get("multiselect.equipment"),
        Some(&selection(&["Dumbbells", "Yoga mat"]))
    );
    assert_eq!(
        r.get("multiselect.dietary_restrictions"),
        Some(&selection(&["Vegetarian"]))
    );
    assert_eq!(
        r.get("text.food_preferences"),
        Some(&text("I avoid most processed food and try to eat fish twice a week."))
    );
    assert_eq!(
        r.get("multiselect.allergies"),
        Some(&selection(&["peanuts", "shellfish"]))
    );
    assert_eq!(
        r.get("text.additional_notes"),
        Some(&text("Recovering from a knee injury in 2022."))
    );

    let sleep = &r.manifest.entries["scale.sleep_quality"];
    let source = sleep.source.unwrap();
    assert_eq!((source.page_number, source.line_index), (2, 3));
    assert!(r.is_complete());
}

// ---------------------------------------------------------------------------
// Test 6: Extraction failures propagate; parse failures do not
// ---------------------------------------------------------------------------
#[test]
fn extraction_error_propagates() {
    let err = parse_pdf(&[], &FailingExtractor, &parser()).unwrap_err();
    assert!(matches!(err, IntakeError::PdftotextNotFound));
}

// ---------------------------------------------------------------------------
// Test 7: Deterministic output
// ---------------------------------------------------------------------------
#[test]
fn parsing_twice_is_identical() {
    let doc = RawDocument::from_text(
        "PERSONAL INFORMATION\nName: Ann\nAge: 41\x0cASSESSMENT SCALES\nEnergy: 11\nGOALS\n[x] Gain muscle\n",
    );
    let p = parser();
    let a = serde_json::to_string_pretty(&parse_document(&doc, &p)).unwrap();
    let b = serde_json::to_string_pretty(&parse_document(&doc, &p)).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Test 8: One parser shared by concurrent parses
// ---------------------------------------------------------------------------
#[test]
fn concurrent_parses_share_parser() {
    let p = parser();
    let inputs: Vec<String> = (20..28)
        .map(|age| format!("PERSONAL INFORMATION\nName: Client {age}\nAge: {age}"))
        .collect();

    let ages: Vec<Option<i64>> = std::thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let p = &p;
                s.spawn(move || {
                    parse_text(input, p)
                        .record
                        .get("identity.age")
                        .and_then(FieldValue::as_integer)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(ages, (20..28).map(Some).collect::<Vec<_>>());
}

// ---------------------------------------------------------------------------
// Test 9: Record JSON shape handed to downstream consumers
// ---------------------------------------------------------------------------
#[test]
fn record_serializes_with_manifest() {
    let record = parse_text("Name: Ann\nAge: 41", &parser()).record;
    let json: serde_json::Value = serde_json::to_value(&record).unwrap();

    assert_eq!(json["fields"]["identity.age"]["type"], "integer");
    assert_eq!(json["fields"]["identity.age"]["value"], 41);
    assert_eq!(json["manifest"]["entries"]["identity.age"]["status"], "recovered");
    assert_eq!(
        json["manifest"]["entries"]["scale.energy_level"]["status"],
        "defaulted"
    );
}
