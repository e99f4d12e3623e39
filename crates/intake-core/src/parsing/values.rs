use crate::error::IntakeError;
use crate::model::{SCALE_MAX, SCALE_MIN};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;

/// A number optionally followed by a unit: "82", "82.5 kg", "24,5", "22%", "62 bpm".
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?\d+(?:[.,]\d+)?)(?:\s*[\p{L}%][\p{L}%./ ]*)?$").unwrap()
});

/// A leading rating: "7", "7/10", "7 / 10", "7 out of 10", "7.5 - fairly good".
static RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([+-]?\d+(?:[.,]\d+)?)\s*(?:(?:/|out\s+of|of)\s*10\b)?").unwrap()
});

/// A rating and nothing else, used where no delimiter separates it from the label.
static BARE_RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[+-]?\d+(?:[.,]\d+)?\s*(?:(?:/|out\s+of)\s*10)?$").unwrap()
});

const PLACEHOLDERS: &[&str] = &["", "-", "--", "—", "–", "*", "?", "n/a", "na", "n.a.", "n.a"];

const NONE_ANSWERS: &[&str] = &["none", "nothing", "no", "nil"];

/// True if the answer is a placeholder meaning "not answered".
pub fn is_placeholder(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    PLACEHOLDERS.contains(&s.as_str())
}

/// True if a list answer explicitly says nothing applies ("None", "no").
pub fn is_none_answer(s: &str) -> bool {
    let s = s.trim().trim_end_matches('.').to_lowercase();
    NONE_ANSWERS.contains(&s.as_str())
}

/// Parse a decimal answer, tolerating a trailing unit and decimal comma.
///
/// Handles formats like:
/// - "82" -> 82
/// - "82.5 kg" -> 82.5
/// - "24,5" -> 24.5
/// - "22%" -> 22
/// - "-" or "n/a" -> None
pub fn parse_decimal(s: &str) -> Result<Option<Decimal>, IntakeError> {
    let s = s.trim();
    if is_placeholder(s) {
        return Ok(None);
    }

    let caps = NUMBER_RE
        .captures(s)
        .ok_or_else(|| IntakeError::invalid(s, "a number"))?;
    let number = caps[1].replace(',', ".");
    Decimal::from_str(&number)
        .map(Some)
        .map_err(|_| IntakeError::invalid(s, "a number"))
}

/// Parse a whole-number answer. Fractional input is rejected.
pub fn parse_integer(s: &str) -> Result<Option<i64>, IntakeError> {
    let Some(d) = parse_decimal(s)? else {
        return Ok(None);
    };
    if !d.fract().is_zero() {
        return Err(IntakeError::invalid(s.trim(), "a whole number"));
    }
    d.to_i64()
        .map(Some)
        .ok_or_else(|| IntakeError::invalid(s.trim(), "a whole number"))
}

/// A 1-10 rating after rounding and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating {
    pub value: u8,
    /// The number as written, when it had to be rounded or clamped.
    pub adjusted_from: Option<Decimal>,
}

impl Rating {
    pub fn is_exact(&self) -> bool {
        self.adjusted_from.is_none()
    }

    /// Manifest note describing the adjustment, if there was one.
    pub fn note(&self) -> Option<String> {
        let raw = self.adjusted_from?;
        let in_range = raw >= Decimal::from(SCALE_MIN) && raw <= Decimal::from(SCALE_MAX);
        Some(if in_range {
            format!("rounded from {}", raw.normalize())
        } else {
            format!("clamped from {}", raw.normalize())
        })
    }
}

/// Parse a rating answer onto the 1-10 axis.
///
/// Fractions round half away from zero, then out-of-range values clamp to the
/// nearest bound. Text after the number ("7 - fairly good") is ignored.
pub fn parse_rating(s: &str) -> Result<Option<Rating>, IntakeError> {
    let s = s.trim();
    if is_placeholder(s) {
        return Ok(None);
    }

    let caps = RATING_RE
        .captures(s)
        .ok_or_else(|| IntakeError::invalid(s, "a rating from 1 to 10"))?;
    let raw = Decimal::from_str(&caps[1].replace(',', "."))
        .map_err(|_| IntakeError::invalid(s, "a rating from 1 to 10"))?;

    let rounded = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let clamped = rounded.clamp(Decimal::from(SCALE_MIN), Decimal::from(SCALE_MAX));
    let value = clamped
        .to_u8()
        .ok_or_else(|| IntakeError::invalid(s, "a rating from 1 to 10"))?;

    let adjusted_from = (raw != clamped).then_some(raw);
    Ok(Some(Rating {
        value,
        adjusted_from,
    }))
}

/// True if the text is a number (with optional unit) and nothing else.
pub fn looks_numeric(s: &str) -> bool {
    NUMBER_RE.is_match(s.trim())
}

/// True if the text is a rating ("7", "7/10", "7 out of 10") and nothing else.
pub fn looks_like_rating(s: &str) -> bool {
    BARE_RATING_RE.is_match(s.trim())
}

/// Split a list answer on commas and semicolons, dropping empty items.
pub fn split_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|item| item.trim().trim_end_matches('.').trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}
