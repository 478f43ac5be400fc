//! Turns raw generator output into an ordered list of [`RecommendationRecord`]s.
//!
//! Two formats are understood: a (usually fenced) JSON array in the fixed
//! schema, and the older labeled-prose format (`**Field:** value` lines in
//! blank-line separated blocks). The format is detected once and dispatched
//! through [`GenerationPayload`].

mod json;
mod labeled;

pub use self::json::{extract_fenced_block, fenced_block, repair_json, FencedBlock};
pub use self::labeled::{
    clean_generated_text, extract_place_names, parse_labeled_blocks, parse_labeled_line,
};

use crate::model::{RecommendationRecord, NOT_AVAILABLE, UNKNOWN};
use log::debug;

const DEFAULT_EXCHANGE_RATE: f64 = 0.00073;

/// Generator output tagged by the format it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPayload<'a> {
    /// JSON body, already lifted out of any code fence
    Json(&'a str),
    /// Labeled prose, lifted out of a non-JSON fence when there is one
    Labeled(&'a str),
}

impl<'a> GenerationPayload<'a> {
    pub fn detect(raw: &'a str) -> Self {
        if let Some(block) = fenced_block(raw) {
            return if block.is_json() {
                GenerationPayload::Json(block.body)
            } else {
                GenerationPayload::Labeled(block.body)
            };
        }

        let trimmed = raw.trim();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            GenerationPayload::Json(trimmed)
        } else {
            GenerationPayload::Labeled(raw)
        }
    }
}

/// Normalizes generator output into fixed-schema records.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    exchange_rate: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_EXCHANGE_RATE)
    }
}

impl Normalizer {
    /// `exchange_rate` converts KRW to USD when the model omits the USD cost.
    pub fn new(exchange_rate: f64) -> Self {
        Self { exchange_rate }
    }

    /// Never fails: unusable input yields an empty list.
    pub fn normalize(&self, raw: &str) -> Vec<RecommendationRecord> {
        if raw.trim().is_empty() {
            debug!("Empty generator output, nothing to normalize");
            return Vec::new();
        }

        let records = match GenerationPayload::detect(raw) {
            GenerationPayload::Json(body) => json::records_from_json(body, self.exchange_rate),
            GenerationPayload::Labeled(text) => parse_labeled_blocks(text)
                .into_iter()
                .enumerate()
                .map(|(index, block)| labeled::record_from_block(block, index, self.exchange_rate))
                .collect(),
        };

        debug!("Normalized {} recommendation(s)", records.len());
        records
    }
}

/// Normalize with the default KRW -> USD rate.
pub fn normalize(raw: &str) -> Vec<RecommendationRecord> {
    Normalizer::default().normalize(raw)
}

/// Prefix a scheme onto websites that lack one; sentinels pass through.
pub fn normalize_website(website: &str) -> String {
    let website = website.trim();
    if website.is_empty()
        || website.eq_ignore_ascii_case(NOT_AVAILABLE)
        || website.eq_ignore_ascii_case(UNKNOWN)
    {
        return NOT_AVAILABLE.to_string();
    }

    if has_scheme(website) {
        website.to_string()
    } else {
        format!("https://{}", website)
    }
}

/// `scheme://` where the scheme is a letter followed by letters, digits, `+`, `-` or `.`
fn has_scheme(website: &str) -> bool {
    let Some((scheme, _)) = website.split_once("://") else {
        return false;
    };
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// First number in free text, e.g. `15000` from `"₩15,000 per person"`.
pub(crate) fn parse_amount(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut digits = String::new();
    // A sign directly before the number is kept so callers can clamp it
    if text[..start].ends_with('-') {
        digits.push('-');
    }
    let mut seen_dot = false;
    let mut chars = text[start..].chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '0'..='9' => digits.push(c),
            ',' if chars.peek().is_some_and(|n| n.is_ascii_digit()) => {}
            '.' if !seen_dot && chars.peek().is_some_and(|n| n.is_ascii_digit()) => {
                seen_dot = true;
                digits.push(c);
            }
            _ => break,
        }
    }

    digits.parse().ok()
}

/// Local cost clamped to zero, reference cost derived when not supplied.
pub(crate) fn costs(local: Option<f64>, reference: Option<f64>, exchange_rate: f64) -> (f64, f64) {
    let local = local.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0);
    let reference = match reference.filter(|v| v.is_finite()) {
        Some(value) => value.max(0.0),
        None => round_cents(local * exchange_rate),
    };
    (local, reference)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
