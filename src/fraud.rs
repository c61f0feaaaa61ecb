//! Heuristic fraud-risk assessment.
//!
//! A deliberately simple, auditable rule chain, not a model. Rules are
//! evaluated top to bottom and exactly one fires; order is load-bearing
//! (a short id-card scan is rejected by the length rule before the ID
//! pattern rule ever runs).

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{FraudAssessment, FraudStatus};

/// Extracted text shorter than this (in characters) is rejected outright.
const MIN_LEGITIMATE_LEN: usize = 100;
/// Classifier confidence below this (strict) marks a document suspicious.
const MIN_CONFIDENCE: f64 = 0.4;

pub const REASON_TOO_SHORT: &str = "Text too short to be legitimate";
pub const REASON_FAKE_PHRASES: &str = "Contains known fake phrases";
pub const REASON_MISSING_ID: &str = "Missing valid ID pattern";
pub const REASON_LOW_CONFIDENCE: &str = "Low classification confidence";

/// Substrings that identify obviously fake content.
const FAKE_PHRASES: &[&str] = &["dummy", "test document"];

fn id_digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{12}").expect("static pattern"))
}

/// Assess a classified document's trust status.
///
/// Never fails and always returns exactly one status; `reason` is set
/// whenever the status is not [`FraudStatus::Verified`].
pub fn assess(extracted_text: &str, category: &str, confidence: f64) -> FraudAssessment {
    let lower = extracted_text.to_lowercase();

    // 1. Very short OCR text.
    if extracted_text.chars().count() < MIN_LEGITIMATE_LEN {
        return flagged(FraudStatus::Rejected, REASON_TOO_SHORT);
    }

    // 2. Obvious fake content.
    if FAKE_PHRASES.iter().any(|p| lower.contains(p)) {
        return flagged(FraudStatus::Rejected, REASON_FAKE_PHRASES);
    }

    // 3. Required patterns for specific types.
    if category == "id-card" && !id_digit_run().is_match(&lower) {
        return flagged(FraudStatus::Suspicious, REASON_MISSING_ID);
    }

    // 4. Low classification confidence.
    if confidence < MIN_CONFIDENCE {
        return flagged(FraudStatus::Suspicious, REASON_LOW_CONFIDENCE);
    }

    FraudAssessment {
        status: FraudStatus::Verified,
        reason: None,
    }
}

fn flagged(status: FraudStatus, reason: &str) -> FraudAssessment {
    FraudAssessment {
        status,
        reason: Some(reason.to_string()),
    }
}
