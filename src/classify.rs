//! Three-stage document classifier.
//!
//! Stages run strictly in order, first match wins:
//!
//! 1. **Filename rules**: case-insensitive keyword alternations against the
//!    filename stem (no path, no extension). Confidence pinned to 0.8.
//! 2. **Text rules**: case-insensitive literal phrase lookup in the full
//!    extracted text. Confidence pinned to 0.6.
//! 3. **Statistical**: a single-document term-frequency score over the
//!    category keyword/key-phrase table. With one document the inverse
//!    document frequency degenerates to a constant, so this is a weighted
//!    term-frequency ranking, not corpus TF-IDF. Downstream fraud
//!    thresholds are tuned against this exact arithmetic; do not "fix" it
//!    into true multi-document TF-IDF.
//!
//! Ties in stage 3 break toward the earlier rule-table entry: the scan
//! keeps the first category on strict greater-than, and the table's
//! declared order is the documented total order.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use regex::Regex;

use crate::models::{Classification, UNCLASSIFIED};
use crate::rules::RuleSet;

/// Confidence assigned by a filename-rule match.
pub const FILENAME_MATCH_CONFIDENCE: f64 = 0.8;
/// Confidence assigned by a text-rule match.
pub const TEXT_MATCH_CONFIDENCE: f64 = 0.6;

/// Statistical-stage score below which a document stays unclassified.
const SCORE_THRESHOLD: f64 = 5.0;
/// Linear normalization divisor mapping raw scores onto [0, 1].
const SCORE_SCALE: f64 = 50.0;
/// Flat bonus for a keyword appearing at all among filtered tokens.
const KEYWORD_PRESENCE_BONUS: f64 = 3.0;
/// Bonus for a key phrase occurring as a literal substring.
const PHRASE_SUBSTRING_BONUS: f64 = 10.0;
/// Per-token bonus for phrase tokens independently present in the text.
const PHRASE_TOKEN_BONUS: f64 = 2.0;
/// Tokens this short carry no signal and are discarded.
const MIN_TOKEN_LEN: usize = 3;
/// Phrase tokens must be longer than this to earn the per-token bonus.
const MIN_PHRASE_TOKEN_LEN: usize = 4;

/// An immutable classifier built once from a rule table.
///
/// Construction compiles the filename alternations; instances are cheap to
/// share and safe to use from parallel tests with different rule sets.
pub struct Classifier {
    rules: RuleSet,
    filename_patterns: Vec<Option<Regex>>,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Result<Self> {
        let mut filename_patterns = Vec::with_capacity(rules.len());
        for rule in rules.iter() {
            if rule.filename_keywords.is_empty() {
                filename_patterns.push(None);
                continue;
            }
            let alternation = rule
                .filename_keywords
                .iter()
                .map(|kw| regex::escape(kw))
                .collect::<Vec<_>>()
                .join("|");
            filename_patterns.push(Some(Regex::new(&format!("(?i){}", alternation))?));
        }
        Ok(Self {
            rules,
            filename_patterns,
        })
    }

    /// The rule table this classifier was built from.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Assign a category and confidence to a document.
    ///
    /// Never fails: the worst case is `{unclassified, 0.0}`. The OCR
    /// failure sentinel flows through like any other text and typically
    /// lands there.
    pub fn classify(&self, filename: &str, extracted_text: &str) -> Classification {
        let stem = filename_stem(filename);

        // Stage 1: filename rules.
        for (rule, pattern) in self.rules.iter().zip(&self.filename_patterns) {
            if let Some(re) = pattern {
                if re.is_match(stem) {
                    tracing::debug!(category = %rule.category, "filename rule matched");
                    return Classification {
                        category: rule.category.clone(),
                        confidence: FILENAME_MATCH_CONFIDENCE,
                    };
                }
            }
        }

        // Stage 2: text rules.
        let lower = extracted_text.to_lowercase();
        for rule in self.rules.iter() {
            if rule
                .text_phrases
                .iter()
                .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
            {
                tracing::debug!(category = %rule.category, "text rule matched");
                return Classification {
                    category: rule.category.clone(),
                    confidence: TEXT_MATCH_CONFIDENCE,
                };
            }
        }

        // Stage 3: statistical fallback.
        self.classify_statistical(&lower)
    }

    fn classify_statistical(&self, lower: &str) -> Classification {
        let term_freq = term_frequencies(lower);

        let mut best: Option<(&str, f64)> = None;
        for rule in self.rules.iter() {
            let mut score = 0.0;

            for keyword in &rule.keywords {
                let key = keyword.to_lowercase();
                if let Some(count) = term_freq.get(key.as_str()) {
                    score += count + KEYWORD_PRESENCE_BONUS;
                }
            }

            for phrase in &rule.key_phrases {
                let p = phrase.to_lowercase();
                if !p.is_empty() && lower.contains(&p) {
                    score += PHRASE_SUBSTRING_BONUS;
                }
                // Phrase tokens count independently of the substring hit,
                // but only when more than one of them shows up.
                let matched = p
                    .split(|c: char| !c.is_alphabetic())
                    .filter(|t| t.len() >= MIN_PHRASE_TOKEN_LEN)
                    .filter(|t| term_freq.contains_key(t))
                    .count();
                if matched > 1 {
                    score += PHRASE_TOKEN_BONUS * matched as f64;
                }
            }

            // Strict greater-than keeps the earlier entry on ties.
            if best.map_or(score > 0.0, |(_, top)| score > top) {
                best = Some((rule.category.as_str(), score));
            }
        }

        match best {
            Some((category, score)) if score >= SCORE_THRESHOLD => {
                let confidence = (score / SCORE_SCALE).min(1.0);
                tracing::debug!(category, score, confidence, "statistical match");
                Classification {
                    category: category.to_string(),
                    confidence,
                }
            }
            _ => Classification {
                category: UNCLASSIFIED.to_string(),
                confidence: 0.0,
            },
        }
    }
}

/// Filename stem: no directories, no extension.
fn filename_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// Raw occurrence counts of alphabetic tokens longer than two characters.
fn term_frequencies(lower: &str) -> HashMap<&str, f64> {
    let mut freq: HashMap<&str, f64> = HashMap::new();
    for token in lower.split(|c: char| !c.is_alphabetic()) {
        if token.len() >= MIN_TOKEN_LEN {
            *freq.entry(token).or_insert(0.0) += 1.0;
        }
    }
    freq
}
