//! Category rule tables consumed by the classifier.
//!
//! Categories and their trigger words are data, not code: the classifier
//! walks an ordered [`RuleSet`] and never branches on a specific label.
//! Adding a category means adding a `[[rule]]` entry to a TOML rule file
//! (or extending the builtin table), not touching classification logic.
//!
//! Rule order matters twice: the two rule stages return the first matching
//! category, and the statistical stage breaks score ties in favor of the
//! earlier entry. The builtin table is ordered most-specific first.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One category's trigger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    /// Category label, e.g. `"invoice"`.
    pub category: String,
    /// Words matched (case-insensitively) against the filename stem.
    #[serde(default)]
    pub filename_keywords: Vec<String>,
    /// Longer indicator phrases matched as substrings of the extracted text.
    #[serde(default)]
    pub text_phrases: Vec<String>,
    /// Single-word terms scored by the statistical stage.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Multi-word phrases scored by the statistical stage.
    #[serde(default)]
    pub key_phrases: Vec<String>,
}

/// An ordered, validated collection of category rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(rename = "rule")]
    rules: Vec<CategoryRule>,
}

impl RuleSet {
    /// Build a rule set from an ordered list of rules.
    ///
    /// Rejects empty tables, empty/`unclassified` labels, and duplicate
    /// categories. The reserved fallback label belongs to the classifier,
    /// not the table.
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self> {
        if rules.is_empty() {
            bail!("rule table must contain at least one category");
        }
        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            if rule.category.trim().is_empty() {
                bail!("rule table contains a rule with an empty category label");
            }
            if rule.category == crate::models::UNCLASSIFIED {
                bail!(
                    "category label '{}' is reserved for the fallback result",
                    crate::models::UNCLASSIFIED
                );
            }
            if !seen.insert(rule.category.clone()) {
                bail!("duplicate category in rule table: '{}'", rule.category);
            }
        }
        Ok(Self { rules })
    }

    /// Parse a TOML rule file (`[[rule]]` entries, order preserved).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RulesFile =
            toml::from_str(content).with_context(|| "Failed to parse rule table")?;
        Self::new(file.rules)
    }

    /// Load a rule table from disk.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// The configured rule table: a TOML file when one is set, otherwise
    /// the builtin categories.
    pub fn load(rules_path: Option<&Path>) -> Result<Self> {
        match rules_path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Rules in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if `label` names a category in this table.
    pub fn contains(&self, label: &str) -> bool {
        self.rules.iter().any(|r| r.category == label)
    }

    /// The default rule table shipped with veridoc.
    pub fn builtin() -> Self {
        let rules = vec![
            rule(
                "question-paper",
                &["question", "exam", "paper"],
                &["question paper", "answer all questions", "maximum marks"],
                &["question", "exam", "marks", "answer", "paper", "section", "attempt"],
                &["question paper", "maximum marks", "answer all questions", "time allowed"],
            ),
            rule(
                "admit-card",
                &["admit", "hallticket", "hall-ticket"],
                &["admit card", "hall ticket", "examination centre"],
                &["admit", "hall", "ticket", "roll", "candidate", "centre", "examination"],
                &["admit card", "hall ticket", "roll number", "examination centre"],
            ),
            rule(
                "score-card",
                &["score", "result", "marksheet", "grade"],
                &["statement of marks", "marks obtained", "grade sheet"],
                &["score", "result", "marks", "grade", "percentage", "subject", "obtained"],
                &["statement of marks", "marks obtained", "grade sheet", "total marks"],
            ),
            rule(
                "certificate",
                &["certificate", "certification", "diploma"],
                &["this is to certify", "certificate of completion"],
                &["certificate", "certify", "awarded", "completion", "achievement", "conferred"],
                &["this is to certify", "certificate of completion", "has successfully completed"],
            ),
            rule(
                "id-card",
                &["idcard", "id-card", "identity", "aadhaar", "aadhar", "passport", "licence", "license"],
                &["identity card", "unique identification", "date of birth"],
                &["identity", "aadhaar", "passport", "nationality", "birth", "gender", "issued"],
                &["identity card", "date of birth", "unique identification", "government of india"],
            ),
            rule(
                "invoice",
                &["invoice", "bill", "receipt"],
                &["invoice number", "amount due", "total amount payable"],
                &["invoice", "bill", "amount", "total", "payment", "quantity", "price", "tax", "gst"],
                &["invoice number", "amount due", "total amount", "payment terms", "bill to"],
            ),
            rule(
                "bank-statement",
                &["statement", "passbook", "bank"],
                &["account statement", "opening balance", "closing balance"],
                &["account", "balance", "deposit", "withdrawal", "debit", "credit", "branch", "ifsc"],
                &["account statement", "opening balance", "closing balance", "account number"],
            ),
            rule(
                "salary-slip",
                &["salary", "payslip", "pay-slip", "payroll"],
                &["salary slip", "net pay", "gross salary"],
                &["salary", "payslip", "earnings", "deductions", "allowance", "basic", "gross"],
                &["salary slip", "net pay", "gross salary", "provident fund"],
            ),
            rule(
                "medical-record",
                &["medical", "prescription", "diagnosis", "lab-report"],
                &["medical record", "clinical findings", "prescribed medication"],
                &["patient", "diagnosis", "medical", "doctor", "hospital", "prescription", "dosage"],
                &["medical record", "patient name", "clinical findings", "prescribed medication"],
            ),
            rule(
                "contract-agreement",
                &["contract", "agreement", "mou"],
                &["terms and conditions", "hereinafter referred to as"],
                &["contract", "agreement", "party", "parties", "clause", "witness", "hereby"],
                &["terms and conditions", "hereinafter referred to as", "in witness whereof", "this agreement"],
            ),
            rule(
                "notification",
                &["notification"],
                &["it is hereby notified", "official notification"],
                &["notification", "notified", "issued", "hereby", "official"],
                &["it is hereby notified", "official notification"],
            ),
            rule(
                "notice",
                &["notice"],
                &["notice is hereby given", "public notice"],
                &["notice", "attention", "informed", "concerned", "premises"],
                &["notice is hereby given", "public notice", "all concerned"],
            ),
            rule(
                "report",
                &["report"],
                &["executive summary", "annual report"],
                &["report", "summary", "analysis", "findings", "conclusion", "overview"],
                &["annual report", "project report", "executive summary"],
            ),
        ];
        // The builtin table is statically valid.
        Self { rules }
    }
}

fn rule(
    category: &str,
    filename_keywords: &[&str],
    text_phrases: &[&str],
    keywords: &[&str],
    key_phrases: &[&str],
) -> CategoryRule {
    let own = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
    CategoryRule {
        category: category.to_string(),
        filename_keywords: own(filename_keywords),
        text_phrases: own(text_phrases),
        keywords: own(keywords),
        key_phrases: own(key_phrases),
    }
}
