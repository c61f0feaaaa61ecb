//! Core data models used throughout veridoc.
//!
//! These types represent the uploads, classification results, fraud
//! assessments, and stored documents that flow through the ingestion
//! pipeline.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A single upload handed to the pipeline. Lives for one ingestion call.
#[derive(Debug, Clone)]
pub struct RawUpload {
    /// Path to the readable file on disk (transport is out of scope).
    pub path: PathBuf,
    /// The filename the uploader gave the file, used for classification.
    pub original_filename: String,
    /// Human-facing document name (required).
    pub display_name: String,
    pub description: Option<String>,
    /// Free-form uploader label; authentication lives outside this crate.
    pub uploader: String,
}

/// Category plus a heuristic certainty score in [0, 1].
///
/// Not a calibrated probability: the two rule stages pin fixed values
/// (0.8 filename, 0.6 text) and the statistical stage maps its raw score
/// onto the unit interval linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: String,
    pub confidence: f64,
}

/// Category label reserved for documents no stage could place.
pub const UNCLASSIFIED: &str = "unclassified";

/// Trust label assigned at ingestion and possibly overridden by a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudStatus {
    /// Awaiting review. Never produced by the pipeline itself; reviewers
    /// may reset a document to this state.
    Pending,
    Verified,
    Suspicious,
    Rejected,
}

impl FraudStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Pending => "pending",
            FraudStatus::Verified => "verified",
            FraudStatus::Suspicious => "suspicious",
            FraudStatus::Rejected => "rejected",
        }
    }

    /// All labels accepted by the reviewer override path.
    pub fn all() -> &'static [&'static str] {
        &["pending", "verified", "suspicious", "rejected"]
    }
}

impl FromStr for FraudStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FraudStatus::Pending),
            "verified" => Ok(FraudStatus::Verified),
            "suspicious" => Ok(FraudStatus::Suspicious),
            "rejected" => Ok(FraudStatus::Rejected),
            other => Err(format!(
                "invalid fraud status '{}'. Allowed: {}",
                other,
                FraudStatus::all().join(", ")
            )),
        }
    }
}

impl fmt::Display for FraudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the heuristic fraud checks. `reason` is present exactly when
/// the status is not `Verified`.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudAssessment {
    pub status: FraudStatus,
    pub reason: Option<String>,
}

/// Everything the pipeline computes for a document, handed to the store in
/// one piece. The {category, confidence, fraud_status, fraud_reason} tuple
/// is computed together before any persistence happens.
#[derive(Debug, Clone)]
pub struct DocumentDraft {
    pub fingerprint: String,
    /// Final on-disk filename inside the vault.
    pub filename: String,
    pub display_name: String,
    pub description: Option<String>,
    pub stored_path: String,
    pub category: String,
    pub confidence: f64,
    pub fraud_status: FraudStatus,
    pub fraud_reason: Option<String>,
    pub extracted_text: String,
    pub uploader: String,
}

/// A persisted document row.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fingerprint: String,
    pub filename: String,
    pub display_name: String,
    pub description: Option<String>,
    pub stored_path: String,
    pub category: String,
    pub confidence: f64,
    pub fraud_status: FraudStatus,
    pub fraud_reason: Option<String>,
    pub extracted_text: String,
    pub uploader: String,
    pub created_at: i64,
    pub verified_by: Option<String>,
    pub verified_at: Option<i64>,
}

/// One audit trail entry (uploads and reviewer actions).
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: i64,
    pub kind: String,
    pub document_id: String,
    pub detail: String,
    pub created_at: i64,
}
