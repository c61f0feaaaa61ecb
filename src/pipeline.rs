//! Ingestion pipeline orchestration.
//!
//! Coordinates the full intake flow for one upload: fingerprint → dedup
//! lookup → text extraction → classification → fraud assessment → file the
//! document into the vault → insert the draft. The flow is strictly
//! sequential; the only caller-visible failures are input errors and the
//! duplicate outcome. Extraction and classification degrade internally
//! and always produce a value.
//!
//! Duplicates are detected before any extraction work: OCR is never run on
//! content that will be rejected anyway.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;

use crate::classify::Classifier;
use crate::extract;
use crate::fingerprint::{fingerprint_bytes, fingerprint_file};
use crate::fraud;
use crate::models::{Document, DocumentDraft, RawUpload};
use crate::ocr::OcrEngine;
use crate::progress::ExtractProgressReporter;
use crate::rules::RuleSet;
use crate::store::DocumentStore;

/// Caller-visible ingestion failures. Everything else recovers locally.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no readable file at {0}")]
    FileMissing(PathBuf),

    #[error("document name is required")]
    NameRequired,

    #[error("document already exists")]
    Duplicate { existing_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// An immutable, explicitly constructed pipeline.
///
/// Holds the compiled classifier and the injected OCR engine; instances
/// with different rule sets can run side by side (there is no process-wide
/// state).
pub struct Pipeline {
    classifier: Classifier,
    engine: Box<dyn OcrEngine>,
    paginated_extensions: Vec<String>,
}

impl Pipeline {
    pub fn new(
        rules: RuleSet,
        engine: Box<dyn OcrEngine>,
        paginated_extensions: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            classifier: Classifier::new(rules)?,
            engine,
            paginated_extensions,
        })
    }

    /// Ingest one upload end to end.
    ///
    /// On success the source file has been moved under
    /// `<vault_root>/<category>/` and exactly one document row exists for
    /// its fingerprint.
    pub async fn ingest(
        &self,
        store: &dyn DocumentStore,
        upload: RawUpload,
        vault_root: &Path,
        reporter: &dyn ExtractProgressReporter,
    ) -> Result<Document, IngestError> {
        if upload.display_name.trim().is_empty() {
            return Err(IngestError::NameRequired);
        }
        if !upload.path.is_file() {
            return Err(IngestError::FileMissing(upload.path.clone()));
        }

        let fingerprint = fingerprint_file(&upload.path)?;

        if let Some(existing) = store.find_by_fingerprint(&fingerprint).await? {
            tracing::info!(%fingerprint, existing_id = %existing.id, "duplicate upload");
            return Err(IngestError::Duplicate {
                existing_id: existing.id,
            });
        }

        let extracted_text = extract::extract_text(
            &upload.path,
            &self.paginated_extensions,
            self.engine.as_ref(),
            reporter,
        );

        let classification = self
            .classifier
            .classify(&upload.original_filename, &extracted_text);
        let assessment = fraud::assess(
            &extracted_text,
            &classification.category,
            classification.confidence,
        );

        tracing::info!(
            %fingerprint,
            category = %classification.category,
            confidence = classification.confidence,
            fraud_status = %assessment.status,
            "document assessed"
        );

        let filename = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(&upload.original_filename)
        );
        let stored_path = file_into_vault(&upload.path, vault_root, &classification.category, &filename)?;

        let draft = DocumentDraft {
            fingerprint,
            filename,
            display_name: upload.display_name,
            description: upload.description,
            stored_path: stored_path.display().to_string(),
            category: classification.category,
            confidence: classification.confidence,
            fraud_status: assessment.status,
            fraud_reason: assessment.reason,
            extracted_text,
            uploader: upload.uploader,
        };

        Ok(store.insert(draft).await?)
    }
}

/// Check whether content has been ingested before: re-hash and look up.
/// `Some` means the bytes match a stored document exactly.
pub async fn verify(store: &dyn DocumentStore, bytes: &[u8]) -> Result<Option<Document>> {
    store.find_by_fingerprint(&fingerprint_bytes(bytes)).await
}

/// Move an accepted upload into `<vault>/<category>/<filename>`.
fn file_into_vault(
    source: &Path,
    vault_root: &Path,
    category: &str,
    filename: &str,
) -> Result<PathBuf> {
    let dir = vault_root.join(category);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create vault directory: {}", dir.display()))?;

    let dest = dir.join(filename);
    if std::fs::rename(source, &dest).is_err() {
        // Rename fails across filesystems; fall back to copy + remove.
        std::fs::copy(source, &dest)
            .with_context(|| format!("Failed to store file at {}", dest.display()))?;
        std::fs::remove_file(source)
            .with_context(|| format!("Failed to remove source file {}", source.display()))?;
    }
    Ok(dest)
}

/// Collapse whitespace runs to single dashes.
fn sanitize_filename(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}
