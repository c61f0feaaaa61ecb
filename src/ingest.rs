//! The `vdoc ingest` command.
//!
//! Wires the configured rule table, OCR engine, and store into a
//! [`Pipeline`](crate::pipeline::Pipeline), runs one upload through it,
//! and prints the outcome.

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::models::RawUpload;
use crate::ocr::ExternalOcrEngine;
use crate::pipeline::{IngestError, Pipeline};
use crate::progress::ProgressMode;
use crate::rules::RuleSet;
use crate::store::SqliteStore;

pub async fn run_ingest(
    config: &Config,
    file: &Path,
    name: &str,
    description: Option<String>,
    uploader: &str,
    progress: ProgressMode,
) -> Result<()> {
    let rules = RuleSet::load(config.classifier.rules_path.as_deref())?;
    let engine = ExternalOcrEngine::from_config(&config.ocr);
    let pipeline = Pipeline::new(
        rules,
        Box::new(engine),
        config.ocr.paginated_extensions.clone(),
    )?;

    let store = SqliteStore::open(config).await?;
    let reporter = progress.reporter();

    let original_filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let upload = RawUpload {
        path: file.to_path_buf(),
        original_filename,
        display_name: name.to_string(),
        description,
        uploader: uploader.to_string(),
    };

    let result = pipeline
        .ingest(&store, upload, &config.storage.root, reporter.as_ref())
        .await;

    match result {
        Ok(doc) => {
            store
                .record_activity(
                    "upload",
                    &doc.id,
                    &format!("Uploaded and classified as {}", doc.category),
                )
                .await?;

            println!("ingest {}", doc.filename);
            println!("  fingerprint: {}", doc.fingerprint);
            println!("  category:    {} (confidence {:.2})", doc.category, doc.confidence);
            match &doc.fraud_reason {
                Some(reason) => println!("  fraud:       {} — {}", doc.fraud_status, reason),
                None => println!("  fraud:       {}", doc.fraud_status),
            }
            println!("  stored at:   {}", doc.stored_path);
            println!("  id:          {}", doc.id);
            println!("ok");

            store.close().await;
            Ok(())
        }
        Err(IngestError::Duplicate { existing_id }) => {
            store.close().await;
            bail!("Document already exists (id: {})", existing_id);
        }
        Err(err) => {
            store.close().await;
            Err(err.into())
        }
    }
}
