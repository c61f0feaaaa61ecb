//! End-to-end pipeline tests against a real SQLite store.
//!
//! The OCR engine is a deterministic fake (per the injection seam in
//! `veridoc::ocr`); everything else (hashing, classification, fraud
//! checks, vault filing, persistence) is the production code path.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use veridoc::config::{ClassifierConfig, Config, DbConfig, OcrConfig, StorageConfig};
use veridoc::db;
use veridoc::migrate;
use veridoc::models::{FraudStatus, RawUpload};
use veridoc::ocr::OcrEngine;
use veridoc::pipeline::{self, IngestError, Pipeline};
use veridoc::progress::NoProgress;
use veridoc::rules::RuleSet;
use veridoc::store::{DocumentStore, SqliteStore};

/// Deterministic OCR fake with a recognition counter.
#[derive(Clone)]
struct FixedOcr {
    text: String,
    calls: Arc<AtomicUsize>,
}

impl FixedOcr {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl OcrEngine for FixedOcr {
    fn rasterize_page(&self, _source: &Path, out_dir: &Path, out_prefix: &str) -> Result<()> {
        std::fs::write(out_dir.join(format!("{}-1.png", out_prefix)), b"png")?;
        Ok(())
    }

    fn recognize_text(&self, _path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

struct Env {
    _tmp: TempDir,
    config: Config,
    uploads: PathBuf,
}

fn setup_env() -> Env {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let uploads = root.join("uploads");
    std::fs::create_dir_all(&uploads).unwrap();

    let config = Config {
        db: DbConfig {
            path: root.join("data").join("veridoc.sqlite"),
        },
        storage: StorageConfig {
            root: root.join("vault"),
        },
        ocr: OcrConfig::default(),
        classifier: ClassifierConfig::default(),
    };

    Env {
        _tmp: tmp,
        config,
        uploads,
    }
}

async fn open_store(config: &Config) -> SqliteStore {
    let pool = db::connect(config).await.unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    SqliteStore::new(pool)
}

fn pipeline_with(engine: &FixedOcr) -> Pipeline {
    Pipeline::new(
        RuleSet::builtin(),
        Box::new(engine.clone()),
        vec!["pdf".to_string()],
    )
    .unwrap()
}

fn upload(dir: &Path, filename: &str, bytes: &[u8], name: &str) -> RawUpload {
    let path = dir.join(filename);
    std::fs::write(&path, bytes).unwrap();
    RawUpload {
        path,
        original_filename: filename.to_string(),
        display_name: name.to_string(),
        description: None,
        uploader: "local".to_string(),
    }
}

const INVOICE_TEXT: &str = "Invoice number 2024-0117 issued to the account holder for \
    consulting services rendered during the month of March, total amount payable within \
    thirty days of the date of receipt.";

#[tokio::test]
async fn end_to_end_invoice_scenario() {
    let env = setup_env();
    let store = open_store(&env.config).await;
    let engine = FixedOcr::new(INVOICE_TEXT);
    let pipeline = pipeline_with(&engine);

    let up = upload(
        &env.uploads,
        "invoice_march.pdf",
        b"%PDF-1.4 invoice bytes",
        "March invoice",
    );
    let doc = pipeline
        .ingest(&store, up, &env.config.storage.root, &NoProgress)
        .await
        .unwrap();

    // The draft fields computed by the pipeline, verbatim.
    assert_eq!(doc.category, "invoice");
    assert_eq!(doc.confidence, 0.8);
    assert_eq!(doc.fraud_status, FraudStatus::Verified);
    assert_eq!(doc.fraud_reason, None);
    assert_eq!(doc.display_name, "March invoice");
    assert_eq!(doc.extracted_text, INVOICE_TEXT);

    // Filed under the category directory inside the vault.
    let stored = PathBuf::from(&doc.stored_path);
    assert!(stored.exists());
    assert!(stored.starts_with(env.config.storage.root.join("invoice")));

    // The stored row round-trips through the fingerprint index.
    let found = store
        .find_by_fingerprint(&doc.fingerprint)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, doc.id);

    // And through content verification.
    let verified = pipeline::verify(&store, b"%PDF-1.4 invoice bytes")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(verified.id, doc.id);

    store.close().await;
}

#[tokio::test]
async fn duplicate_content_is_rejected_without_rerunning_ocr() {
    let env = setup_env();
    let store = open_store(&env.config).await;
    let engine = FixedOcr::new(INVOICE_TEXT);
    let pipeline = pipeline_with(&engine);

    let first = upload(&env.uploads, "invoice_march.pdf", b"same bytes", "First");
    pipeline
        .ingest(&store, first, &env.config.storage.root, &NoProgress)
        .await
        .unwrap();
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

    // Same bytes under a different name: duplicate, and the extractor
    // never runs a second time.
    let second = upload(&env.uploads, "totally_new_name.pdf", b"same bytes", "Second");
    let err = pipeline
        .ingest(&store, second, &env.config.storage.root, &NoProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Duplicate { .. }));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

    let all = store.list(None, None).await.unwrap();
    assert_eq!(all.len(), 1, "exactly one record per fingerprint");

    store.close().await;
}

#[tokio::test]
async fn short_id_card_text_is_rejected_not_suspicious() {
    let env = setup_env();
    let store = open_store(&env.config).await;
    // Under 100 chars: rule 1 fires before the id-card pattern rule.
    let engine = FixedOcr::new("identity card 1234");
    let pipeline = pipeline_with(&engine);

    let up = upload(&env.uploads, "identity_card.pdf", b"id bytes", "My ID");
    let doc = pipeline
        .ingest(&store, up, &env.config.storage.root, &NoProgress)
        .await
        .unwrap();

    assert_eq!(doc.category, "id-card");
    assert_eq!(doc.fraud_status, FraudStatus::Rejected);
    assert_eq!(
        doc.fraud_reason.as_deref(),
        Some("Text too short to be legitimate")
    );

    store.close().await;
}

#[tokio::test]
async fn reviewer_override_updates_status_and_activity() {
    let env = setup_env();
    let store = open_store(&env.config).await;
    let engine = FixedOcr::new(INVOICE_TEXT);
    let pipeline = pipeline_with(&engine);

    let up = upload(&env.uploads, "invoice_march.pdf", b"bytes", "Invoice");
    let doc = pipeline
        .ingest(&store, up, &env.config.storage.root, &NoProgress)
        .await
        .unwrap();
    assert_eq!(doc.fraud_status, FraudStatus::Verified);

    let updated = store
        .update_fraud_status(&doc.id, FraudStatus::Rejected, Some("forged stamp"), "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.fraud_status, FraudStatus::Rejected);
    assert_eq!(updated.fraud_reason.as_deref(), Some("forged stamp"));
    assert_eq!(updated.verified_by.as_deref(), Some("alice"));

    store
        .record_activity("verification", &doc.id, "forged stamp")
        .await
        .unwrap();
    let recent = store.recent_activity(5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].kind, "verification");

    store.close().await;
}

#[tokio::test]
async fn failed_extraction_still_produces_a_stored_document() {
    let env = setup_env();
    let store = open_store(&env.config).await;
    // Empty OCR output: normalized to the sentinel downstream.
    let engine = FixedOcr::new("");
    let pipeline = pipeline_with(&engine);

    let up = upload(&env.uploads, "unreadable_scan.pdf", b"noise", "Mystery scan");
    let doc = pipeline
        .ingest(&store, up, &env.config.storage.root, &NoProgress)
        .await
        .unwrap();

    assert_eq!(doc.extracted_text, "OCR Extraction Failed");
    assert_eq!(doc.category, "unclassified");
    assert_eq!(doc.confidence, 0.0);
    assert_eq!(doc.fraud_status, FraudStatus::Rejected);

    // No stray rasters left next to the (now moved) upload.
    let leftovers: Vec<_> = std::fs::read_dir(&env.uploads)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    assert!(leftovers.is_empty(), "temp rasters must be cleaned: {:?}", leftovers);

    store.close().await;
}

#[tokio::test]
async fn custom_rule_table_drives_classification() {
    let env = setup_env();
    let store = open_store(&env.config).await;

    // A one-category table replaces the builtin set without touching any
    // classifier code.
    let rules = RuleSet::from_toml_str(
        r#"
        [[rule]]
        category = "field-report"
        filename_keywords = ["survey"]
        "#,
    )
    .unwrap();
    let engine = FixedOcr::new(INVOICE_TEXT);
    let pipeline = Pipeline::new(rules, Box::new(engine.clone()), vec!["pdf".to_string()]).unwrap();

    let up = upload(&env.uploads, "survey_q3.pdf", b"survey bytes", "Q3 survey");
    let doc = pipeline
        .ingest(&store, up, &env.config.storage.root, &NoProgress)
        .await
        .unwrap();
    assert_eq!(doc.category, "field-report");
    assert_eq!(doc.confidence, 0.8);

    store.close().await;
}
