//! The `vdoc verify` command.
//!
//! Answers "has this exact content been ingested?" either by re-hashing a
//! local file or by looking up a presented fingerprint directly. Hash
//! equality is the only integrity signal: content addressing, not
//! cryptographic authenticity.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::models::Document;
use crate::pipeline;
use crate::store::{DocumentStore, SqliteStore};

pub async fn run_verify(
    config: &Config,
    file: Option<&Path>,
    fingerprint: Option<&str>,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;

    let result: Option<Document> = match (file, fingerprint) {
        (Some(path), None) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            pipeline::verify(&store, &bytes).await?
        }
        (None, Some(fp)) => store.find_by_fingerprint(fp).await?,
        _ => {
            store.close().await;
            bail!("provide a file path or --fingerprint");
        }
    };
    store.close().await;

    match result {
        Some(doc) => {
            println!("Document is authentic.");
            println!("  id:          {}", doc.id);
            println!("  name:        {}", doc.display_name);
            println!("  category:    {}", doc.category);
            match &doc.fraud_reason {
                Some(reason) => println!("  fraud:       {} — {}", doc.fraud_status, reason),
                None => println!("  fraud:       {}", doc.fraud_status),
            }
            println!("  uploaded:    {}", format_ts_iso(doc.created_at));
            Ok(())
        }
        None => bail!("Document not found: content does not match any stored document"),
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
