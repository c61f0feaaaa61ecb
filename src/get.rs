//! Document retrieval by ID.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::store::SqliteStore;

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let doc = store.get(id).await?;
    store.close().await;

    let doc = match doc {
        Some(d) => d,
        None => bail!("document not found: {}", id),
    };

    println!("--- Document ---");
    println!("id:           {}", doc.id);
    println!("name:         {}", doc.display_name);
    if let Some(ref desc) = doc.description {
        println!("description:  {}", desc);
    }
    println!("filename:     {}", doc.filename);
    println!("fingerprint:  {}", doc.fingerprint);
    println!("category:     {} (confidence {:.2})", doc.category, doc.confidence);
    match &doc.fraud_reason {
        Some(reason) => println!("fraud:        {} — {}", doc.fraud_status, reason),
        None => println!("fraud:        {}", doc.fraud_status),
    }
    if let Some(ref reviewer) = doc.verified_by {
        let at = doc
            .verified_at
            .map(format_ts_iso)
            .unwrap_or_else(|| "unknown".to_string());
        println!("reviewed by:  {} at {}", reviewer, at);
    }
    println!("uploader:     {}", doc.uploader);
    println!("uploaded:     {}", format_ts_iso(doc.created_at));
    println!("stored at:    {}", doc.stored_path);
    println!();

    println!("--- Extracted text ---");
    println!("{}", doc.extracted_text);

    Ok(())
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
