//! The `vdoc review` command.
//!
//! Applies a human reviewer's fraud-status override to a stored document.
//! The pipeline's automated verdict stays in place until someone with
//! authority over the vault runs this; authorization itself is outside
//! this crate.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::models::FraudStatus;
use crate::store::{DocumentStore, SqliteStore};

pub async fn run_review(
    config: &Config,
    id: &str,
    status: &str,
    reason: Option<String>,
    reviewer: &str,
) -> Result<()> {
    let status: FraudStatus = match status.parse() {
        Ok(s) => s,
        Err(msg) => bail!(msg),
    };

    let store = SqliteStore::open(config).await?;
    let updated = store
        .update_fraud_status(id, status, reason.as_deref(), reviewer)
        .await?;

    let doc = match updated {
        Some(doc) => doc,
        None => {
            store.close().await;
            bail!("document not found: {}", id);
        }
    };

    let detail = reason
        .clone()
        .unwrap_or_else(|| format!("Document marked as {}", status));
    store.record_activity("verification", &doc.id, &detail).await?;
    store.close().await;

    println!("review {}", doc.id);
    println!("  name:   {}", doc.display_name);
    match &doc.fraud_reason {
        Some(r) => println!("  fraud:  {} — {}", doc.fraud_status, r),
        None => println!("  fraud:  {}", doc.fraud_status),
    }
    println!("  by:     {}", reviewer);
    println!("ok");

    Ok(())
}
