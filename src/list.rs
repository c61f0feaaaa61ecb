//! The `vdoc list` command.
//!
//! Lists stored documents newest first, with optional category and
//! name-substring filters.

use anyhow::Result;

use crate::config::Config;
use crate::store::SqliteStore;

pub async fn run_list(
    config: &Config,
    category: Option<String>,
    query: Option<String>,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let documents = store
        .list(category.as_deref(), query.as_deref())
        .await?;
    store.close().await;

    if documents.is_empty() {
        println!("No documents.");
        return Ok(());
    }

    for (i, doc) in documents.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(doc.created_at, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        println!(
            "{}. [{}] {} / {}",
            i + 1,
            doc.fraud_status,
            doc.category,
            doc.display_name
        );
        println!("    uploaded: {} by {}", date, doc.uploader);
        if let Some(ref reason) = doc.fraud_reason {
            println!("    reason: {}", reason);
        }
        println!("    id: {}", doc.id);
        println!();
    }
    println!("{} document(s).", documents.len());

    Ok(())
}
