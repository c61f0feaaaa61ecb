//! Vault statistics and health overview.
//!
//! Provides a quick summary of what's stored: document counts, category
//! and fraud-status breakdowns, and recent activity. Used by `vdoc stats`
//! to give confidence that ingestion and review are working as expected.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::store::SqliteStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;

    let total_docs: i64 = sqlx::query("SELECT COUNT(*) AS count FROM documents")
        .fetch_one(store.pool())
        .await?
        .get("count");

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("veridoc — Vault Stats");
    println!("=====================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!("  Vault:       {}", config.storage.root.display());
    println!();
    println!("  Documents:   {}", total_docs);

    let by_category = store.category_counts().await?;
    if !by_category.is_empty() {
        println!();
        println!("  By category:");
        println!("  {:<24} {:>6}", "CATEGORY", "DOCS");
        println!("  {}", "-".repeat(32));
        for (category, count) in &by_category {
            println!("  {:<24} {:>6}", category, count);
        }
    }

    let by_status = store.fraud_status_counts().await?;
    if !by_status.is_empty() {
        println!();
        println!("  By fraud status:");
        println!("  {:<24} {:>6}", "STATUS", "DOCS");
        println!("  {}", "-".repeat(32));
        for (status, count) in &by_status {
            println!("  {:<24} {:>6}", status, count);
        }
    }

    let recent = store.recent_activity(10).await?;
    if !recent.is_empty() {
        println!();
        println!("  Recent activity:");
        for entry in &recent {
            println!(
                "  {:<14} {}  {}  ({})",
                entry.kind,
                entry.document_id,
                entry.detail,
                format_ts_relative(entry.created_at)
            );
        }
    }

    println!();
    store.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
