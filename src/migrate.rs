use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the schema on an existing pool. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Documents: one row per unique content fingerprint. The UNIQUE
    // constraint, not the pipeline's check-then-insert, is the source of
    // truth for one-record-per-fingerprint.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            fingerprint TEXT NOT NULL UNIQUE,
            filename TEXT NOT NULL,
            display_name TEXT NOT NULL,
            description TEXT,
            stored_path TEXT NOT NULL,
            category TEXT NOT NULL,
            confidence REAL NOT NULL,
            fraud_status TEXT NOT NULL,
            fraud_reason TEXT,
            extracted_text TEXT NOT NULL,
            uploader TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            verified_by TEXT,
            verified_at INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Audit trail for uploads and reviewer actions.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            document_id TEXT NOT NULL,
            detail TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (document_id) REFERENCES documents(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_category ON documents(category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_fraud_status ON documents(fraud_status)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_activity_created_at ON activity(created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
