//! Document persistence.
//!
//! [`DocumentStore`] is the collaborator contract the pipeline depends on:
//! look up by fingerprint, insert a fully computed draft, and apply a
//! reviewer's fraud-status override. [`SqliteStore`] implements it over
//! SQLite and adds the listing/statistics queries the CLI commands use.
//!
//! The `documents.fingerprint` UNIQUE constraint is the store-side source
//! of truth for "exactly one record per fingerprint"; the pipeline's
//! check-then-insert is advisory and the constraint backstops concurrent
//! uploads of identical bytes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::models::{ActivityEntry, Document, DocumentDraft, FraudStatus};

/// The persistence operations the ingestion pipeline relies on.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find the document with this content fingerprint, if any.
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Document>>;

    /// Persist a fully computed draft, returning the stored document.
    /// Fails if the fingerprint already exists.
    async fn insert(&self, draft: DocumentDraft) -> Result<Document>;

    /// Reviewer override of the fraud verdict. Returns the updated
    /// document, or `None` when the id is unknown.
    async fn update_fraud_status(
        &self,
        id: &str,
        status: FraudStatus,
        reason: Option<&str>,
        reviewer: &str,
    ) -> Result<Option<Document>>;
}

/// SQLite-backed store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect using the application config.
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(db::connect(config).await?))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    /// List documents, newest first, optionally filtered by category and a
    /// case-insensitive name/filename substring.
    pub async fn list(
        &self,
        category: Option<&str>,
        name_query: Option<&str>,
    ) -> Result<Vec<Document>> {
        let mut sql = String::from("SELECT * FROM documents WHERE 1 = 1");
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if name_query.is_some() {
            sql.push_str(" AND (display_name LIKE ? OR filename LIKE ?)");
        }
        sql.push_str(" ORDER BY created_at DESC, id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(cat) = category {
            query = query.bind(cat.to_string());
        }
        if let Some(q) = name_query {
            let pattern = format!("%{}%", q);
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    /// Document counts grouped by category, largest first.
    pub async fn category_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) AS count
            FROM documents
            GROUP BY category
            ORDER BY count DESC, category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| (r.get("category"), r.get("count")))
            .collect())
    }

    /// Document counts grouped by fraud status, largest first.
    pub async fn fraud_status_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT fraud_status, COUNT(*) AS count
            FROM documents
            GROUP BY fraud_status
            ORDER BY count DESC, fraud_status ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| (r.get("fraud_status"), r.get("count")))
            .collect())
    }

    /// Append an audit trail entry.
    pub async fn record_activity(&self, kind: &str, document_id: &str, detail: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO activity (kind, document_id, detail, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(kind)
        .bind(document_id)
        .bind(detail)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent audit entries, newest first.
    pub async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityEntry>> {
        let rows = sqlx::query(
            "SELECT id, kind, document_id, detail, created_at FROM activity \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| ActivityEntry {
                id: r.get("id"),
                kind: r.get("kind"),
                document_id: r.get("document_id"),
                detail: r.get("detail"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT * FROM documents WHERE fingerprint = ?")
            .bind(fingerprint)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn insert(&self, draft: DocumentDraft) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO documents
                (id, fingerprint, filename, display_name, description, stored_path,
                 category, confidence, fraud_status, fraud_reason, extracted_text,
                 uploader, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&draft.fingerprint)
        .bind(&draft.filename)
        .bind(&draft.display_name)
        .bind(&draft.description)
        .bind(&draft.stored_path)
        .bind(&draft.category)
        .bind(draft.confidence)
        .bind(draft.fraud_status.as_str())
        .bind(&draft.fraud_reason)
        .bind(&draft.extracted_text)
        .bind(&draft.uploader)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert document {}", draft.fingerprint))?;

        Ok(Document {
            id,
            fingerprint: draft.fingerprint,
            filename: draft.filename,
            display_name: draft.display_name,
            description: draft.description,
            stored_path: draft.stored_path,
            category: draft.category,
            confidence: draft.confidence,
            fraud_status: draft.fraud_status,
            fraud_reason: draft.fraud_reason,
            extracted_text: draft.extracted_text,
            uploader: draft.uploader,
            created_at,
            verified_by: None,
            verified_at: None,
        })
    }

    async fn update_fraud_status(
        &self,
        id: &str,
        status: FraudStatus,
        reason: Option<&str>,
        reviewer: &str,
    ) -> Result<Option<Document>> {
        let updated = sqlx::query(
            r#"
            UPDATE documents
            SET fraud_status = ?, fraud_reason = ?, verified_by = ?, verified_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(reason)
        .bind(reviewer)
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

fn row_to_document(row: &SqliteRow) -> Result<Document> {
    let status_raw: String = row.get("fraud_status");
    let fraud_status = status_raw
        .parse::<FraudStatus>()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(Document {
        id: row.get("id"),
        fingerprint: row.get("fingerprint"),
        filename: row.get("filename"),
        display_name: row.get("display_name"),
        description: row.get("description"),
        stored_path: row.get("stored_path"),
        category: row.get("category"),
        confidence: row.get("confidence"),
        fraud_status,
        fraud_reason: row.get("fraud_reason"),
        extracted_text: row.get("extracted_text"),
        uploader: row.get("uploader"),
        created_at: row.get("created_at"),
        verified_by: row.get("verified_by"),
        verified_at: row.get("verified_at"),
    })
}
