//! # veridoc CLI (`vdoc`)
//!
//! The `vdoc` binary is the primary interface for veridoc. It provides
//! commands for database initialization, document ingestion, content
//! verification, listing, reviewer overrides, and vault statistics.
//!
//! ## Usage
//!
//! ```bash
//! vdoc --config ./config/veridoc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `vdoc init` | Create the SQLite database and run schema migrations |
//! | `vdoc ingest <file>` | Run one file through the intake pipeline |
//! | `vdoc verify <file>` | Check whether identical content was ingested before |
//! | `vdoc get <id>` | Show a stored document and its extracted text |
//! | `vdoc list` | List stored documents with optional filters |
//! | `vdoc review <id>` | Override a document's fraud status |
//! | `vdoc stats` | Document counts, breakdowns, and recent activity |
//! | `vdoc categories` | Show the active classification rule table |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! vdoc init --config ./config/veridoc.toml
//!
//! # Ingest a scanned invoice
//! vdoc ingest ./scans/invoice_march.pdf --name "March invoice"
//!
//! # Verify a file someone sent back to you
//! vdoc verify ./downloads/invoice_march.pdf
//!
//! # Browse suspicious uploads
//! vdoc list --query invoice
//!
//! # Reviewer override after manual inspection
//! vdoc review 6f9f4dd2-… --status verified --reviewer alice
//! ```

mod categories;
mod classify;
mod config;
mod db;
mod extract;
mod fingerprint;
mod fraud;
mod get;
mod ingest;
mod list;
mod migrate;
mod models;
mod ocr;
mod pipeline;
mod progress;
mod review;
mod rules;
mod stats;
mod store;
mod verify;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::progress::ProgressMode;

/// veridoc CLI — a local-first document intake, classification, and fraud
/// screening pipeline.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/veridoc.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "vdoc",
    about = "veridoc — a local-first document intake, classification, and fraud screening pipeline",
    version,
    long_about = "veridoc ingests document files, deduplicates them by content hash, extracts \
    text via OCR (rasterizing paginated formats first), classifies them against an editable \
    category rule table, and assigns a heuristic fraud status — all stored in a local SQLite \
    database and a category-structured file vault."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/veridoc.toml`. Database, vault, OCR, and
    /// classifier settings are read from this file.
    #[arg(long, global = true, default_value = "./config/veridoc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (documents, activity). This command is idempotent; running it
    /// multiple times is safe.
    Init,

    /// Ingest a document through the intake pipeline.
    ///
    /// Hashes the file, rejects duplicates, extracts text with OCR
    /// (rasterizing page 1 of paginated formats first), classifies it,
    /// runs the fraud checks, and files it into the vault.
    Ingest {
        /// Path to the document file.
        file: PathBuf,

        /// Human-facing document name (required).
        #[arg(long)]
        name: String,

        /// Optional free-form description.
        #[arg(long)]
        description: Option<String>,

        /// Uploader label recorded with the document.
        #[arg(long, default_value = "local")]
        uploader: String,

        /// Progress reporting on stderr: `off`, `human`, or `json`.
        /// Defaults to `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Check whether identical content has been ingested before.
    ///
    /// Re-hashes the given file (or takes a fingerprint directly) and
    /// looks it up in the store. A match means the exact bytes are
    /// already on record.
    Verify {
        /// Path to the file to check.
        file: Option<PathBuf>,

        /// Look up a known content fingerprint instead of hashing a file.
        #[arg(long, conflicts_with = "file")]
        fingerprint: Option<String>,
    },

    /// Show a stored document by its UUID.
    ///
    /// Prints the document's metadata, fraud verdict, and full extracted
    /// text.
    Get {
        /// Document UUID.
        id: String,
    },

    /// List stored documents, newest first.
    List {
        /// Only show documents in this category.
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive substring match on name or filename.
        #[arg(long)]
        query: Option<String>,
    },

    /// Override a document's fraud status after manual review.
    ///
    /// Accepts pending, verified, suspicious, or rejected, stamps the
    /// reviewer and time, and records an activity entry.
    Review {
        /// Document UUID.
        id: String,

        /// New fraud status: pending, verified, suspicious, or rejected.
        #[arg(long)]
        status: String,

        /// Optional human-readable reason stored with the override.
        #[arg(long)]
        reason: Option<String>,

        /// Reviewer label recorded with the override.
        #[arg(long, default_value = "admin")]
        reviewer: String,
    },

    /// Show document counts, breakdowns, and recent activity.
    Stats,

    /// Show the active classification rule table.
    ///
    /// Categories are configuration, not code: point
    /// `[classifier] rules_path` at a TOML file to change them.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            file,
            name,
            description,
            uploader,
            progress,
        } => {
            let mode = match progress.as_deref() {
                Some(value) => ProgressMode::parse(value).ok_or_else(|| {
                    anyhow::anyhow!("invalid --progress value '{}'. Use off, human, or json.", value)
                })?,
                None => ProgressMode::default_for_tty(),
            };
            ingest::run_ingest(&cfg, &file, &name, description, &uploader, mode).await?;
        }
        Commands::Verify { file, fingerprint } => {
            verify::run_verify(&cfg, file.as_deref(), fingerprint.as_deref()).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::List { category, query } => {
            list::run_list(&cfg, category, query).await?;
        }
        Commands::Review {
            id,
            status,
            reason,
            reviewer,
        } => {
            review::run_review(&cfg, &id, &status, reason, &reviewer).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Categories => {
            categories::list_categories(&cfg)?;
        }
    }

    Ok(())
}
