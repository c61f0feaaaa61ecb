//! Content fingerprinting for deduplication and authenticity checks.
//!
//! A fingerprint is the lowercase hex SHA-256 of the raw file bytes: a
//! pure function of content, no salt. The same fingerprint serves two
//! jobs: rejecting byte-identical re-uploads and answering "has this exact
//! content been ingested before?" during verification.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Compute the content fingerprint of a byte slice.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the content fingerprint of a file on disk.
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;
    Ok(fingerprint_bytes(&bytes))
}
