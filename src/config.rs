use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Vault root; ingested files are filed under `<root>/<category>/`.
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_rasterizer_bin")]
    pub rasterizer_bin: String,
    #[serde(default = "default_tesseract_bin")]
    pub tesseract_bin: String,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Extensions (lowercase, no dot) rasterized page-first before OCR.
    #[serde(default = "default_paginated_extensions")]
    pub paginated_extensions: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            rasterizer_bin: default_rasterizer_bin(),
            tesseract_bin: default_tesseract_bin(),
            dpi: default_dpi(),
            paginated_extensions: default_paginated_extensions(),
        }
    }
}

fn default_language() -> String {
    "eng".to_string()
}
fn default_rasterizer_bin() -> String {
    "pdftoppm".to_string()
}
fn default_tesseract_bin() -> String {
    "tesseract".to_string()
}
fn default_dpi() -> u32 {
    150
}
fn default_paginated_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    /// Optional TOML rule table overriding the builtin categories.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate ocr
    if config.ocr.language.trim().is_empty() {
        anyhow::bail!("ocr.language must not be empty");
    }
    if config.ocr.dpi == 0 {
        anyhow::bail!("ocr.dpi must be > 0");
    }
    if config.ocr.rasterizer_bin.trim().is_empty() || config.ocr.tesseract_bin.trim().is_empty() {
        anyhow::bail!("ocr.rasterizer_bin and ocr.tesseract_bin must not be empty");
    }
    for ext in &config.ocr.paginated_extensions {
        if ext.starts_with('.') || ext.chars().any(|c| c.is_uppercase()) {
            anyhow::bail!(
                "ocr.paginated_extensions entries must be lowercase without a leading dot, got '{}'",
                ext
            );
        }
    }

    // Validate classifier
    if let Some(ref rules_path) = config.classifier.rules_path {
        if !rules_path.exists() {
            anyhow::bail!(
                "classifier.rules_path does not exist: {}",
                rules_path.display()
            );
        }
    }

    Ok(config)
}
