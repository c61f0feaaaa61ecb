//! OCR engine abstraction and the external-tool implementation.
//!
//! The pipeline never implements OCR itself: it talks to an injected
//! [`OcrEngine`] with two operations (rasterize page 1 of a paginated
//! document, recognize text in an image) so tests can substitute
//! deterministic fakes for the real binaries.
//!
//! The production engine shells out to poppler's `pdftoppm` and to
//! `tesseract`. Both are single-attempt calls: no retries, no timeout at
//! this layer (operators impose one around the process if needed).

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::config::OcrConfig;

/// External capability contract for rasterization and text recognition.
pub trait OcrEngine: Send + Sync {
    /// Convert page 1 of `source` into a PNG inside `out_dir`.
    ///
    /// The engine writes a file whose name starts with `out_prefix` but
    /// does not report the exact name; callers discover it by listing the
    /// directory.
    fn rasterize_page(&self, source: &Path, out_dir: &Path, out_prefix: &str) -> Result<()>;

    /// Recognize text in the image at `path`. Returns raw OCR output,
    /// which may be empty.
    fn recognize_text(&self, path: &Path) -> Result<String>;
}

/// `pdftoppm` + `tesseract` backed engine.
pub struct ExternalOcrEngine {
    rasterizer_bin: String,
    tesseract_bin: String,
    language: String,
    dpi: u32,
}

impl ExternalOcrEngine {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            rasterizer_bin: config.rasterizer_bin.clone(),
            tesseract_bin: config.tesseract_bin.clone(),
            language: config.language.clone(),
            dpi: config.dpi,
        }
    }
}

impl OcrEngine for ExternalOcrEngine {
    fn rasterize_page(&self, source: &Path, out_dir: &Path, out_prefix: &str) -> Result<()> {
        let out_root = out_dir.join(out_prefix);

        let output = Command::new(&self.rasterizer_bin)
            .arg("-png")
            .args(["-f", "1", "-l", "1"])
            .args(["-r", &self.dpi.to_string()])
            .arg(source)
            .arg(&out_root)
            .output()
            .with_context(|| {
                format!(
                    "Failed to execute '{}'. Is poppler installed?",
                    self.rasterizer_bin
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed for {}: {}",
                self.rasterizer_bin,
                source.display(),
                stderr.trim()
            );
        }

        Ok(())
    }

    fn recognize_text(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.tesseract_bin)
            .arg(path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .with_context(|| {
                format!(
                    "Failed to execute '{}'. Is tesseract installed?",
                    self.tesseract_bin
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed for {}: {}",
                self.tesseract_bin,
                path.display(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
