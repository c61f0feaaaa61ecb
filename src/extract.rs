//! Best-effort text extraction.
//!
//! Extraction is pipeline-layer: it receives a file path and returns plain
//! text, rasterizing page 1 of paginated formats before OCR. A document
//! with unreadable content is still ingestible, so every rasterization or
//! OCR failure is absorbed here and signalled only through the sentinel
//! text, which downstream stages treat as ordinary (if meaningless) input.
//! Nothing in this module returns an error to the caller.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};

use crate::ocr::OcrEngine;
use crate::progress::{ExtractProgressEvent, ExtractProgressReporter};

/// Sentinel standing in for "extraction produced nothing usable".
///
/// Returned for rasterization failures, OCR failures, and genuinely empty
/// OCR output alike; the pipeline never sees an empty string.
pub const OCR_FAILURE_TEXT: &str = "OCR Extraction Failed";

/// Raster suffix the page rasterizer produces.
const RASTER_SUFFIX: &str = ".png";

/// Extract the text of the document at `path`.
///
/// `paginated_extensions` lists the (lowercase) extensions that need the
/// page-1 rasterization step before OCR; everything else is fed to the OCR
/// engine directly. Temporary rasters are deleted on the way out whatever
/// the OCR outcome; a failed delete is logged, never escalated.
pub fn extract_text(
    path: &Path,
    paginated_extensions: &[String],
    engine: &dyn OcrEngine,
    reporter: &dyn ExtractProgressReporter,
) -> String {
    let (result, temp_raster) = run_extraction(path, paginated_extensions, engine, reporter);

    // Cleanup sits outside the error-absorbing path: the OCR call has
    // already resolved by the time we get here.
    if let Some(ref raster) = temp_raster {
        if let Err(err) = std::fs::remove_file(raster) {
            tracing::warn!(
                raster = %raster.display(),
                %err,
                "failed to remove temporary raster"
            );
        }
    }

    match result {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::debug!(file = %path.display(), "ocr returned empty text");
            OCR_FAILURE_TEXT.to_string()
        }
        Err(err) => {
            tracing::warn!(file = %path.display(), %err, "text extraction failed");
            OCR_FAILURE_TEXT.to_string()
        }
    }
}

/// Run rasterization (when needed) and OCR, reporting which temp raster was
/// created so the caller can clean it up on every path.
fn run_extraction(
    path: &Path,
    paginated_extensions: &[String],
    engine: &dyn OcrEngine,
    reporter: &dyn ExtractProgressReporter,
) -> (Result<String>, Option<PathBuf>) {
    let display = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut temp_raster = None;
    let target = if is_paginated(path, paginated_extensions) {
        reporter.report(ExtractProgressEvent::Rasterizing {
            file: display.clone(),
        });
        match rasterize_first_page(path, engine) {
            Ok(raster) => {
                temp_raster = Some(raster.clone());
                raster
            }
            Err(err) => return (Err(err), None),
        }
    } else {
        path.to_path_buf()
    };

    reporter.report(ExtractProgressEvent::Recognizing { file: display });
    (engine.recognize_text(&target), temp_raster)
}

/// True when the extension marks a paginated format needing rasterization.
fn is_paginated(path: &Path, paginated_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .map(|e| paginated_extensions.iter().any(|p| p.as_str() == e))
        .unwrap_or(false)
}

/// Rasterize page 1 next to the source file and locate the output.
///
/// The rasterizer writes `<stem>*.png` into the source directory but does
/// not return the exact name, so the freshly listed directory is searched
/// by prefix and suffix. Conversion that leaves no matching file is a
/// fatal error for this attempt.
fn rasterize_first_page(source: &Path, engine: &dyn OcrEngine) -> Result<PathBuf> {
    let out_dir = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = source
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("source file has no usable name: {}", source.display()))?;

    engine.rasterize_page(source, &out_dir, &prefix)?;

    for entry in std::fs::read_dir(&out_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) && name.ends_with(RASTER_SUFFIX) {
            return Ok(entry.path());
        }
    }

    bail!(
        "rasterizer reported success but no {}*{} appeared in {}",
        prefix,
        RASTER_SUFFIX,
        out_dir.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pdf_exts() -> Vec<String> {
        vec!["pdf".to_string()]
    }

    /// Configurable fake engine with call counters.
    #[derive(Default)]
    struct FakeEngine {
        rasterize_calls: AtomicUsize,
        recognize_calls: AtomicUsize,
        fail_rasterize: bool,
        skip_writing_raster: bool,
        fail_recognize: bool,
        text: String,
    }

    impl FakeEngine {
        fn returning(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Default::default()
            }
        }
    }

    impl OcrEngine for FakeEngine {
        fn rasterize_page(&self, _source: &Path, out_dir: &Path, out_prefix: &str) -> Result<()> {
            self.rasterize_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_rasterize {
                bail!("conversion failed");
            }
            if !self.skip_writing_raster {
                // Mimics pdftoppm's page-suffixed output name.
                std::fs::write(out_dir.join(format!("{}-1.png", out_prefix)), b"png")?;
            }
            Ok(())
        }

        fn recognize_text(&self, _path: &Path) -> Result<String> {
            self.recognize_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_recognize {
                bail!("ocr crashed");
            }
            Ok(self.text.clone())
        }
    }

    fn raster_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".png"))
            .collect()
    }

    #[test]
    fn paginated_file_is_rasterized_then_recognized_and_raster_removed() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("invoice_march.pdf");
        std::fs::write(&pdf, b"%PDF-fake").unwrap();

        let engine = FakeEngine::returning("Invoice number 42");
        let text = extract_text(&pdf, &pdf_exts(), &engine, &NoProgress);

        assert_eq!(text, "Invoice number 42");
        assert_eq!(engine.rasterize_calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.recognize_calls.load(Ordering::SeqCst), 1);
        assert!(raster_files(dir.path()).is_empty(), "temp raster must be deleted");
        assert!(pdf.exists(), "source file must survive");
    }

    #[test]
    fn non_paginated_file_skips_rasterization() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("scan.jpg");
        std::fs::write(&img, b"jpeg").unwrap();

        let engine = FakeEngine::returning("some text");
        let text = extract_text(&img, &pdf_exts(), &engine, &NoProgress);

        assert_eq!(text, "some text");
        assert_eq!(engine.rasterize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.recognize_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rasterization_failure_degrades_to_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("broken.pdf");
        std::fs::write(&pdf, b"not a pdf").unwrap();

        let engine = FakeEngine {
            fail_rasterize: true,
            ..Default::default()
        };
        let text = extract_text(&pdf, &pdf_exts(), &engine, &NoProgress);

        assert_eq!(text, OCR_FAILURE_TEXT);
        // OCR never ran.
        assert_eq!(engine.recognize_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_raster_after_conversion_degrades_to_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("ghost.pdf");
        std::fs::write(&pdf, b"%PDF-fake").unwrap();

        let engine = FakeEngine {
            skip_writing_raster: true,
            ..Default::default()
        };
        let text = extract_text(&pdf, &pdf_exts(), &engine, &NoProgress);

        assert_eq!(text, OCR_FAILURE_TEXT);
        assert_eq!(engine.recognize_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ocr_failure_degrades_to_sentinel_and_still_cleans_raster() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("scan.pdf");
        std::fs::write(&pdf, b"%PDF-fake").unwrap();

        let engine = FakeEngine {
            fail_recognize: true,
            ..Default::default()
        };
        let text = extract_text(&pdf, &pdf_exts(), &engine, &NoProgress);

        assert_eq!(text, OCR_FAILURE_TEXT);
        assert_eq!(engine.rasterize_calls.load(Ordering::SeqCst), 1);
        assert!(
            raster_files(dir.path()).is_empty(),
            "raster removed even when ocr fails"
        );
    }

    #[test]
    fn empty_ocr_output_is_normalized_to_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("blank.jpg");
        std::fs::write(&img, b"jpeg").unwrap();

        for empty in ["", "   \n\t "] {
            let engine = FakeEngine::returning(empty);
            let text = extract_text(&img, &pdf_exts(), &engine, &NoProgress);
            assert_eq!(text, OCR_FAILURE_TEXT);
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("LOUD.PDF");
        std::fs::write(&pdf, b"%PDF-fake").unwrap();

        let engine = FakeEngine::returning("text from a shouty pdf");
        extract_text(&pdf, &pdf_exts(), &engine, &NoProgress);
        assert_eq!(engine.rasterize_calls.load(Ordering::SeqCst), 1);
    }
}
