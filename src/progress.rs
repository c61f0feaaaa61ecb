//! Extraction progress reporting.
//!
//! Reports observable progress during `vdoc ingest` so users see which
//! external step (rasterization, OCR) a long-running extraction is in.
//! Progress is emitted on **stderr** so stdout remains parseable for
//! scripts. Progress has no effect on extraction results; the OCR engine's
//! own incremental output is ignored by the core.

use std::io::Write;

/// A single progress event for one extraction.
#[derive(Clone, Debug)]
pub enum ExtractProgressEvent {
    /// Converting page 1 of a paginated document to a raster image.
    Rasterizing { file: String },
    /// Running OCR over the (possibly rasterized) image.
    Recognizing { file: String },
}

/// Reports extraction progress. Implementations write to stderr.
pub trait ExtractProgressReporter: Send + Sync {
    fn report(&self, event: ExtractProgressEvent);
}

/// Human-friendly progress: "ingest scan.pdf  rasterizing page 1...".
pub struct StderrProgress;

impl ExtractProgressReporter for StderrProgress {
    fn report(&self, event: ExtractProgressEvent) {
        let line = match &event {
            ExtractProgressEvent::Rasterizing { file } => {
                format!("ingest {}  rasterizing page 1...\n", file)
            }
            ExtractProgressEvent::Recognizing { file } => {
                format!("ingest {}  running ocr...\n", file)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ExtractProgressReporter for JsonProgress {
    fn report(&self, event: ExtractProgressEvent) {
        let obj = match &event {
            ExtractProgressEvent::Rasterizing { file } => serde_json::json!({
                "event": "progress",
                "file": file,
                "phase": "rasterizing"
            }),
            ExtractProgressEvent::Recognizing { file } => serde_json::json!({
                "event": "progress",
                "file": file,
                "phase": "recognizing"
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ExtractProgressReporter for NoProgress {
    fn report(&self, _event: ExtractProgressEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Parse the CLI `--progress` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    /// Build a reporter for this mode. Caller passes it into the pipeline.
    pub fn reporter(&self) -> Box<dyn ExtractProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
