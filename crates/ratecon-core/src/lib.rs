use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod cascade;
pub mod config_file;
pub mod gate;
pub mod llm;
pub mod normalize;

// Re-export for convenience
pub use backend::{BackendError, PageRasterizer, TextLayerBackend};
pub use cascade::{Extractor, Strategy};
pub use gate::{OCR_MIN_CHARS, TEXT_LAYER_MIN_CHARS};
pub use llm::{SummarizeError, Summarizer};
pub use normalize::{normalize, page_marker, truncate_chars};

/// Identifier of the extraction strategy that produced a result.
///
/// Ordered by cascade priority: the embedded-text layers are cheap and
/// tried first, optical recognition is the expensive last resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Primary embedded-text renderer (MuPDF).
    LayerA,
    /// Secondary embedded-text renderer (pdf-extract layout reconstruction).
    LayerB,
    /// Tertiary, most permissive renderer (raw lopdf content-stream walk).
    LayerC,
    /// Rasterize-and-recognize fallback for scanned documents.
    Ocr,
}

impl ExtractionMethod {
    /// Stable wire name used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::LayerA => "layer_a",
            ExtractionMethod::LayerB => "layer_b",
            ExtractionMethod::LayerC => "layer_c",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful output of the extraction cascade.
///
/// Invariant: `text` is normalized, non-empty, and its character count
/// exceeds the quality-gate threshold of the producing strategy. The
/// cascade never returns an `Extraction` that fails its own gate.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub method: ExtractionMethod,
}

impl Extraction {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Why a single strategy's output was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The strategy ran but produced no text at all.
    Empty,
    /// The strategy produced text, but not enough to pass the gate.
    BelowThreshold,
    /// The strategy itself failed (open error, parse error, engine fault).
    Failed(String),
}

/// Diagnostic record of one rejected strategy within a cascade run.
///
/// Attempts only survive a run inside [`ExtractError::AllMethodsFailed`];
/// an accepted strategy discards the records of everything tried before it.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub method: ExtractionMethod,
    /// Post-normalization character count ("0" for `Failed` attempts).
    pub chars: usize,
    pub outcome: AttemptOutcome,
}

/// Terminal failure of an extraction call.
///
/// Per-strategy faults are never surfaced here directly; they are swallowed
/// and the cascade moves on. Only a file that cannot be read at all, or
/// exhaustion of every strategy, ends a call with an error.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("file could not be read: {0}")]
    Unreadable(String),
    #[error("all extraction methods failed")]
    AllMethodsFailed { attempts: Vec<Attempt> },
}

impl ExtractError {
    /// Stable reason tag for reports and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractError::FileNotFound(_) => "file_not_found",
            ExtractError::Unreadable(_) => "unreadable",
            ExtractError::AllMethodsFailed { .. } => "all_methods_failed",
        }
    }
}
