//! Pure-Rust embedded-text layers for the middle tiers of the cascade.
//!
//! These exist because PDF text layout is reconstructed heuristically and
//! renderers disagree: some documents expose text to one library and come
//! back empty from another. `pdf-extract` rebuilds reading order the way
//! pdfminer does; `lopdf` walks raw content streams and is the most
//! permissive of the three embedded-text tiers.

use std::path::Path;

use ratecon_core::{BackendError, TextLayerBackend, page_marker};

/// Secondary embedded-text layer backed by `pdf-extract`.
///
/// Whole-document extraction; this library exposes no stable per-page
/// API, so the output is a single stream without page markers.
#[derive(Debug, Default)]
pub struct PdfExtractLayer;

impl PdfExtractLayer {
    pub fn new() -> Self {
        Self
    }
}

impl TextLayerBackend for PdfExtractLayer {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        pdf_extract::extract_text(path).map_err(|e| BackendError::Extraction(e.to_string()))
    }
}

/// Tertiary embedded-text layer backed by `lopdf`.
///
/// Per-page raw content-stream extraction. A page that fails to decode is
/// skipped rather than failing the layer; nonstandard content streams
/// occasionally yield text here after the higher-fidelity renderers have
/// returned nothing.
#[derive(Debug, Default)]
pub struct LopdfLayer;

impl LopdfLayer {
    pub fn new() -> Self {
        Self
    }
}

impl TextLayerBackend for LopdfLayer {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let doc = lopdf::Document::load(path).map_err(|e| BackendError::Open(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(BackendError::Open("document is encrypted".into()));
        }

        let mut pages_text = Vec::new();
        for (&number, _) in doc.get_pages().iter() {
            match doc.extract_text(&[number]) {
                Ok(text) => {
                    pages_text.push(format!("{}\n{}", page_marker(number as usize), text));
                }
                Err(e) => {
                    tracing::debug!(page = number, error = %e, "page failed to decode, skipped");
                }
            }
        }

        Ok(pages_text.join("\n"))
    }
}
