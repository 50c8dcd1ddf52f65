use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for embedded-text extraction backends.
///
/// Implementors pull the structured-text layer out of a document (or, for
/// the OCR tier, synthesize one from page rasters). The cascade in
/// [`crate::cascade`] owns ordering, normalization, and acceptance; a
/// backend only has to return whatever text it can find, raw.
pub trait TextLayerBackend: Send + Sync {
    /// Short identifier used in logs (e.g. "mupdf", "lopdf").
    fn name(&self) -> &str;

    /// Extract the raw text content of a PDF file.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}

/// Trait for rendering document pages to raster images.
///
/// Consumed by the OCR tier; implemented by the mupdf crate so that the
/// OCR pipeline itself stays renderer-agnostic.
pub trait PageRasterizer: Send + Sync {
    /// Render up to the first `max_pages` pages at the given resolution.
    ///
    /// Returns fewer images than `max_pages` for shorter documents, never
    /// more. A page that fails to render is skipped, not fatal.
    fn rasterize(
        &self,
        path: &Path,
        dpi: u32,
        max_pages: usize,
    ) -> Result<Vec<DynamicImage>, BackendError>;
}
