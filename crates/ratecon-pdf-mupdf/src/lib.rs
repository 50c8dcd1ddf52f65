use std::path::Path;

use image::{DynamicImage, GrayImage};
use mupdf::{Colorspace, Document, Matrix, TextPageFlags};

use ratecon_core::{BackendError, PageRasterizer, TextLayerBackend, page_marker};

/// MuPDF-based implementation of the primary embedded-text layer and the
/// page rasterizer used by the OCR tier.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the pure-Rust fallback layers do not
/// transitively depend on it.
#[derive(Debug, Default)]
pub struct MupdfLayer;

impl MupdfLayer {
    pub fn new() -> Self {
        Self
    }
}

fn open_document(path: &Path) -> Result<Document, BackendError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;
    Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))
}

impl TextLayerBackend for MupdfLayer {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let document = open_document(path)?;

        let mut pages_text = Vec::new();

        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::Extraction(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| BackendError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::Extraction(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(format!("{}\n{}", page_marker(index + 1), page_text));
        }

        Ok(pages_text.join("\n"))
    }
}

/// Renders document pages to grayscale rasters via MuPDF.
#[derive(Debug, Default)]
pub struct MupdfRasterizer;

impl MupdfRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for MupdfRasterizer {
    fn rasterize(
        &self,
        path: &Path,
        dpi: u32,
        max_pages: usize,
    ) -> Result<Vec<DynamicImage>, BackendError> {
        let document = open_document(path)?;

        // PDF user space is 72 units per inch.
        let scale = dpi as f32 / 72.0;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_gray();

        let mut images = Vec::new();

        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::Extraction(e.to_string()))?
            .take(max_pages)
            .enumerate()
        {
            let page = match page_result {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(page = index + 1, error = %e, "skipping unloadable page");
                    continue;
                }
            };

            // Render annotations and form widgets too: rate confirmations
            // are frequently filled-in AcroForm documents.
            let pixmap = match page.to_pixmap(&matrix, &colorspace, false, true) {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(page = index + 1, error = %e, "skipping unrenderable page");
                    continue;
                }
            };

            match gray_image_from_pixmap_samples(
                pixmap.width() as usize,
                pixmap.height() as usize,
                pixmap.samples(),
            ) {
                Some(img) => images.push(DynamicImage::ImageLuma8(img)),
                None => {
                    tracing::debug!(page = index + 1, "pixmap has unexpected geometry, skipped");
                }
            }
        }

        Ok(images)
    }
}

/// Build a `GrayImage` from raw gray pixmap samples, tolerating row
/// padding (stride wider than the pixel row).
fn gray_image_from_pixmap_samples(width: usize, height: usize, samples: &[u8]) -> Option<GrayImage> {
    if width == 0 || height == 0 {
        return None;
    }
    let expected = width * height;
    if samples.len() == expected {
        return GrayImage::from_raw(width as u32, height as u32, samples.to_vec());
    }
    if samples.len() > expected && samples.len() % height == 0 {
        let stride = samples.len() / height;
        if stride < width {
            return None;
        }
        let mut buf = Vec::with_capacity(expected);
        for y in 0..height {
            buf.extend_from_slice(&samples[y * stride..y * stride + width]);
        }
        return GrayImage::from_raw(width as u32, height as u32, buf);
    }
    None
}
