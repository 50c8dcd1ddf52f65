//! Optical-recognition fallback tier: rasterize the leading pages,
//! clean each raster up, and run Tesseract over it.
//!
//! Only reached after every embedded-text layer has failed or come back
//! under threshold, so per-page latency (seconds) is acceptable here.

use std::path::Path;

use image::GrayImage;
use tesseract::Tesseract;

use ratecon_core::{BackendError, PageRasterizer, TextLayerBackend, page_marker};

pub mod preprocess;

pub use preprocess::{PreprocessError, prepare_page, preprocess};

/// Raster resolution for recognition. 300 DPI is the conventional sweet
/// spot for Tesseract on letter-size scans.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Hard cap on pages sent to recognition. Rate confirmations front-load
/// their content; pages past the first ten are terms boilerplate.
pub const DEFAULT_MAX_OCR_PAGES: usize = 10;

pub const DEFAULT_LANGUAGE: &str = "eng";

/// A character-recognition engine for one prepared page raster.
///
/// Split from [`OcrLayer`] so the cascade-facing strategy can be tested
/// without a Tesseract installation.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, page: &GrayImage) -> Result<String, BackendError>;
}

/// Tesseract-backed [`OcrEngine`].
///
/// A fresh Tesseract handle is created per page; the handle is cheap next
/// to recognition itself and keeps this type `Send + Sync`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, page: &GrayImage) -> Result<String, BackendError> {
        // Scoped temp dir: the page raster is deleted on every exit path,
        // including recognition errors.
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("page.png");
        page.save(&path)
            .map_err(|e| BackendError::Extraction(format!("failed to write page raster: {e}")))?;
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Extraction("invalid temp path encoding".into()))?;

        let text = Tesseract::new(None, Some(&self.language))
            .map_err(|e| BackendError::Extraction(format!("tesseract init: {e}")))?
            // PSM 6 (single uniform block) suits the mixed tables and
            // address blocks of rate confirmations better than full auto.
            .set_variable("tessedit_pageseg_mode", "6")
            .map_err(|e| BackendError::Extraction(format!("tesseract config: {e}")))?
            .set_image(path_str)
            .map_err(|e| BackendError::Extraction(format!("tesseract image: {e}")))?
            .recognize()
            .map_err(|e| BackendError::Extraction(format!("tesseract recognize: {e}")))?
            .get_text()
            .map_err(|e| BackendError::Extraction(format!("tesseract text: {e}")))?;

        Ok(text)
    }
}

/// The "ocr" strategy: rasterize, prepare, recognize, join with page
/// markers.
pub struct OcrLayer {
    rasterizer: Box<dyn PageRasterizer>,
    engine: Box<dyn OcrEngine>,
    dpi: u32,
    max_pages: usize,
}

impl OcrLayer {
    pub fn new(rasterizer: Box<dyn PageRasterizer>, engine: Box<dyn OcrEngine>) -> Self {
        Self {
            rasterizer,
            engine,
            dpi: DEFAULT_OCR_DPI,
            max_pages: DEFAULT_MAX_OCR_PAGES,
        }
    }

    /// Raster resolution, clamped to a sane band.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.clamp(150, 600);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }
}

impl TextLayerBackend for OcrLayer {
    fn name(&self) -> &str {
        "ocr"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let pages = self.rasterizer.rasterize(path, self.dpi, self.max_pages)?;
        tracing::debug!(
            pages = pages.len(),
            dpi = self.dpi,
            engine = self.engine.name(),
            "rasterized document for recognition"
        );

        let mut pages_text = Vec::new();
        for (index, page) in pages.iter().take(self.max_pages).enumerate() {
            let prepared = prepare_page(page);
            let text = match self.engine.recognize(&prepared) {
                Ok(t) => t,
                Err(e) => {
                    // One unrecognizable page must not sink the rest.
                    tracing::warn!(page = index + 1, error = %e, "recognition failed for page");
                    String::new()
                }
            };
            pages_text.push(format!("{}\n{}", page_marker(index + 1), text));
        }

        Ok(pages_text.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pretends to be a document with a fixed number of pages.
    struct FakeRasterizer {
        page_count: usize,
        fail: bool,
    }

    impl PageRasterizer for FakeRasterizer {
        fn rasterize(
            &self,
            _path: &Path,
            _dpi: u32,
            max_pages: usize,
        ) -> Result<Vec<DynamicImage>, BackendError> {
            if self.fail {
                return Err(BackendError::Open("broken document".into()));
            }
            Ok((0..self.page_count.min(max_pages))
                .map(|_| DynamicImage::new_luma8(8, 8))
                .collect())
        }
    }

    /// Canned per-page recognition results with call counting.
    struct FakeEngine {
        responses: Mutex<Vec<Result<String, String>>>,
        calls: AtomicUsize,
    }

    impl FakeEngine {
        /// Empty sequence: every call gets the default recognized text.
        fn always() -> Self {
            Self::sequence(vec![])
        }

        fn sequence(responses: Vec<Result<String, String>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OcrEngine for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, _page: &GrayImage) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.lock().unwrap().pop() {
                Some(Ok(t)) => Ok(t),
                Some(Err(e)) => Err(BackendError::Extraction(e)),
                None => Ok("recognized line of freight text".into()),
            }
        }
    }

    impl OcrEngine for std::sync::Arc<FakeEngine> {
        fn name(&self) -> &str {
            self.as_ref().name()
        }

        fn recognize(&self, page: &GrayImage) -> Result<String, BackendError> {
            self.as_ref().recognize(page)
        }
    }

    fn layer(
        rasterizer: FakeRasterizer,
        engine: FakeEngine,
    ) -> (OcrLayer, std::sync::Arc<FakeEngine>) {
        let engine = std::sync::Arc::new(engine);
        (
            OcrLayer::new(Box::new(rasterizer), Box::new(std::sync::Arc::clone(&engine))),
            engine,
        )
    }

    #[test]
    fn twelve_page_document_caps_at_ten_markers() {
        let (ocr, engine) = layer(
            FakeRasterizer {
                page_count: 12,
                fail: false,
            },
            FakeEngine::always(),
        );

        let text = ocr.extract_text(Path::new("any.pdf")).unwrap();
        assert_eq!(text.matches("--- Page ").count(), 10);
        assert!(text.contains("--- Page 10 ---"));
        assert!(!text.contains("--- Page 11 ---"));
        assert_eq!(engine.calls(), 10);
    }

    #[test]
    fn failed_page_does_not_abort_later_pages() {
        let (ocr, engine) = layer(
            FakeRasterizer {
                page_count: 3,
                fail: false,
            },
            FakeEngine::sequence(vec![
                Ok("pickup at 123 Main St".into()),
                Err("engine fault".into()),
                Ok("delivery at 456 Dock Rd".into()),
            ]),
        );

        let text = ocr.extract_text(Path::new("any.pdf")).unwrap();
        assert_eq!(engine.calls(), 3);
        assert_eq!(text.matches("--- Page ").count(), 3);
        assert!(text.contains("pickup at 123 Main St"));
        assert!(text.contains("delivery at 456 Dock Rd"));
    }

    #[test]
    fn rasterizer_failure_propagates() {
        let (ocr, engine) = layer(
            FakeRasterizer {
                page_count: 0,
                fail: true,
            },
            FakeEngine::always(),
        );

        assert!(ocr.extract_text(Path::new("any.pdf")).is_err());
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn dpi_is_clamped() {
        let (ocr, _) = layer(
            FakeRasterizer {
                page_count: 0,
                fail: false,
            },
            FakeEngine::always(),
        );
        let ocr = ocr.with_dpi(10_000);
        assert_eq!(ocr.dpi, 600);
        let ocr = ocr.with_dpi(10);
        assert_eq!(ocr.dpi, 150);
    }
}
