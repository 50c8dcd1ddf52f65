//! Assembles the default extraction cascade.
//!
//! Tier order is fixed (cheap, high-fidelity embedded-text renderers
//! first, Tesseract last), but individual tiers can be disabled by wire
//! name, and the native-library tiers compile out behind the `mupdf` and
//! `ocr` features.

use std::path::Path;

use ratecon_core::{
    Extractor, ExtractionMethod, OCR_MIN_CHARS, Strategy, TEXT_LAYER_MIN_CHARS,
};
use ratecon_pdf_text::{LopdfLayer, PdfExtractLayer};

/// Knobs for [`default_extractor`]. Field defaults match the production
/// cascade; tests and the CLI override selectively.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Strategy wire names to leave out of the cascade.
    pub disabled: Vec<String>,
    pub ocr_dpi: u32,
    pub ocr_max_pages: usize,
    pub ocr_language: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            ocr_dpi: 300,
            ocr_max_pages: 10,
            ocr_language: "eng".to_string(),
        }
    }
}

impl ExtractorConfig {
    fn enabled(&self, method: ExtractionMethod) -> bool {
        !self.disabled.iter().any(|d| d == method.as_str())
    }
}

/// Upstream precondition helper: does this look like a PDF at all?
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Build the full cascade: layer_a, layer_b, layer_c, then ocr.
pub fn default_extractor(config: &ExtractorConfig) -> Extractor {
    let mut strategies = Vec::new();

    #[cfg(feature = "mupdf")]
    if config.enabled(ExtractionMethod::LayerA) {
        strategies.push(Strategy::new(
            ExtractionMethod::LayerA,
            Box::new(ratecon_pdf_mupdf::MupdfLayer::new()),
            TEXT_LAYER_MIN_CHARS,
        ));
    }

    if config.enabled(ExtractionMethod::LayerB) {
        strategies.push(Strategy::new(
            ExtractionMethod::LayerB,
            Box::new(PdfExtractLayer::new()),
            TEXT_LAYER_MIN_CHARS,
        ));
    }

    if config.enabled(ExtractionMethod::LayerC) {
        strategies.push(Strategy::new(
            ExtractionMethod::LayerC,
            Box::new(LopdfLayer::new()),
            TEXT_LAYER_MIN_CHARS,
        ));
    }

    #[cfg(feature = "ocr")]
    if config.enabled(ExtractionMethod::Ocr) {
        strategies.push(Strategy::new(
            ExtractionMethod::Ocr,
            Box::new(
                ratecon_ocr::OcrLayer::new(
                    Box::new(ratecon_pdf_mupdf::MupdfRasterizer::new()),
                    Box::new(ratecon_ocr::TesseractEngine::new(&config.ocr_language)),
                )
                .with_dpi(config.ocr_dpi)
                .with_max_pages(config.ocr_max_pages),
            ),
            OCR_MIN_CHARS,
        ));
    }

    let extractor = Extractor::new(strategies);
    tracing::debug!(
        methods = ?extractor.methods().iter().map(|m| m.as_str()).collect::<Vec<_>>(),
        "assembled extraction cascade"
    );
    extractor
}
