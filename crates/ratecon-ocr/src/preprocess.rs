//! Raster cleanup before recognition.
//!
//! Scanned rate confirmations are faxed, skewed, and speckled; Tesseract
//! does markedly better on a cleaned bilevel image than on the raw raster.
//! The steps are order-sensitive: binarization must follow the contrast
//! and sharpness boosts, and the median filter must follow binarization
//! (it exists to suppress the speckle binarization introduces).

use image::{DynamicImage, GrayImage, imageops};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::filter::median_filter;
use thiserror::Error;

/// Contrast boost passed to `image::imageops::contrast`; roughly doubles
/// the separation between text and background.
pub const CONTRAST_BOOST: f32 = 100.0;

/// Unsharp-mask parameters, the raster equivalent of a ~2x sharpness
/// enhancement.
pub const SHARPEN_SIGMA: f32 = 1.5;
pub const SHARPEN_THRESHOLD: i32 = 2;

/// Fixed binarization cutoff: pixels above this map to white, else black.
pub const BINARIZE_THRESHOLD: u8 = 150;

/// Median filter radius (1 = 3x3 kernel).
pub const MEDIAN_RADIUS: u32 = 1;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("page raster has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Run the full enhancement pipeline on one page raster.
///
/// Fixed order: grayscale, contrast boost, sharpen, fixed-threshold
/// binarization, median despeckle.
pub fn preprocess(page: &DynamicImage) -> Result<GrayImage, PreprocessError> {
    let gray = page.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(PreprocessError::EmptyImage {
            width: gray.width(),
            height: gray.height(),
        });
    }

    let boosted = imageops::contrast(&gray, CONTRAST_BOOST);
    let sharpened = imageops::unsharpen(&boosted, SHARPEN_SIGMA, SHARPEN_THRESHOLD);
    let binary = threshold(&sharpened, BINARIZE_THRESHOLD, ThresholdType::Binary);
    Ok(median_filter(&binary, MEDIAN_RADIUS, MEDIAN_RADIUS))
}

/// Preprocess a page, degrading to plain grayscale on failure.
///
/// A corrupt raster must not abort the whole document: the page still
/// goes to the engine, just without enhancement.
pub fn prepare_page(page: &DynamicImage) -> GrayImage {
    match preprocess(page) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!(error = %e, "preprocessing failed, falling back to grayscale");
            page.to_luma8()
        }
    }
}
