//! Minimum-output-size acceptance rule distinguishing genuine extraction
//! from spurious or empty results.

/// Minimum character count for the embedded-text layers. A structured
/// extraction under this on a real document is almost certainly spurious
/// (e.g. a form that is only a logo).
pub const TEXT_LAYER_MIN_CHARS: usize = 100;

/// Minimum character count for optical recognition. Lower than the text
/// layers: OCR output is noisier, and a short single-field document can
/// legitimately be terse once the cheaper options are exhausted.
pub const OCR_MIN_CHARS: usize = 50;

/// Accept iff the normalized text is strictly longer than `min_chars`.
pub fn accepts(text: &str, min_chars: usize) -> bool {
    text.chars().count() > min_chars
}
