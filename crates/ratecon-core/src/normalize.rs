//! Text normalization applied to every strategy's output before the
//! quality gate, so thresholds are measured on comparable text.

/// Collapse whitespace runs and drop blank lines.
///
/// Within each line, runs of whitespace become single spaces; lines that
/// are empty after collapsing are removed; surviving lines are rejoined
/// with single `\n` separators. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Page-boundary marker inserted between per-page extraction results.
/// `n` is 1-based.
pub fn page_marker(n: usize) -> String {
    format!("--- Page {} ---", n)
}

/// Truncate to at most `budget` characters, on a char boundary.
///
/// Used to fit normalized text into the summarizer's input budget; a
/// byte-index slice could split a multi-byte character and panic.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
