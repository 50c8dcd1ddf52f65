//! The extraction cascade: an ordered fallback chain of tagged strategies,
//! evaluated strictly left-to-right, halting at the first accepted result.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use crate::backend::TextLayerBackend;
use crate::normalize::normalize;
use crate::{Attempt, AttemptOutcome, Extraction, ExtractError, ExtractionMethod, gate};

/// One `(identifier, backend, acceptance-threshold)` entry in the chain.
pub struct Strategy {
    method: ExtractionMethod,
    min_chars: usize,
    backend: Box<dyn TextLayerBackend>,
}

impl Strategy {
    pub fn new(
        method: ExtractionMethod,
        backend: Box<dyn TextLayerBackend>,
        min_chars: usize,
    ) -> Self {
        Self {
            method,
            min_chars,
            backend,
        }
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }
}

/// Cascade controller.
///
/// Strategies run sequentially: each one is only tried after the previous
/// was confirmed insufficient, so there is nothing to gain from racing
/// them. The controller holds no mutable state, so independent documents
/// can be extracted concurrently from the same `Extractor`. No timeout is
/// enforced here; the caller owns deadlines and cancellation.
pub struct Extractor {
    strategies: Vec<Strategy>,
}

impl Extractor {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// Strategy identifiers in cascade order.
    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.strategies.iter().map(|s| s.method).collect()
    }

    /// Run the cascade over one document.
    ///
    /// A backend fault, empty output, or below-threshold output is logged,
    /// recorded, and the next strategy runs; only an unreadable file or
    /// exhaustion of every strategy is an error. The winning text is
    /// normalized and has already passed its strategy's quality gate.
    pub fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }
        // Fail before any strategy runs if the file cannot be opened at all
        // (permissions, dangling symlink); strategies assume a readable path.
        File::open(path).map_err(|e| ExtractError::Unreadable(e.to_string()))?;

        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let started = Instant::now();
            match strategy.backend.extract_text(path) {
                Ok(raw) => {
                    let text = normalize(&raw);
                    let chars = text.chars().count();
                    if gate::accepts(&text, strategy.min_chars) {
                        tracing::info!(
                            method = %strategy.method,
                            chars,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "extraction accepted"
                        );
                        return Ok(Extraction {
                            text,
                            method: strategy.method,
                        });
                    }
                    tracing::debug!(
                        method = %strategy.method,
                        chars,
                        min_chars = strategy.min_chars,
                        "output below threshold, trying next strategy"
                    );
                    attempts.push(Attempt {
                        method: strategy.method,
                        chars,
                        outcome: if chars == 0 {
                            AttemptOutcome::Empty
                        } else {
                            AttemptOutcome::BelowThreshold
                        },
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        method = %strategy.method,
                        error = %e,
                        "strategy failed, trying next strategy"
                    );
                    attempts.push(Attempt {
                        method: strategy.method,
                        chars: 0,
                        outcome: AttemptOutcome::Failed(e.to_string()),
                    });
                }
            }
        }

        tracing::warn!(
            path = %path.display(),
            tried = attempts.len(),
            "all extraction methods failed"
        );
        Err(ExtractError::AllMethodsFailed { attempts })
    }
}
