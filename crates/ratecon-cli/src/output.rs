use std::io::Write;

use owo_colors::OwoColorize;
use serde::Serialize;

use ratecon_core::{AttemptOutcome, ExtractError, Extraction, SummarizeError};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// JSON surface of one extraction call: `{ text, method, success, error? }`.
#[derive(Debug, Serialize)]
pub struct ExtractionReport<'a> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<&'static str>,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl<'a> ExtractionReport<'a> {
    pub fn from_result(result: &'a Result<Extraction, ExtractError>) -> Self {
        match result {
            Ok(extraction) => Self {
                success: true,
                method: Some(extraction.method.as_str()),
                text: &extraction.text,
                error: None,
            },
            Err(err) => Self {
                success: false,
                method: None,
                text: "",
                error: Some(err.reason()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub success: bool,
    pub method: &'static str,
    pub summary: &'a str,
}

pub fn print_extraction_success(
    w: &mut dyn Write,
    file_name: &str,
    extraction: &Extraction,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "Extracted {} characters from {} via {}",
        extraction.char_count(),
        file_name,
        extraction.method
    );
    if color.enabled() {
        writeln!(w, "{}", line.green())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Plain-language failure report. The wording deliberately separates "the
/// file itself is unreadable" from "every strategy came up empty" so a
/// dispatcher knows whether retrying with a different copy makes sense.
pub fn print_extraction_failure(
    w: &mut dyn Write,
    err: &ExtractError,
    color: ColorMode,
) -> std::io::Result<()> {
    match err {
        ExtractError::FileNotFound(_) | ExtractError::Unreadable(_) => {
            let line = format!("Could not read the file: {}", err);
            if color.enabled() {
                writeln!(w, "{}", line.red())?;
            } else {
                writeln!(w, "{}", line)?;
            }
        }
        ExtractError::AllMethodsFailed { attempts } => {
            let headline = "No text could be extracted from this document.";
            if color.enabled() {
                writeln!(w, "{}", headline.red())?;
            } else {
                writeln!(w, "{}", headline)?;
            }
            writeln!(
                w,
                "The PDF may be encrypted, a poor-quality scan, or empty. \
                 Try a different copy of the rate confirmation."
            )?;
            for attempt in attempts {
                let detail = match &attempt.outcome {
                    AttemptOutcome::Empty => "no text".to_string(),
                    AttemptOutcome::BelowThreshold => {
                        format!("only {} characters", attempt.chars)
                    }
                    AttemptOutcome::Failed(reason) => reason.clone(),
                };
                let line = format!("  {}: {}", attempt.method, detail);
                if color.enabled() {
                    writeln!(w, "{}", line.dimmed())?;
                } else {
                    writeln!(w, "{}", line)?;
                }
            }
        }
    }
    Ok(())
}

/// Collaborator failures get their own wording: the extraction worked, the
/// remote service did not, and that distinction decides whether to retry.
pub fn print_summarize_failure(
    w: &mut dyn Write,
    err: &SummarizeError,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "The summarization service is unavailable: {}. \
         The document text was extracted fine; try again in a moment.",
        err
    );
    if color.enabled() {
        writeln!(w, "{}", line.red())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    method: &str,
    summary: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let header = format!("Load details from {} (text via {})", file_name, method);
    if color.enabled() {
        writeln!(w, "{}", header.bold())?;
    } else {
        writeln!(w, "{}", header)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratecon_core::ExtractionMethod;

    #[test]
    fn report_shapes_success() {
        let result = Ok(Extraction {
            text: "Load #1".into(),
            method: ExtractionMethod::Ocr,
        });
        let json = serde_json::to_value(ExtractionReport::from_result(&result)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["method"], "ocr");
        assert_eq!(json["text"], "Load #1");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn report_shapes_failure() {
        let result = Err(ExtractError::AllMethodsFailed { attempts: vec![] });
        let json = serde_json::to_value(ExtractionReport::from_result(&result)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "all_methods_failed");
        assert!(json.get("method").is_none());
        assert_eq!(json["text"], "");
    }

    #[test]
    fn failure_wording_distinguishes_unreadable_from_exhausted() {
        let color = ColorMode(false);

        let mut out = Vec::new();
        print_extraction_failure(
            &mut out,
            &ExtractError::Unreadable("permission denied".into()),
            color,
        )
        .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Could not read"));

        let mut out = Vec::new();
        print_extraction_failure(
            &mut out,
            &ExtractError::AllMethodsFailed { attempts: vec![] },
            color,
        )
        .unwrap();
        assert!(
            String::from_utf8(out)
                .unwrap()
                .contains("No text could be extracted")
        );
    }
}
