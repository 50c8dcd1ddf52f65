use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{SummarizeError, Summarizer};
use crate::normalize::truncate_chars;

pub const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// Character budget for document text embedded in the prompt. Roughly the
/// model's usable context after the instruction block; longer documents
/// are truncated, which is acceptable because rate confirmations put the
/// load details on the first pages.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 18_000;

const PROMPT_HEADER: &str = "Analyze this trucking rate confirmation and extract load information. \
Format the response clearly and professionally.

Extract these details:

LOAD DETAILS:
- Load Number / Reference #
- Broker Company Name
- Broker Contact (Phone & Email)
- Total Rate/Payment ($)
- Commodity / Freight Type
- Weight (lbs)
- Equipment Type (Dry Van/Reefer/Flatbed/etc)

PICKUP INFORMATION:
- Date & Time (appointment or window)
- Full Address (Street, City, State, ZIP)
- Company Name
- Contact Person & Phone Number
- Special pickup instructions

DELIVERY INFORMATION:
- Date & Time (appointment or window)
- Full Address (Street, City, State, ZIP)
- Company Name
- Contact Person & Phone Number
- Special delivery instructions

ADDITIONAL RATES:
- Detention rate (if any)
- Layover rate (if any)
- Lumper fee coverage
- TONU (Truck Ordered Not Used) rate

SPECIAL INSTRUCTIONS:
- Any temperature requirements
- Appointment needed?
- Driver check-in procedures
- Load securement requirements
- Any other important notes

If any information is not found in the document, write \"Not specified\" for that field.

Rate Confirmation Document:
";

/// Summarizer backed by the Mistral chat-completions API.
pub struct MistralSummarizer {
    api_key: String,
    model: String,
    max_input_chars: usize,
}

impl MistralSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    fn build_prompt(&self, text: &str) -> String {
        let mut prompt = String::with_capacity(PROMPT_HEADER.len() + self.max_input_chars);
        prompt.push_str(PROMPT_HEADER);
        prompt.push_str(truncate_chars(text, self.max_input_chars));
        prompt
    }
}

impl std::fmt::Debug for MistralSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralSummarizer")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl Summarizer for MistralSummarizer {
    fn name(&self) -> &str {
        "Mistral"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>> {
        Box::pin(async move {
            let body = serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "user", "content": self.build_prompt(text) }
                ],
                // Low temperature for factual field extraction.
                "temperature": 0.2,
                "max_tokens": 2500,
            });

            tracing::debug!(model = %self.model, "sending summarization request");

            let resp = client
                .post(MISTRAL_API_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        SummarizeError::Timeout
                    } else {
                        SummarizeError::Http(e)
                    }
                })?;

            let status = resp.status();
            if status.as_u16() == 429 {
                return Err(SummarizeError::RateLimited);
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                let body = truncate_chars(&body, 200).to_string();
                return Err(SummarizeError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            let data: serde_json::Value = resp.json().await.map_err(SummarizeError::Http)?;
            let content = data["choices"][0]["message"]["content"]
                .as_str()
                .ok_or(SummarizeError::MissingContent)?;

            tracing::debug!(chars = content.len(), "summarization response received");
            Ok(content.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_document_text() {
        let s = MistralSummarizer::new("key");
        let prompt = s.build_prompt("Load #998877 rate $2,450");
        assert!(prompt.contains("Rate Confirmation Document:"));
        assert!(prompt.ends_with("Load #998877 rate $2,450"));
        assert!(prompt.contains("Not specified"));
    }

    #[test]
    fn prompt_truncates_to_input_budget() {
        let s = MistralSummarizer::new("key").with_max_input_chars(100);
        let text = "z".repeat(5_000);
        let prompt = s.build_prompt(&text);
        assert_eq!(prompt.len(), PROMPT_HEADER.len() + 100);
    }

    #[test]
    fn debug_redacts_api_key() {
        let s = MistralSummarizer::new("secret-key");
        assert!(!format!("{:?}", s).contains("secret-key"));
    }
}
