// src/review/reviewer.rs
// Gemini-backed code reviewer. Degrades to a mock suggestion when no API
// key is configured and to a synthetic error suggestion on API failure.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::normalizer::normalize_review;
use super::types::{SEVERITY_LEVELS, Suggestion};
use crate::config::GeminiConfig;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Review a code snippet and return suggestions.
///
/// Implementations must never surface an error: external failures are
/// folded into a synthetic suggestion so an analysis always has a visible
/// result.
#[async_trait]
pub trait CodeReviewer: Send + Sync {
    async fn review(&self, code_snippet: &str) -> Vec<Suggestion>;
}

pub struct GeminiReviewer {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiReviewer {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Whether a real API key is configured (mock mode otherwise).
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Prompt engineering: demand a bare JSON array in a fixed schema, with
    /// at least one element even when there is nothing to report.
    fn build_prompt(code_snippet: &str) -> String {
        format!(
            r#"Analyse the following code snippet for bugs, style issues, and performance bottlenecks.
Respond ONLY with JSON (no prose). Always return AT LEAST ONE array element. If there are no issues, return a single element with a helpful summary comment.
Use one of these lowercase severity levels exactly when you assign severity: {severities}.
JSON array elements must use this exact schema:
[
  {{
    "file_path": "<string>",
    "line_number": <integer>,
    "comment": "<string>",
    "severity": "info" | "low" | "medium" | "high" | "critical" | "suggestion"
  }}
]

Code:
```
{code_snippet}
```

JSON Response:"#,
            severities = SEVERITY_LEVELS
                .iter()
                .map(|s| format!("\"{}\"", s))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Call the Gemini generateContent API and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": 0.2
            }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let json: Value = response.json().await?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("No text in Gemini response"))?;

        Ok(text.to_string())
    }
}

#[async_trait]
impl CodeReviewer for GeminiReviewer {
    async fn review(&self, code_snippet: &str) -> Vec<Suggestion> {
        if !self.is_configured() {
            warn!("GEMINI_API_KEY not set, returning mock review suggestion");
            return vec![Suggestion::plain(
                "example.py",
                1,
                "This is a mock AI suggestion.",
            )];
        }

        let prompt = Self::build_prompt(code_snippet);
        match self.generate(&prompt).await {
            Ok(raw) => {
                debug!("Received {} chars of Gemini review output", raw.len());
                normalize_review(&raw)
            }
            Err(e) => {
                error!("Gemini API call failed: {:#}", e);
                vec![Suggestion::plain(
                    "error.txt",
                    1,
                    format!("Gemini API error: {}", e),
                )]
            }
        }
    }
}
