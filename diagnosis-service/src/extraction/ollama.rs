use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::parse::parse_symptoms;
use super::prompt::{EXTRACTOR_PREAMBLE, build_prompt};
use super::{ExtractionError, SymptomExtractor};

/// Extractor backed by a local Ollama instance.
pub struct OllamaExtractor {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaExtractor {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system: EXTRACTOR_PREAMBLE,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl SymptomExtractor for OllamaExtractor {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn extract(
        &self,
        message: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, ExtractionError> {
        info!(model = %self.model, "Sending extraction request to Ollama");
        let raw = self.generate(&build_prompt(message, vocabulary)).await?;
        debug!(response = %raw, "Received response from Ollama");
        Ok(parse_symptoms(&raw))
    }
}
