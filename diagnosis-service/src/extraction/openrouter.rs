use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::Prompt;
use rig::prelude::*;
use rig::providers::openrouter;
use tracing::{debug, info};

use super::parse::parse_symptoms;
use super::prompt::{EXTRACTOR_PREAMBLE, build_prompt};
use super::{ExtractionError, SymptomExtractor};

/// Extractor backed by a hosted model through OpenRouter.
pub struct OpenRouterExtractor {
    model: String,
    agent: Agent<openrouter::CompletionModel>,
}

impl OpenRouterExtractor {
    pub fn new(api_key: &str, model: &str) -> Self {
        let client = openrouter::Client::new(api_key);
        let agent = client.agent(model).preamble(EXTRACTOR_PREAMBLE).build();
        Self {
            model: model.to_string(),
            agent,
        }
    }
}

#[async_trait]
impl SymptomExtractor for OpenRouterExtractor {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn extract(
        &self,
        message: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, ExtractionError> {
        info!(model = %self.model, "Sending extraction request to OpenRouter");
        let raw = self
            .agent
            .prompt(build_prompt(message, vocabulary).as_str())
            .await
            .map_err(|e| ExtractionError::Llm(e.to_string()))?;
        debug!(response = %raw, "Received response from OpenRouter");
        Ok(parse_symptoms(&raw))
    }
}
