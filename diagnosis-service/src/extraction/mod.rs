//! Symptom extraction: turn a free-text message into candidate symptom labels.
//!
//! The extractor is an external collaborator. It may return labels outside the
//! catalog; the ranker ignores those.

pub mod ollama;
pub mod openrouter;
pub mod parse;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ExtractorKind, ServiceConfig};

pub use ollama::OllamaExtractor;
pub use openrouter::OpenRouterExtractor;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extractor returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error("extraction timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("extractor misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait SymptomExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Labels mentioned in `message`, ideally drawn from `vocabulary`
    async fn extract(
        &self,
        message: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, ExtractionError>;
}

/// Build the extractor selected by the configuration.
pub fn create_extractor(config: &ServiceConfig) -> Result<Arc<dyn SymptomExtractor>, ExtractionError> {
    match config.extractor {
        ExtractorKind::Ollama => Ok(Arc::new(OllamaExtractor::new(
            &config.ollama_base_url,
            &config.ollama_model,
            config.extraction_timeout,
        )?)),
        ExtractorKind::OpenRouter => {
            let api_key = config.openrouter_api_key.as_deref().ok_or_else(|| {
                ExtractionError::Config("OPENROUTER_API_KEY not set".to_string())
            })?;
            Ok(Arc::new(OpenRouterExtractor::new(
                api_key,
                &config.openrouter_model,
            )))
        }
    }
}
