use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use symptom_match::KnowledgeBase;
use tracing::{info, warn};

use super::types::context_keys;
use crate::extraction::{ExtractionError, SymptomExtractor};
use crate::pipeline::{Context, NextAction, Result, Task, TaskResult};

/// Task to pull symptom labels out of the user's message.
///
/// One attempt, bounded by a timeout. A failed or slow extractor yields an
/// empty symptom list and sets the `extraction_failed` flag.
pub struct ExtractSymptomsTask {
    extractor: Arc<dyn SymptomExtractor>,
    knowledge: Arc<KnowledgeBase>,
    timeout: Duration,
}

impl ExtractSymptomsTask {
    pub fn new(
        extractor: Arc<dyn SymptomExtractor>,
        knowledge: Arc<KnowledgeBase>,
        timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            knowledge,
            timeout,
        }
    }

    async fn extract(&self, message: &str) -> std::result::Result<Vec<String>, ExtractionError> {
        let vocabulary = self.knowledge.catalog().symptoms();
        match tokio::time::timeout(self.timeout, self.extractor.extract(message, vocabulary)).await
        {
            Ok(result) => result,
            Err(_) => Err(ExtractionError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl Task for ExtractSymptomsTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!(extractor = self.extractor.name(), "Starting symptom extraction");
        let message: String = context.require(context_keys::MESSAGE).await?;

        let (symptoms, failed) = match self.extract(&message).await {
            Ok(symptoms) => {
                info!(?symptoms, "Extracted symptoms");
                (symptoms, false)
            }
            Err(e) => {
                warn!(error = %e, "Symptom extraction failed, continuing with no symptoms");
                (Vec::new(), true)
            }
        };

        context
            .set(context_keys::EXTRACTED_SYMPTOMS, symptoms)
            .await?;
        context.set(context_keys::EXTRACTION_FAILED, failed).await?;

        Ok(TaskResult::new(None, NextAction::Continue))
    }
}
