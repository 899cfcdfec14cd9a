use std::sync::Arc;

use async_trait::async_trait;
use symptom_match::{KnowledgeBase, RankedMatch};
use tracing::info;

use super::types::context_keys;
use crate::models::DiseasePrediction;
use crate::pipeline::{Context, NextAction, Result, Task, TaskResult};

/// Task to attach advice to the leading ranked diseases
pub struct EnrichMatchesTask {
    knowledge: Arc<KnowledgeBase>,
    enrich_top: usize,
}

impl EnrichMatchesTask {
    pub fn new(knowledge: Arc<KnowledgeBase>, enrich_top: usize) -> Self {
        Self {
            knowledge,
            enrich_top,
        }
    }

    fn predict(&self, position: usize, ranked: RankedMatch) -> DiseasePrediction {
        let advice = (position < self.enrich_top).then(|| self.knowledge.enrich(&ranked.disease));
        DiseasePrediction {
            disease: ranked.disease,
            similarity: ranked.score,
            matched_symptoms: ranked.matched_symptoms,
            advice,
        }
    }
}

#[async_trait]
impl Task for EnrichMatchesTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let ranked: Vec<RankedMatch> = context.require(context_keys::RANKED_MATCHES).await?;

        let predictions: Vec<DiseasePrediction> = ranked
            .into_iter()
            .enumerate()
            .map(|(position, m)| self.predict(position, m))
            .collect();

        info!(
            predictions = predictions.len(),
            enriched = predictions.len().min(self.enrich_top),
            "Enriched ranked diseases"
        );

        let top = predictions.first().map(|p| p.disease.clone());
        context.set(context_keys::PREDICTIONS, predictions).await?;

        Ok(TaskResult::new_with_status(
            top,
            NextAction::End,
            Some("Diagnosis completed".to_string()),
        ))
    }
}
