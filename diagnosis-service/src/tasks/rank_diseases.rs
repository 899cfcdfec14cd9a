use std::sync::Arc;

use async_trait::async_trait;
use symptom_match::KnowledgeBase;
use tracing::info;

use super::types::context_keys;
use crate::pipeline::{Context, NextAction, Result, Task, TaskResult};

/// Task to score the extracted symptoms against every disease profile
pub struct RankDiseasesTask {
    knowledge: Arc<KnowledgeBase>,
    default_top_k: usize,
}

impl RankDiseasesTask {
    pub fn new(knowledge: Arc<KnowledgeBase>, default_top_k: usize) -> Self {
        Self {
            knowledge,
            default_top_k,
        }
    }
}

#[async_trait]
impl Task for RankDiseasesTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let symptoms: Vec<String> = context
            .require(context_keys::EXTRACTED_SYMPTOMS)
            .await?;
        let top_k: usize = context
            .get(context_keys::TOP_K)
            .await
            .unwrap_or(self.default_top_k);

        let query = self.knowledge.project(&symptoms);
        if !query.ignored().is_empty() {
            info!(ignored = ?query.ignored(), "Dropped symptoms outside the catalog");
        }

        let ranked = self.knowledge.rank_projected(&query, top_k);
        info!(
            recognized = query.recognized().len(),
            matches = ranked.len(),
            top_k,
            "Ranked diseases"
        );

        context
            .set(context_keys::RECOGNIZED_SYMPTOMS, query.recognized())
            .await?;
        context
            .set(context_keys::IGNORED_SYMPTOMS, query.ignored())
            .await?;
        context.set(context_keys::RANKED_MATCHES, ranked).await?;

        Ok(TaskResult::new(None, NextAction::Continue))
    }
}
