use crate::config::ServiceConfig;
use crate::extraction::SymptomExtractor;
use crate::pipeline::{Context, Pipeline, PipelineBuilder, Result};
use crate::tasks::*;
use std::sync::Arc;
use symptom_match::KnowledgeBase;

pub const DIAGNOSIS_PIPELINE: &str = "diagnosis";

pub fn build_diagnosis_pipeline(
    knowledge: Arc<KnowledgeBase>,
    extractor: Arc<dyn SymptomExtractor>,
    config: &ServiceConfig,
) -> Pipeline {
    PipelineBuilder::new(DIAGNOSIS_PIPELINE)
        .add_task(Arc::new(ExtractSymptomsTask::new(
            extractor,
            knowledge.clone(),
            config.extraction_timeout,
        )))
        .add_task(Arc::new(RankDiseasesTask::new(
            knowledge.clone(),
            config.top_k,
        )))
        .add_task(Arc::new(EnrichMatchesTask::new(knowledge, config.enrich_top)))
        .build()
}

/// Entry point for requests that already carry symptom labels
pub fn rank_task_id() -> &'static str {
    std::any::type_name::<RankDiseasesTask>()
}

/// Context for a free-text diagnosis request
pub async fn create_message_context(message: String, top_k: usize) -> Result<Context> {
    let context = Context::new();
    context.set(context_keys::MESSAGE, message).await?;
    context.set(context_keys::TOP_K, top_k).await?;
    Ok(context)
}

/// Context for a request that skips extraction
pub async fn create_symptoms_context(symptoms: Vec<String>, top_k: usize) -> Result<Context> {
    let context = Context::new();
    context
        .set(context_keys::EXTRACTED_SYMPTOMS, symptoms)
        .await?;
    context.set(context_keys::EXTRACTION_FAILED, false).await?;
    context.set(context_keys::TOP_K, top_k).await?;
    Ok(context)
}
