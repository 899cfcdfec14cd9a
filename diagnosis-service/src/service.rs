use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use symptom_match::KnowledgeBase;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::ServiceConfig,
    extraction::{SymptomExtractor, create_extractor},
    models::{
        DiseaseDetails, DiseasePrediction, PredictRequest, PredictionResponse, PredictionStatus,
        RankRequest, resolve_top_k,
    },
    pipeline::{Context, Pipeline},
    tasks::context_keys,
    telemetry::correlation_id_middleware,
    workflow::{
        build_diagnosis_pipeline, create_message_context, create_symptoms_context, rank_task_id,
    },
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, disease: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "disease": disease
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub knowledge: Arc<KnowledgeBase>,
    pub pipeline: Arc<Pipeline>,
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        extractor: Arc<dyn SymptomExtractor>,
        config: &ServiceConfig,
    ) -> Self {
        let pipeline = build_diagnosis_pipeline(knowledge.clone(), extractor, config);
        Self {
            knowledge,
            pipeline: Arc::new(pipeline),
            default_top_k: config.top_k,
        }
    }
}

/// Load the reference data, build the extractor and wire up the router.
///
/// Any failure here is a startup failure.
pub fn create_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    let knowledge = KnowledgeBase::load(&config.data_dir, &config.load_options)?;
    info!(
        data_dir = %config.data_dir.display(),
        symptoms = knowledge.catalog().len(),
        diseases = knowledge.profiles().len(),
        "Loaded knowledge base"
    );

    let extractor = create_extractor(config)?;
    info!(extractor = extractor.name(), "Symptom extractor ready");

    let state = AppState::new(Arc::new(knowledge), extractor, config);
    Ok(build_router(state))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/symptoms", get(list_symptoms))
        .route("/diseases/{name}", get(disease_details))
        .route("/predict", post(predict))
        .route("/chat", post(predict))
        .route("/rank", post(rank_symptoms))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Symptom Diagnosis Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Extracts symptoms from free text and ranks likely diseases by cosine similarity",
        "endpoints": {
            "POST /predict": "Diagnose from a free-text message",
            "POST /chat": "Alias of /predict",
            "POST /rank": "Rank diseases for a list of symptom names",
            "GET /symptoms": "List the known symptoms",
            "GET /diseases/{name}": "Profile symptoms and advice for one disease",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "symptoms": state.knowledge.catalog().len(),
        "diseases": state.knowledge.profiles().len()
    }))
}

async fn list_symptoms(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.knowledge.catalog().symptoms().to_vec())
}

async fn disease_details(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<DiseaseDetails> {
    let knowledge = &state.knowledge;
    let profile = knowledge
        .profiles()
        .get(&name)
        .ok_or_else(|| not_found_error("Disease not found", &name))?;

    Ok(Json(DiseaseDetails {
        characteristic_symptoms: profile
            .characteristic_symptoms(knowledge.catalog())
            .into_iter()
            .map(str::to_string)
            .collect(),
        advice: knowledge.enrich(&name),
        disease: name,
    }))
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<PredictionResponse> {
    validate_message(&request.message)?;

    let top_k = resolve_top_k(request.top_k, state.default_top_k);
    info!(top_k, "Starting diagnosis from message");

    let context = create_message_context(request.message, top_k)
        .await
        .map_err(|e| internal_error("Failed to prepare diagnosis", &e.to_string()))?;

    run_pipeline(&state, None, context).await
}

async fn rank_symptoms(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> ApiResult<PredictionResponse> {
    let top_k = resolve_top_k(request.top_k, state.default_top_k);
    info!(top_k, symptoms = request.symptoms.len(), "Ranking supplied symptoms");

    let context = create_symptoms_context(request.symptoms, top_k)
        .await
        .map_err(|e| internal_error("Failed to prepare diagnosis", &e.to_string()))?;

    run_pipeline(&state, Some(rank_task_id()), context).await
}

fn validate_message(message: &str) -> Result<(), ApiError> {
    if message.trim().is_empty() {
        return Err(bad_request_error("Message is required"));
    }
    Ok(())
}

async fn run_pipeline(
    state: &AppState,
    start: Option<&str>,
    context: Context,
) -> ApiResult<PredictionResponse> {
    let outcome = match start {
        Some(task_id) => state.pipeline.execute_from(task_id, context.clone()).await,
        None => state.pipeline.execute(context.clone()).await,
    };

    let result = outcome.map_err(|e| {
        error!(error = %e, "Diagnosis pipeline failed");
        internal_error("Diagnosis failed", &e.to_string())
    })?;

    let response = collect_response(&context).await;
    info!(
        status = ?response.status,
        tasks = ?result.executed,
        top = result.response.as_deref().unwrap_or("none"),
        "{}",
        result.status_message.as_deref().unwrap_or("Diagnosis finished")
    );
    Ok(Json(response))
}

async fn collect_response(context: &Context) -> PredictionResponse {
    let extracted_symptoms: Vec<String> = context
        .get(context_keys::EXTRACTED_SYMPTOMS)
        .await
        .unwrap_or_default();
    let recognized_symptoms: Vec<String> = context
        .get(context_keys::RECOGNIZED_SYMPTOMS)
        .await
        .unwrap_or_default();
    let ignored_symptoms: Vec<String> = context
        .get(context_keys::IGNORED_SYMPTOMS)
        .await
        .unwrap_or_default();
    let top_diseases: Vec<DiseasePrediction> = context
        .get(context_keys::PREDICTIONS)
        .await
        .unwrap_or_default();
    let extraction_failed: bool = context
        .get(context_keys::EXTRACTION_FAILED)
        .await
        .unwrap_or(false);

    PredictionResponse {
        status: PredictionStatus::determine(
            extraction_failed,
            recognized_symptoms.len(),
            top_diseases.len(),
        ),
        extracted_symptoms,
        recognized_symptoms,
        ignored_symptoms,
        top_diseases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionError;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use std::time::Duration;
    use symptom_match::{
        AdviceCategory, AdviceRow, AdviceTable, AdviceTables, DiseaseProfileTable,
        SymptomCatalog, TrainingRecord,
    };
    use tower::ServiceExt;

    struct FixedExtractor(Vec<&'static str>);

    #[async_trait]
    impl SymptomExtractor for FixedExtractor {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn extract(
            &self,
            _message: &str,
            _vocabulary: &[String],
        ) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl SymptomExtractor for FailingExtractor {
        fn name(&self) -> &str {
            "failing"
        }

        async fn extract(
            &self,
            _message: &str,
            _vocabulary: &[String],
        ) -> Result<Vec<String>, ExtractionError> {
            Err(ExtractionError::Llm("model unavailable".to_string()))
        }
    }

    struct SlowExtractor;

    #[async_trait]
    impl SymptomExtractor for SlowExtractor {
        fn name(&self) -> &str {
            "slow"
        }

        async fn extract(
            &self,
            _message: &str,
            _vocabulary: &[String],
        ) -> Result<Vec<String>, ExtractionError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(vec!["fever".to_string()])
        }
    }

    fn knowledge() -> Arc<KnowledgeBase> {
        let catalog = SymptomCatalog::build(["fever", "cough", "rash", "itching"]).unwrap();
        let records = vec![
            TrainingRecord::new("Flu", vec![true, true, false, false]),
            TrainingRecord::new("Measles", vec![true, false, true, false]),
            TrainingRecord::new("Fungal infection", vec![false, false, true, true]),
        ];
        let profiles = DiseaseProfileTable::build(&records, &catalog).unwrap();

        let mut advice = AdviceTables::default();
        *advice.table_mut(AdviceCategory::Description) = AdviceTable::new(
            AdviceCategory::Description,
            vec![AdviceRow::new("Flu", ["A viral infection."])],
        );
        *advice.table_mut(AdviceCategory::Precautions) = AdviceTable::new(
            AdviceCategory::Precautions,
            vec![AdviceRow::new("Flu", ["rest", "fluids"])],
        );

        Arc::new(KnowledgeBase::new(catalog, profiles, advice))
    }

    fn app_with(extractor: Arc<dyn SymptomExtractor>) -> Router {
        let config = ServiceConfig {
            extraction_timeout: Duration::from_millis(50),
            enrich_top: 1,
            ..ServiceConfig::default()
        };
        build_router(AppState::new(knowledge(), extractor, &config))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn predict_ranks_and_enriches() {
        let app = app_with(Arc::new(FixedExtractor(vec!["fever", "cough", "headache"])));
        let (status, body) = send(app, post_json("/predict", json!({"message": "hot and coughing"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["extracted_symptoms"], json!(["fever", "cough", "headache"]));
        assert_eq!(body["recognized_symptoms"], json!(["fever", "cough"]));
        assert_eq!(body["ignored_symptoms"], json!(["headache"]));

        let top = body["top_diseases"].as_array().unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0]["disease"], "Flu");
        assert_eq!(top[0]["similarity"], 1.0);
        assert_eq!(top[0]["matched_symptoms"], json!(["fever", "cough"]));
        assert_eq!(top[0]["advice"]["description"], "A viral infection.");
        assert_eq!(top[0]["advice"]["precautions"], json!(["rest", "fluids"]));
        assert!(top[1]["advice"].is_null());
    }

    #[tokio::test]
    async fn chat_is_an_alias_of_predict() {
        let app = app_with(Arc::new(FixedExtractor(vec!["rash", "itching"])));
        let (status, body) = send(app, post_json("/chat", json!({"message": "itchy rash"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["top_diseases"][0]["disease"], "Fungal infection");
    }

    #[tokio::test]
    async fn failed_extraction_degrades_to_empty_result() {
        let app = app_with(Arc::new(FailingExtractor));
        let (status, body) = send(app, post_json("/predict", json!({"message": "unwell"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "extraction_failed");
        assert_eq!(body["extracted_symptoms"], json!([]));
        assert_eq!(body["top_diseases"], json!([]));
    }

    #[tokio::test]
    async fn slow_extraction_times_out() {
        let app = app_with(Arc::new(SlowExtractor));
        let (status, body) = send(app, post_json("/predict", json!({"message": "unwell"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "extraction_failed");
        assert_eq!(body["top_diseases"], json!([]));
    }

    #[tokio::test]
    async fn unknown_only_symptoms_report_no_symptoms() {
        let app = app_with(Arc::new(FixedExtractor(vec!["headache"])));
        let (_, body) = send(app, post_json("/predict", json!({"message": "my head hurts"}))).await;

        assert_eq!(body["status"], "no_symptoms");
        assert_eq!(body["ignored_symptoms"], json!(["headache"]));
        assert_eq!(body["top_diseases"], json!([]));
    }

    #[tokio::test]
    async fn blank_message_is_a_bad_request() {
        let app = app_with(Arc::new(FixedExtractor(vec![])));
        let (status, body) = send(app, post_json("/predict", json!({"message": "   "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn rank_skips_extraction_and_honours_top_k() {
        let app = app_with(Arc::new(FailingExtractor));
        let (status, body) = send(
            app,
            post_json("/rank", json!({"symptoms": ["fever", "rash"], "top_k": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["top_diseases"].as_array().unwrap().len(), 1);
        assert_eq!(body["top_diseases"][0]["disease"], "Measles");
    }

    #[tokio::test]
    async fn non_positive_top_k_returns_no_matches() {
        let app = app_with(Arc::new(FailingExtractor));
        let (_, body) = send(
            app,
            post_json("/rank", json!({"symptoms": ["fever"], "top_k": -2})),
        )
        .await;

        assert_eq!(body["status"], "no_matches");
        assert_eq!(body["recognized_symptoms"], json!(["fever"]));
        assert_eq!(body["top_diseases"], json!([]));
    }

    #[tokio::test]
    async fn symptoms_are_listed_in_catalog_order() {
        let app = app_with(Arc::new(FailingExtractor));
        let (status, body) = send(app, get("/symptoms")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["fever", "cough", "rash", "itching"]));
    }

    #[tokio::test]
    async fn disease_details_and_unknown_disease() {
        let app = app_with(Arc::new(FailingExtractor));
        let (status, body) = send(app.clone(), get("/diseases/Flu")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["characteristic_symptoms"], json!(["fever", "cough"]));
        assert_eq!(body["advice"]["precautions"], json!(["rest", "fluids"]));

        let (status, body) = send(app.clone(), get("/diseases/Fungal%20infection")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["advice"]["description"], "No description available.");

        let (status, body) = send(app, get("/diseases/Scurvy")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["disease"], "Scurvy");
    }

    #[tokio::test]
    async fn health_reports_table_sizes_and_correlation_id() {
        let app = app_with(Arc::new(FailingExtractor));
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(crate::telemetry::CORRELATION_HEADER));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["symptoms"], 4);
        assert_eq!(body["diseases"], 3);
    }
}
