use serde::{Deserialize, Serialize};
use symptom_match::AdviceBundle;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub message: String,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankRequest {
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Ok,
    NoSymptoms,
    NoMatches,
    ExtractionFailed,
}

impl PredictionStatus {
    pub fn determine(extraction_failed: bool, recognized: usize, predictions: usize) -> Self {
        if extraction_failed {
            PredictionStatus::ExtractionFailed
        } else if recognized == 0 {
            PredictionStatus::NoSymptoms
        } else if predictions == 0 {
            PredictionStatus::NoMatches
        } else {
            PredictionStatus::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePrediction {
    pub disease: String,
    pub similarity: f64,
    pub matched_symptoms: Vec<String>,
    /// Present for the leading matches only
    pub advice: Option<AdviceBundle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub status: PredictionStatus,
    pub extracted_symptoms: Vec<String>,
    pub recognized_symptoms: Vec<String>,
    pub ignored_symptoms: Vec<String>,
    pub top_diseases: Vec<DiseasePrediction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseDetails {
    pub disease: String,
    pub characteristic_symptoms: Vec<String>,
    pub advice: AdviceBundle,
}

/// Requested ranking depth; zero or negative means no results.
pub fn resolve_top_k(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(k) if k <= 0 => 0,
        Some(k) => usize::try_from(k).unwrap_or(usize::MAX),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_precedence() {
        assert_eq!(
            PredictionStatus::determine(true, 3, 3),
            PredictionStatus::ExtractionFailed
        );
        assert_eq!(
            PredictionStatus::determine(false, 0, 0),
            PredictionStatus::NoSymptoms
        );
        assert_eq!(
            PredictionStatus::determine(false, 2, 0),
            PredictionStatus::NoMatches
        );
        assert_eq!(PredictionStatus::determine(false, 2, 1), PredictionStatus::Ok);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(PredictionStatus::ExtractionFailed).unwrap(),
            serde_json::json!("extraction_failed")
        );
    }

    #[test]
    fn top_k_resolution() {
        assert_eq!(resolve_top_k(None, 5), 5);
        assert_eq!(resolve_top_k(Some(2), 5), 2);
        assert_eq!(resolve_top_k(Some(0), 5), 0);
        assert_eq!(resolve_top_k(Some(-4), 5), 0);
    }

    #[test]
    fn top_k_is_optional_in_requests() {
        let request: PredictRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.top_k, None);
    }
}
