/// Context keys shared by the diagnosis tasks
pub mod context_keys {
    pub const MESSAGE: &str = "message";
    pub const TOP_K: &str = "top_k";
    pub const EXTRACTED_SYMPTOMS: &str = "extracted_symptoms";
    pub const EXTRACTION_FAILED: &str = "extraction_failed";
    pub const RECOGNIZED_SYMPTOMS: &str = "recognized_symptoms";
    pub const IGNORED_SYMPTOMS: &str = "ignored_symptoms";
    pub const RANKED_MATCHES: &str = "ranked_matches";
    pub const PREDICTIONS: &str = "predictions";
}
