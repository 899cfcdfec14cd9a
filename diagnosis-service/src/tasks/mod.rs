pub mod enrich_matches;
pub mod extract_symptoms;
pub mod rank_diseases;
pub mod types;

pub use enrich_matches::EnrichMatchesTask;
pub use extract_symptoms::ExtractSymptomsTask;
pub use rank_diseases::RankDiseasesTask;
pub use types::context_keys;
