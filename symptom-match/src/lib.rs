pub mod catalog;
pub mod enrichment;
pub mod error;
pub mod knowledge;
pub mod profile;
pub mod ranker;
pub mod reference;

// Re-export commonly used types
pub use catalog::SymptomCatalog;
pub use enrichment::{AdviceBundle, AdviceCategory, AdviceRow, AdviceTable, AdviceTables};
pub use error::{CatalogBuildError, Error, ProfileBuildError, ReferenceError, Result};
pub use knowledge::KnowledgeBase;
pub use profile::{DiseaseProfile, DiseaseProfileTable, TrainingRecord};
pub use ranker::{QueryVector, RankedMatch, cosine_similarity, rank};
pub use reference::{DuplicateColumns, LoadOptions};
