use std::path::Path;

use tracing::{info, warn};

use crate::catalog::SymptomCatalog;
use crate::enrichment::{AdviceBundle, AdviceCategory, AdviceTable, AdviceTables};
use crate::error::Result;
use crate::profile::DiseaseProfileTable;
use crate::ranker::{QueryVector, RankedMatch, rank_vector};
use crate::reference::{self, LoadOptions, TRAINING_FILE};

/// Immutable reference data shared by every request: the symptom catalog,
/// the per-disease profiles and the advice tables.
///
/// Built once at startup. Nothing mutates it afterwards, so it can be shared
/// behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    catalog: SymptomCatalog,
    profiles: DiseaseProfileTable,
    advice: AdviceTables,
}

impl KnowledgeBase {
    pub fn new(catalog: SymptomCatalog, profiles: DiseaseProfileTable, advice: AdviceTables) -> Self {
        Self {
            catalog,
            profiles,
            advice,
        }
    }

    /// Load every reference table from `dir`.
    ///
    /// The training file is required. Advice files are optional: a missing one
    /// leaves that category empty.
    pub fn load(dir: &Path, options: &LoadOptions) -> Result<Self> {
        let training = reference::load_training(&dir.join(TRAINING_FILE), options)?;
        let catalog = SymptomCatalog::build(training.columns)?;
        let profiles = DiseaseProfileTable::build(&training.records, &catalog)?;

        let mut advice = AdviceTables::default();
        for category in AdviceCategory::ALL {
            let path = dir.join(reference::advice_file(category));
            if !path.exists() {
                warn!(%category, path = %path.display(), "advice table not found, category will be empty");
                continue;
            }
            let table = reference::load_advice(&path, category)?;
            if options.unique_advice_keys {
                table.ensure_unique_keys()?;
            }
            *advice.table_mut(category) = table;
        }

        let knowledge = Self::new(catalog, profiles, advice);
        info!(
            symptoms = knowledge.catalog.len(),
            diseases = knowledge.profiles.len(),
            "knowledge base loaded"
        );
        Ok(knowledge)
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn profiles(&self) -> &DiseaseProfileTable {
        &self.profiles
    }

    pub fn advice(&self) -> &AdviceTables {
        &self.advice
    }

    pub fn advice_table(&self, category: AdviceCategory) -> &AdviceTable {
        self.advice.table(category)
    }

    pub fn contains_disease(&self, disease: &str) -> bool {
        self.profiles.contains(disease)
    }

    pub fn project<S: AsRef<str>>(&self, query: &[S]) -> QueryVector {
        QueryVector::project(&self.catalog, query)
    }

    /// Top `k` diseases for `query`; see [`crate::ranker::rank`].
    pub fn rank<S: AsRef<str>>(&self, query: &[S], k: usize) -> Vec<RankedMatch> {
        self.rank_projected(&self.project(query), k)
    }

    pub fn rank_projected(&self, query: &QueryVector, k: usize) -> Vec<RankedMatch> {
        rank_vector(query, &self.catalog, &self.profiles, k)
    }

    pub fn enrich(&self, disease: &str) -> AdviceBundle {
        self.advice.enrich(disease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::AdviceRow;
    use crate::profile::DiseaseProfile;

    fn knowledge() -> KnowledgeBase {
        let catalog = SymptomCatalog::build(["fever", "cough", "fatigue"]).unwrap();
        let profiles = DiseaseProfileTable::from_profiles(
            [
                DiseaseProfile::new("Flu", vec![1.0, 1.0, 0.0]),
                DiseaseProfile::new("Anemia", vec![0.0, 0.0, 1.0]),
            ],
            &catalog,
        )
        .unwrap();
        let mut advice = AdviceTables::default();
        advice.precautions = AdviceTable::new(
            AdviceCategory::Precautions,
            vec![AdviceRow::new("Flu", ["rest"])],
        );
        KnowledgeBase::new(catalog, profiles, advice)
    }

    #[test]
    fn ranks_and_enriches_through_one_context() {
        let knowledge = knowledge();
        let ranked = knowledge.rank(&["fever", "cough"], 5);

        assert_eq!(ranked[0].disease, "Flu");
        assert_eq!(knowledge.enrich(&ranked[0].disease).precautions, vec!["rest"]);
    }

    #[test]
    fn known_disease_without_advice_gets_empty_precautions() {
        let knowledge = knowledge();
        assert!(knowledge.contains_disease("Anemia"));
        assert!(knowledge.enrich("Anemia").precautions.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let knowledge = std::sync::Arc::new(knowledge());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let knowledge = knowledge.clone();
                std::thread::spawn(move || knowledge.rank(&["fatigue"], 1))
            })
            .collect();

        for handle in handles {
            let ranked = handle.join().unwrap();
            assert_eq!(ranked[0].disease, "Anemia");
        }
    }
}
