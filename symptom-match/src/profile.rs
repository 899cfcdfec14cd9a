use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::SymptomCatalog;
use crate::error::ProfileBuildError;

/// One labelled row of training data: symptom presence in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub disease: String,
    pub presence: Vec<bool>,
}

impl TrainingRecord {
    pub fn new(disease: impl Into<String>, presence: Vec<bool>) -> Self {
        Self {
            disease: disease.into(),
            presence,
        }
    }
}

/// Mean symptom-presence vector for one disease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseProfile {
    name: String,
    vector: Vec<f64>,
    #[serde(skip)]
    squared_norm: f64,
}

impl DiseaseProfile {
    pub fn new(name: impl Into<String>, vector: Vec<f64>) -> Self {
        let squared_norm = vector.iter().map(|v| v * v).sum();
        Self {
            name: name.into(),
            vector,
            squared_norm,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    pub(crate) fn squared_norm(&self) -> f64 {
        self.squared_norm
    }

    /// Catalog symptoms observed in at least one record of this disease.
    pub fn characteristic_symptoms<'a>(&self, catalog: &'a SymptomCatalog) -> Vec<&'a str> {
        self.vector
            .iter()
            .enumerate()
            .filter(|(_, mean)| **mean > 0.0)
            .filter_map(|(position, _)| catalog.symptom(position))
            .collect()
    }
}

/// All disease profiles, keyed by the verbatim disease label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiseaseProfileTable {
    profiles: BTreeMap<String, DiseaseProfile>,
}

impl DiseaseProfileTable {
    /// Group `records` by label and average each symptom column.
    pub fn build(
        records: &[TrainingRecord],
        catalog: &SymptomCatalog,
    ) -> Result<Self, ProfileBuildError> {
        if records.is_empty() {
            return Err(ProfileBuildError::NoRecords);
        }

        let dimensions = catalog.len();
        let mut sums: BTreeMap<&str, (Vec<u32>, u32)> = BTreeMap::new();

        for (row, record) in records.iter().enumerate() {
            if record.disease.trim().is_empty() {
                return Err(ProfileBuildError::BlankLabel { row });
            }
            if record.presence.len() != dimensions {
                return Err(ProfileBuildError::DimensionMismatch {
                    disease: record.disease.clone(),
                    expected: dimensions,
                    actual: record.presence.len(),
                });
            }

            let (counts, total) = sums
                .entry(record.disease.as_str())
                .or_insert_with(|| (vec![0; dimensions], 0));
            for (count, present) in counts.iter_mut().zip(&record.presence) {
                if *present {
                    *count += 1;
                }
            }
            *total += 1;
        }

        let mut profiles = BTreeMap::new();
        for (disease, (counts, total)) in sums {
            profiles.insert(disease.to_string(), mean_profile(disease, &counts, total)?);
        }

        Ok(Self { profiles })
    }

    /// Assemble a table from precomputed profiles.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = DiseaseProfile>,
        catalog: &SymptomCatalog,
    ) -> Result<Self, ProfileBuildError> {
        let mut table = BTreeMap::new();
        for profile in profiles {
            if profile.vector.len() != catalog.len() {
                return Err(ProfileBuildError::DimensionMismatch {
                    disease: profile.name,
                    expected: catalog.len(),
                    actual: profile.vector.len(),
                });
            }
            table.insert(profile.name.clone(), profile);
        }
        Ok(Self { profiles: table })
    }

    pub fn get(&self, disease: &str) -> Option<&DiseaseProfile> {
        self.profiles.get(disease)
    }

    pub fn contains(&self, disease: &str) -> bool {
        self.profiles.contains_key(disease)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiseaseProfile> {
        self.profiles.values()
    }

    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

fn mean_profile(
    disease: &str,
    counts: &[u32],
    total: u32,
) -> Result<DiseaseProfile, ProfileBuildError> {
    if total == 0 {
        return Err(ProfileBuildError::EmptyDisease {
            disease: disease.to_string(),
        });
    }
    let total = f64::from(total);
    let vector = counts.iter().map(|c| f64::from(*c) / total).collect();
    Ok(DiseaseProfile::new(disease, vector))
}
