//! Cosine-similarity ranking of a symptom query against every disease profile.
//!
//! Ranking is a pure function of the catalog, the profile table and the query.
//! Scores are sorted descending with ties broken by disease name ascending, so
//! repeated calls over the same inputs always return the same list.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SymptomCatalog;
use crate::profile::{DiseaseProfile, DiseaseProfileTable};

/// Binary indicator vector of a query over the catalog dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    values: Vec<f64>,
    recognized: Vec<String>,
    ignored: Vec<String>,
}

impl QueryVector {
    /// Set a 1 at every catalog dimension named in `query`.
    ///
    /// Symptoms outside the catalog are ignored and reported through
    /// [`QueryVector::ignored`]. Repeats count once.
    pub fn project<S: AsRef<str>>(catalog: &SymptomCatalog, query: &[S]) -> Self {
        let mut values = vec![0.0; catalog.len()];
        let mut ignored: Vec<String> = Vec::new();
        let mut seen_ignored = HashSet::new();

        for symptom in query {
            let symptom = symptom.as_ref();
            match catalog.position(symptom) {
                Some(position) => values[position] = 1.0,
                None => {
                    if seen_ignored.insert(symptom) {
                        debug!(symptom, "ignoring symptom outside the catalog");
                        ignored.push(symptom.to_string());
                    }
                }
            }
        }

        let recognized = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .filter_map(|(position, _)| catalog.symptom(position))
            .map(str::to_string)
            .collect();

        Self {
            values,
            recognized,
            ignored,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Recognized symptoms in catalog order.
    pub fn recognized(&self) -> &[String] {
        &self.recognized
    }

    /// Unknown symptoms in query order.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn is_zero(&self) -> bool {
        self.recognized.is_empty()
    }
}

/// A disease and its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub disease: String,
    pub score: f64,
    /// Query symptoms this disease has been observed with, in catalog order.
    pub matched_symptoms: Vec<String>,
}

/// Cosine similarity, defined as 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (dot, a_sq, b_sq) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, a_sq, b_sq), (x, y)| {
            (dot + x * y, a_sq + x * x, b_sq + y * y)
        });
    scaled(dot, a_sq, b_sq)
}

fn scaled(dot: f64, a_sq: f64, b_sq: f64) -> f64 {
    if a_sq == 0.0 || b_sq == 0.0 {
        return 0.0;
    }
    (dot / (a_sq * b_sq).sqrt()).clamp(-1.0, 1.0)
}

/// Order by score descending, then disease name ascending.
pub fn ranking_order(a: &RankedMatch, b: &RankedMatch) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.disease.cmp(&b.disease))
}

/// Rank `profiles` against an already projected query, keeping at most `k`.
pub fn rank_vector(
    query: &QueryVector,
    catalog: &SymptomCatalog,
    profiles: &DiseaseProfileTable,
    k: usize,
) -> Vec<RankedMatch> {
    if k == 0 || query.is_zero() {
        return Vec::new();
    }

    let query_sq: f64 = query.values.iter().map(|v| v * v).sum();
    let mut matches: Vec<RankedMatch> = profiles
        .iter()
        .map(|profile| score_profile(query, query_sq, catalog, profile))
        .collect();

    matches.sort_by(ranking_order);
    matches.truncate(k);
    matches
}

/// Rank every disease profile against `query`, keeping at most `k`.
///
/// An empty query, or one made only of unknown symptoms, yields an empty list.
pub fn rank<S: AsRef<str>>(
    query: &[S],
    catalog: &SymptomCatalog,
    profiles: &DiseaseProfileTable,
    k: usize,
) -> Vec<RankedMatch> {
    let vector = QueryVector::project(catalog, query);
    rank_vector(&vector, catalog, profiles, k)
}

fn score_profile(
    query: &QueryVector,
    query_sq: f64,
    catalog: &SymptomCatalog,
    profile: &DiseaseProfile,
) -> RankedMatch {
    let mut dot = 0.0;
    let mut matched_symptoms = Vec::new();
    for (position, (q, p)) in query.values.iter().zip(profile.vector()).enumerate() {
        dot += q * p;
        if *q > 0.0 && *p > 0.0 {
            if let Some(symptom) = catalog.symptom(position) {
                matched_symptoms.push(symptom.to_string());
            }
        }
    }

    RankedMatch {
        disease: profile.name().to_string(),
        score: scaled(dot, query_sq, profile.squared_norm()),
        matched_symptoms,
    }
}
