use std::collections::HashMap;

use serde::Serialize;

use crate::error::CatalogBuildError;

/// Ordered symptom vocabulary. A symptom's position is the vector dimension
/// it occupies in every query and profile vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SymptomCatalog {
    symptoms: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl SymptomCatalog {
    /// Build the catalog from the training columns, label column already removed.
    ///
    /// Names are taken verbatim. Repeated names are rejected rather than merged,
    /// since merging would silently shift every later dimension.
    pub fn build<I, S>(columns: I) -> Result<Self, CatalogBuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut symptoms = Vec::new();
        let mut positions = HashMap::new();

        for (position, name) in columns.into_iter().enumerate() {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(CatalogBuildError::BlankSymptom { position });
            }
            if let Some(&first) = positions.get(&name) {
                return Err(CatalogBuildError::DuplicateSymptom {
                    name,
                    first,
                    second: position,
                });
            }
            positions.insert(name.clone(), position);
            symptoms.push(name);
        }

        if symptoms.is_empty() {
            return Err(CatalogBuildError::Empty);
        }

        Ok(Self {
            symptoms,
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Dimension of `symptom`, if it is part of the vocabulary.
    pub fn position(&self, symptom: &str) -> Option<usize> {
        self.positions.get(symptom).copied()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.positions.contains_key(symptom)
    }

    /// Symptom occupying dimension `position`.
    pub fn symptom(&self, position: usize) -> Option<&str> {
        self.symptoms.get(position).map(String::as_str)
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_column_order() {
        let catalog = SymptomCatalog::build(["fever", "cough", "fatigue"]).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.position("fever"), Some(0));
        assert_eq!(catalog.position("fatigue"), Some(2));
        assert_eq!(catalog.symptom(1), Some("cough"));
        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            vec!["fever", "cough", "fatigue"]
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        let columns: Vec<String> = Vec::new();
        assert_eq!(
            SymptomCatalog::build(columns).unwrap_err(),
            CatalogBuildError::Empty
        );
    }

    #[test]
    fn duplicate_names_are_rejected_not_dropped() {
        let err = SymptomCatalog::build(["fever", "cough", "fever"]).unwrap_err();
        assert_eq!(
            err,
            CatalogBuildError::DuplicateSymptom {
                name: "fever".to_string(),
                first: 0,
                second: 2,
            }
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = SymptomCatalog::build(["fever", "  "]).unwrap_err();
        assert_eq!(err, CatalogBuildError::BlankSymptom { position: 1 });
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let catalog = SymptomCatalog::build(["high_fever"]).unwrap();
        assert!(catalog.contains("high_fever"));
        assert!(!catalog.contains("High_Fever"));
        assert_eq!(catalog.position("unknown"), None);
    }

    #[test]
    fn serializes_as_plain_list() {
        let catalog = SymptomCatalog::build(["fever", "cough"]).unwrap();
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json, serde_json::json!(["fever", "cough"]));
    }
}
