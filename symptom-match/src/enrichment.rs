use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReferenceError;

pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceCategory {
    Precautions,
    Diet,
    Medications,
    Workout,
    Description,
}

impl AdviceCategory {
    pub const ALL: [AdviceCategory; 5] = [
        AdviceCategory::Precautions,
        AdviceCategory::Diet,
        AdviceCategory::Medications,
        AdviceCategory::Workout,
        AdviceCategory::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceCategory::Precautions => "precautions",
            AdviceCategory::Diet => "diet",
            AdviceCategory::Medications => "medications",
            AdviceCategory::Workout => "workout",
            AdviceCategory::Description => "description",
        }
    }
}

impl fmt::Display for AdviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of an advice table.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRow {
    pub disease: String,
    pub items: Vec<String>,
}

impl AdviceRow {
    pub fn new<I, S>(disease: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            disease: disease.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Advice rows for one category in file order. Disease names may repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceTable {
    category: AdviceCategory,
    rows: Vec<AdviceRow>,
}

impl AdviceTable {
    pub fn new(category: AdviceCategory, rows: Vec<AdviceRow>) -> Self {
        Self { category, rows }
    }

    pub fn empty(category: AdviceCategory) -> Self {
        Self::new(category, Vec::new())
    }

    pub fn category(&self) -> AdviceCategory {
        self.category
    }

    pub fn rows(&self) -> &[AdviceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row keyed by exactly `disease`. Later rows for the same disease
    /// are never consulted.
    pub fn first_match(&self, disease: &str) -> Option<&AdviceRow> {
        self.rows.iter().find(|row| row.disease == disease)
    }

    /// Fails on the first disease that has more than one row.
    pub fn ensure_unique_keys(&self) -> Result<(), ReferenceError> {
        let mut seen = HashSet::new();
        for row in &self.rows {
            if !seen.insert(row.disease.as_str()) {
                return Err(ReferenceError::DuplicateAdviceKey {
                    category: self.category.to_string(),
                    disease: row.disease.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The five advice tables consulted for every ranked disease.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceTables {
    pub precautions: AdviceTable,
    pub diet: AdviceTable,
    pub medications: AdviceTable,
    pub workout: AdviceTable,
    pub description: AdviceTable,
}

impl Default for AdviceTables {
    fn default() -> Self {
        Self {
            precautions: AdviceTable::empty(AdviceCategory::Precautions),
            diet: AdviceTable::empty(AdviceCategory::Diet),
            medications: AdviceTable::empty(AdviceCategory::Medications),
            workout: AdviceTable::empty(AdviceCategory::Workout),
            description: AdviceTable::empty(AdviceCategory::Description),
        }
    }
}

impl AdviceTables {
    pub fn table(&self, category: AdviceCategory) -> &AdviceTable {
        match category {
            AdviceCategory::Precautions => &self.precautions,
            AdviceCategory::Diet => &self.diet,
            AdviceCategory::Medications => &self.medications,
            AdviceCategory::Workout => &self.workout,
            AdviceCategory::Description => &self.description,
        }
    }

    pub fn table_mut(&mut self, category: AdviceCategory) -> &mut AdviceTable {
        match category {
            AdviceCategory::Precautions => &mut self.precautions,
            AdviceCategory::Diet => &mut self.diet,
            AdviceCategory::Medications => &mut self.medications,
            AdviceCategory::Workout => &mut self.workout,
            AdviceCategory::Description => &mut self.description,
        }
    }

    fn items(&self, category: AdviceCategory, disease: &str) -> Vec<String> {
        self.table(category)
            .first_match(disease)
            .map(|row| row.items.clone())
            .unwrap_or_default()
    }

    /// Advice for `disease`. Every field is always populated.
    pub fn enrich(&self, disease: &str) -> AdviceBundle {
        let description = self
            .items(AdviceCategory::Description, disease)
            .into_iter()
            .next()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        AdviceBundle {
            description,
            precautions: self.items(AdviceCategory::Precautions, disease),
            diet: self.items(AdviceCategory::Diet, disease),
            medications: self.items(AdviceCategory::Medications, disease),
            workout: self.items(AdviceCategory::Workout, disease),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceBundle {
    pub description: String,
    pub precautions: Vec<String>,
    pub diet: Vec<String>,
    pub medications: Vec<String>,
    pub workout: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> AdviceTables {
        let mut tables = AdviceTables::default();
        tables.precautions = AdviceTable::new(
            AdviceCategory::Precautions,
            vec![
                AdviceRow::new("Flu", ["rest", "drink fluids"]),
                AdviceRow::new("Flu", ["this row is shadowed"]),
            ],
        );
        tables.diet = AdviceTable::new(
            AdviceCategory::Diet,
            vec![AdviceRow::new("Flu", ["soup", "citrus"])],
        );
        tables.description = AdviceTable::new(
            AdviceCategory::Description,
            vec![AdviceRow::new("Flu", ["A viral infection."])],
        );
        tables
    }

    #[test]
    fn first_matching_row_wins() {
        let bundle = tables().enrich("Flu");
        assert_eq!(bundle.precautions, vec!["rest", "drink fluids"]);
        assert_eq!(bundle.diet, vec!["soup", "citrus"]);
        assert_eq!(bundle.description, "A viral infection.");
    }

    #[test]
    fn absent_categories_are_empty_not_missing() {
        let bundle = tables().enrich("Flu");
        assert!(bundle.medications.is_empty());
        assert!(bundle.workout.is_empty());

        let json = serde_json::to_value(&bundle).unwrap();
        for category in AdviceCategory::ALL {
            assert!(json.get(category.as_str()).is_some(), "{category} missing");
        }
    }

    #[test]
    fn unknown_disease_gets_placeholders() {
        let bundle = tables().enrich("Gout");
        assert!(bundle.precautions.is_empty());
        assert!(bundle.diet.is_empty());
        assert_eq!(bundle.description, NO_DESCRIPTION);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let bundle = tables().enrich("flu");
        assert!(bundle.precautions.is_empty());
    }

    #[test]
    fn unique_key_check_reports_repeated_disease() {
        let tables = tables();
        assert!(tables.diet.ensure_unique_keys().is_ok());

        let err = tables.precautions.ensure_unique_keys().unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::DuplicateAdviceKey { ref category, ref disease }
                if category == "precautions" && disease == "Flu"
        ));
    }
}
