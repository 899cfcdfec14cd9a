//! Typed readers for the reference CSV tables.
//!
//! Training data becomes a column list plus [`TrainingRecord`]s, advice files
//! become [`AdviceTable`]s. Validation happens here so the rest of the crate
//! only ever sees well-formed rows.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::enrichment::{AdviceCategory, AdviceRow, AdviceTable};
use crate::error::ReferenceError;
use crate::profile::TrainingRecord;

pub const TRAINING_FILE: &str = "Training.csv";
pub const DEFAULT_LABEL_COLUMN: &str = "prognosis";

/// File name of the advice table for `category`.
pub fn advice_file(category: AdviceCategory) -> &'static str {
    match category {
        AdviceCategory::Precautions => "precautions_df.csv",
        AdviceCategory::Diet => "diets.csv",
        AdviceCategory::Medications => "medications.csv",
        AdviceCategory::Workout => "workout_df.csv",
        AdviceCategory::Description => "description.csv",
    }
}

/// Header prefix identifying the item columns of `category`.
fn item_column_prefix(category: AdviceCategory) -> &'static str {
    match category {
        AdviceCategory::Precautions => "precaution",
        AdviceCategory::Diet => "diet",
        AdviceCategory::Medications => "medication",
        AdviceCategory::Workout => "workout",
        AdviceCategory::Description => "description",
    }
}

/// How repeated symptom headers in the training file are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateColumns {
    /// Pass names through unchanged; the catalog build then rejects them.
    Reject,
    /// Rename later occurrences `name.1`, `name.2`, ...
    #[default]
    Suffix,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub label_column: String,
    pub duplicate_columns: DuplicateColumns,
    /// Fail when an advice table has more than one row for a disease.
    pub unique_advice_keys: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            duplicate_columns: DuplicateColumns::default(),
            unique_advice_keys: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    /// Symptom columns in file order, label column excluded.
    pub columns: Vec<String>,
    pub records: Vec<TrainingRecord>,
}

pub fn load_training(path: &Path, options: &LoadOptions) -> Result<TrainingData, ReferenceError> {
    let file = open(path)?;
    read_training(file, &path.display().to_string(), options)
}

pub fn read_training<R: io::Read>(
    reader: R,
    source: &str,
    options: &LoadOptions,
) -> Result<TrainingData, ReferenceError> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| csv_error(source, e))?
        .clone();

    let label_index = headers
        .iter()
        .position(|h| h == options.label_column)
        .ok_or_else(|| ReferenceError::MissingColumn {
            file: source.to_string(),
            column: options.label_column.clone(),
        })?;

    let symptom_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != label_index && !h.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    let raw_names: Vec<String> = symptom_indices
        .iter()
        .map(|&i| headers[i].to_string())
        .collect();
    let columns = match options.duplicate_columns {
        DuplicateColumns::Reject => raw_names,
        DuplicateColumns::Suffix => suffix_duplicates(raw_names),
    };

    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row.map_err(|e| csv_error(source, e))?;
        let line = index + 1;
        check_width(&row, headers.len(), line)?;

        let presence = symptom_indices
            .iter()
            .map(|&i| parse_presence(&row[i], line, &headers[i]))
            .collect::<Result<Vec<_>, _>>()?;
        records.push(TrainingRecord::new(&row[label_index], presence));
    }

    debug!(
        source,
        symptoms = columns.len(),
        records = records.len(),
        "read training data"
    );
    Ok(TrainingData { columns, records })
}

pub fn load_advice(path: &Path, category: AdviceCategory) -> Result<AdviceTable, ReferenceError> {
    let file = open(path)?;
    read_advice(file, category, &path.display().to_string())
}

pub fn read_advice<R: io::Read>(
    reader: R,
    category: AdviceCategory,
    source: &str,
) -> Result<AdviceTable, ReferenceError> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| csv_error(source, e))?
        .clone();

    let disease_index = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("disease"))
        .ok_or_else(|| ReferenceError::MissingColumn {
            file: source.to_string(),
            column: "Disease".to_string(),
        })?;

    let prefix = item_column_prefix(category);
    let item_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != disease_index && h.trim().to_ascii_lowercase().starts_with(prefix))
        .map(|(i, _)| i)
        .collect();
    if item_indices.is_empty() {
        return Err(ReferenceError::MissingColumn {
            file: source.to_string(),
            column: prefix.to_string(),
        });
    }

    let mut rows = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row.map_err(|e| csv_error(source, e))?;
        check_width(&row, headers.len(), index + 1)?;

        let items = item_indices
            .iter()
            .flat_map(|&i| parse_items(&row[i]))
            .collect::<Vec<_>>();
        rows.push(AdviceRow::new(&row[disease_index], items));
    }

    debug!(source, %category, rows = rows.len(), "read advice table");
    Ok(AdviceTable::new(category, rows))
}

/// Split one advice cell into items.
///
/// Blank cells give nothing, `['a', "b"]` gives each quoted entry, anything
/// else is a single item.
pub fn parse_items(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => parse_list_literal(inner),
        None => vec![trimmed.to_string()],
    }
}

/// Parse the inside of a list literal such as `'a', "b", c`.
///
/// Quotes may be single or double and a backslash escapes the next character.
/// Unquoted entries are trimmed; empty entries are dropped.
pub fn parse_list_literal(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) if c == '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ',' => push_item(&mut items, &mut current),
            None => current.push(c),
        }
    }
    push_item(&mut items, &mut current);
    items
}

fn push_item(items: &mut Vec<String>, current: &mut String) {
    let item = current.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
    current.clear();
}

/// Rename repeated names the way dataframe readers do: `x`, `x.1`, `x.2`.
pub fn suffix_duplicates(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen = HashSet::new();
    let mut renamed = Vec::with_capacity(names.len());

    for name in names {
        if seen.insert(name.clone()) {
            renamed.push(name);
            continue;
        }
        let mut counter = 1;
        let mut candidate = format!("{name}.{counter}");
        while taken.contains(&candidate) {
            counter += 1;
            candidate = format!("{name}.{counter}");
        }
        warn!(column = %name, renamed = %candidate, "renamed repeated symptom column");
        taken.insert(candidate.clone());
        seen.insert(candidate.clone());
        renamed.push(candidate);
    }
    renamed
}

fn parse_presence(cell: &str, row: usize, column: &str) -> Result<bool, ReferenceError> {
    match cell.trim() {
        "0" | "0.0" => Ok(false),
        "1" | "1.0" => Ok(true),
        other => Err(ReferenceError::InvalidPresence {
            row,
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

fn check_width(row: &StringRecord, expected: usize, line: usize) -> Result<(), ReferenceError> {
    if row.len() != expected {
        return Err(ReferenceError::RowWidth {
            row: line,
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

fn open(path: &Path) -> Result<File, ReferenceError> {
    File::open(path).map_err(|source| ReferenceError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn csv_error(source: &str, error: csv::Error) -> ReferenceError {
    ReferenceError::Csv {
        path: source.to_string(),
        source: error,
    }
}
