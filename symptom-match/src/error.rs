use thiserror::Error;

/// Reference data could not produce a usable symptom vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogBuildError {
    #[error("symptom catalog is empty")]
    Empty,

    #[error("symptom name at position {position} is blank")]
    BlankSymptom { position: usize },

    #[error("symptom '{name}' appears at positions {first} and {second}")]
    DuplicateSymptom {
        name: String,
        first: usize,
        second: usize,
    },
}

/// A disease label could not be turned into a profile vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileBuildError {
    #[error("no training records supplied")]
    NoRecords,

    #[error("training record {row} has a blank disease label")]
    BlankLabel { row: usize },

    #[error("record for '{disease}' has {actual} symptom values, catalog has {expected}")]
    DimensionMismatch {
        disease: String,
        expected: usize,
        actual: usize,
    },

    #[error("disease '{disease}' has no training records")]
    EmptyDisease { disease: String },
}

/// Failure while reading a reference table from disk.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file} has no '{column}' column")]
    MissingColumn { file: String, column: String },

    #[error("row {row}, column '{column}': expected 0 or 1, found '{value}'")]
    InvalidPresence {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row} has {actual} cells, header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{category} table has more than one row for '{disease}'")]
    DuplicateAdviceKey { category: String, disease: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogBuildError),

    #[error(transparent)]
    Profile(#[from] ProfileBuildError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

pub type Result<T> = std::result::Result<T, Error>;
