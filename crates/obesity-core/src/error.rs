use thiserror::Error;

use crate::encoding::CategoricalAttribute;

/// Startup validation failure of the encoding table registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("no encoding table registered for {0}")]
    MissingTable(CategoricalAttribute),

    #[error("encoding table for {0} registered twice")]
    DuplicateTable(CategoricalAttribute),

    #[error("encoding table for {attribute} covers {found:?}, expected domain {expected:?}")]
    DomainMismatch {
        attribute: CategoricalAttribute,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("encoding table for {attribute} has codes {codes:?}, expected 0..{}", .codes.len())]
    NonDenseCodes {
        attribute: CategoricalAttribute,
        codes: Vec<i64>,
    },
}

/// A slice handed to the feature vector had the wrong number of slots.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {expected} values, got {actual}")]
pub struct ShapeError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing '{0}' column")]
    MissingColumn(String),

    #[error("null '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        column: String,
        data_type: arrow::datatypes::DataType,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
