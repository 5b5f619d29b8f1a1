use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mention table not found: {0}")]
    DataUnavailable(PathBuf),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column {column}: expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("row {row}: null value in required column {column}")]
    NullValue { row: usize, column: String },

    #[error("row {row}: unknown predicted_class label {label:?}")]
    UnknownClass { row: usize, label: String },

    #[error(transparent)]
    Table(#[from] planlens_core::TableError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
