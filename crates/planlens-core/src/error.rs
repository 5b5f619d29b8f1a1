use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("row {row}: {column} = {value} outside [0, 1]")]
    SimilarityOutOfRange {
        row: usize,
        column: &'static str,
        value: f64,
    },
}
