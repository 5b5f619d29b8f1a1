//! Data-source layer: Parquet loading and schema validation for the
//! mention table.

mod error;
pub use error::StoreError;

mod loader;
pub use loader::{load_mentions, mentions_from_batches, read_parquet};
