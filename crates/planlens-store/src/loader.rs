//! Parquet loader for the mention table.
//!
//! Reads the precomputed similarity dataset, validates the schema, and
//! materializes the immutable [`MentionTable`]. Schema violations — a
//! missing column, a null in a required column, an unknown classification
//! label, an out-of-range score — are rejected here; the engine assumes
//! well-typed rows.

use std::fs::File;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use planlens_core::{Mention, MentionTable, PredictedClass};
use tracing::info;

use crate::StoreError;

/// Source column names, as exported by the similarity pipeline.
mod col {
    pub const MUNICIPALITY: &str = "mpio";
    pub const DEPARTMENT: &str = "dpto";
    pub const POVERTY_INDEX: &str = "IPM_2018";
    pub const PDET: &str = "PDET";
    pub const CONFLICT: &str = "Cat_IICA";
    pub const CAPACITY: &str = "Grupo_MDM";
    pub const REC_CODE: &str = "recommendation_code";
    pub const REC_TEXT: &str = "recommendation_text";
    pub const REC_TOPIC: &str = "recommendation_topic";
    pub const REC_PRIORITY: &str = "recommendation_priority";
    pub const PARAGRAPH_ID: &str = "paragraph_id";
    pub const PARAGRAPH_TEXT: &str = "paragraph_text";
    pub const PARAGRAPH_SIMILARITY: &str = "paragraph_similarity";
    pub const PAGE_NUMBER: &str = "page_number";
    pub const SENTENCE_ID: &str = "sentence_id";
    pub const SENTENCE_ID_PARAGRAPH: &str = "sentence_id_paragraph";
    pub const SENTENCE_TEXT: &str = "sentence_text";
    pub const SENTENCE_SIMILARITY: &str = "sentence_similarity";
    pub const PREDICTED_CLASS: &str = "predicted_class";
    pub const PREDICTION_CONFIDENCE: &str = "prediction_confidence";
}

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::DataUnavailable(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Load and validate the mention table from a Parquet file.
pub fn load_mentions(path: &Path) -> Result<MentionTable, StoreError> {
    let batches = read_parquet(path)?;
    let rows = mentions_from_batches(&batches)?;
    let table = MentionTable::new(rows)?;
    info!(rows = table.len(), path = %path.display(), "loaded mention table");
    Ok(table)
}

/// Extract typed mention rows from Arrow RecordBatches.
pub fn mentions_from_batches(batches: &[RecordBatch]) -> Result<Vec<Mention>, StoreError> {
    let mut rows = Vec::new();
    let mut offset = 0usize;
    for batch in batches {
        extract_batch(batch, offset, &mut rows)?;
        offset += batch.num_rows();
    }
    Ok(rows)
}

fn extract_batch(
    batch: &RecordBatch,
    offset: usize,
    out: &mut Vec<Mention>,
) -> Result<(), StoreError> {
    let municipality = str_col(batch, col::MUNICIPALITY)?;
    let department = str_col(batch, col::DEPARTMENT)?;
    let poverty_index = float_col(batch, col::POVERTY_INDEX)?;
    let pdet = flag_col(batch, col::PDET)?;
    let conflict = str_col(batch, col::CONFLICT)?;
    let capacity = str_col(batch, col::CAPACITY)?;
    let rec_code = str_col(batch, col::REC_CODE)?;
    let rec_text = str_col(batch, col::REC_TEXT)?;
    let rec_topic = str_col(batch, col::REC_TOPIC)?;
    let rec_priority = flag_col(batch, col::REC_PRIORITY)?;
    let paragraph_id = int_col(batch, col::PARAGRAPH_ID)?;
    let paragraph_text = str_col(batch, col::PARAGRAPH_TEXT)?;
    let paragraph_similarity = float_col(batch, col::PARAGRAPH_SIMILARITY)?;
    let page_number = int_col(batch, col::PAGE_NUMBER)?;
    let sentence_id = int_col(batch, col::SENTENCE_ID)?;
    let sentence_id_paragraph = int_col(batch, col::SENTENCE_ID_PARAGRAPH)?;
    let sentence_text = str_col(batch, col::SENTENCE_TEXT)?;
    let sentence_similarity = float_col(batch, col::SENTENCE_SIMILARITY)?;
    let predicted_class = str_col(batch, col::PREDICTED_CLASS)?;
    let prediction_confidence = float_col(batch, col::PREDICTION_CONFIDENCE)?;

    for row in 0..batch.num_rows() {
        let abs = offset + row;
        let label = require(predicted_class.get(row), abs, col::PREDICTED_CLASS)?;
        let class = PredictedClass::parse(label).ok_or_else(|| StoreError::UnknownClass {
            row: abs,
            label: label.to_string(),
        })?;

        out.push(Mention {
            municipality: require(municipality.get(row), abs, col::MUNICIPALITY)?.to_string(),
            department: require(department.get(row), abs, col::DEPARTMENT)?.to_string(),
            recommendation_code: require(rec_code.get(row), abs, col::REC_CODE)?.to_string(),
            recommendation_text: require(rec_text.get(row), abs, col::REC_TEXT)?.to_string(),
            recommendation_topic: require(rec_topic.get(row), abs, col::REC_TOPIC)?.to_string(),
            recommendation_priority: rec_priority.get(row).unwrap_or(false),
            paragraph_id: require(paragraph_id.get(row), abs, col::PARAGRAPH_ID)?,
            paragraph_text: require(paragraph_text.get(row), abs, col::PARAGRAPH_TEXT)?
                .to_string(),
            paragraph_similarity: require(
                paragraph_similarity.get(row),
                abs,
                col::PARAGRAPH_SIMILARITY,
            )?,
            page_number: require(page_number.get(row), abs, col::PAGE_NUMBER)?,
            sentence_id: sentence_id.get(row),
            sentence_id_paragraph: sentence_id_paragraph.get(row),
            sentence_text: require(sentence_text.get(row), abs, col::SENTENCE_TEXT)?.to_string(),
            sentence_similarity: require(
                sentence_similarity.get(row),
                abs,
                col::SENTENCE_SIMILARITY,
            )?,
            predicted_class: class,
            prediction_confidence: require(
                prediction_confidence.get(row),
                abs,
                col::PREDICTION_CONFIDENCE,
            )?,
            poverty_index: poverty_index.get(row).filter(|v| !v.is_nan()),
            pdet_flag: pdet.get(row),
            conflict_category: conflict.get(row).map(str::to_string),
            capacity_group: capacity.get(row).map(str::to_string),
        });
    }
    Ok(())
}

fn require<T>(value: Option<T>, row: usize, column: &str) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::NullValue {
        row,
        column: column.to_string(),
    })
}

// ── Typed column accessors ──
//
// Pandas exports vary in physical encoding: strings arrive as Utf8 or
// LargeUtf8, numbers as 32- or 64-bit, and 0/1 flags as integers, floats,
// or booleans. Each accessor tolerates the encodings seen in the wild and
// rejects everything else at bind time.

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::MissingColumn(name.to_string()))
}

#[derive(Clone, Copy)]
enum StrCol<'a> {
    Utf8(&'a StringArray),
    LargeUtf8(&'a LargeStringArray),
}

impl<'a> StrCol<'a> {
    fn get(self, row: usize) -> Option<&'a str> {
        match self {
            Self::Utf8(a) => (!a.is_null(row)).then(|| a.value(row)),
            Self::LargeUtf8(a) => (!a.is_null(row)).then(|| a.value(row)),
        }
    }
}

fn str_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<StrCol<'a>, StoreError> {
    let array = column(batch, name)?;
    if let Some(a) = array.as_any().downcast_ref::<StringArray>() {
        return Ok(StrCol::Utf8(a));
    }
    if let Some(a) = array.as_any().downcast_ref::<LargeStringArray>() {
        return Ok(StrCol::LargeUtf8(a));
    }
    Err(StoreError::ColumnType {
        column: name.to_string(),
        expected: "Utf8",
    })
}

#[derive(Clone, Copy)]
enum FloatCol<'a> {
    F64(&'a Float64Array),
    F32(&'a Float32Array),
}

impl FloatCol<'_> {
    fn get(self, row: usize) -> Option<f64> {
        match self {
            Self::F64(a) => (!a.is_null(row)).then(|| a.value(row)),
            Self::F32(a) => (!a.is_null(row)).then(|| f64::from(a.value(row))),
        }
    }
}

fn float_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<FloatCol<'a>, StoreError> {
    let array = column(batch, name)?;
    if let Some(a) = array.as_any().downcast_ref::<Float64Array>() {
        return Ok(FloatCol::F64(a));
    }
    if let Some(a) = array.as_any().downcast_ref::<Float32Array>() {
        return Ok(FloatCol::F32(a));
    }
    Err(StoreError::ColumnType {
        column: name.to_string(),
        expected: "Float64",
    })
}

#[derive(Clone, Copy)]
enum IntCol<'a> {
    I64(&'a Int64Array),
    I32(&'a Int32Array),
}

impl IntCol<'_> {
    fn get(self, row: usize) -> Option<i64> {
        match self {
            Self::I64(a) => (!a.is_null(row)).then(|| a.value(row)),
            Self::I32(a) => (!a.is_null(row)).then(|| i64::from(a.value(row))),
        }
    }
}

fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<IntCol<'a>, StoreError> {
    let array = column(batch, name)?;
    if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
        return Ok(IntCol::I64(a));
    }
    if let Some(a) = array.as_any().downcast_ref::<Int32Array>() {
        return Ok(IntCol::I32(a));
    }
    Err(StoreError::ColumnType {
        column: name.to_string(),
        expected: "Int64",
    })
}

#[derive(Clone, Copy)]
enum FlagCol<'a> {
    Bool(&'a BooleanArray),
    Int(IntCol<'a>),
    Float(FloatCol<'a>),
}

impl FlagCol<'_> {
    fn get(self, row: usize) -> Option<bool> {
        match self {
            Self::Bool(a) => (!a.is_null(row)).then(|| a.value(row)),
            Self::Int(a) => a.get(row).map(|v| v != 0),
            Self::Float(a) => a.get(row).filter(|v| !v.is_nan()).map(|v| v != 0.0),
        }
    }
}

fn flag_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<FlagCol<'a>, StoreError> {
    let array = column(batch, name)?;
    if let Some(a) = array.as_any().downcast_ref::<BooleanArray>() {
        return Ok(FlagCol::Bool(a));
    }
    if let Ok(ints) = int_col(batch, name) {
        return Ok(FlagCol::Int(ints));
    }
    if let Ok(floats) = float_col(batch, name) {
        return Ok(FlagCol::Float(floats));
    }
    Err(StoreError::ColumnType {
        column: name.to_string(),
        expected: "Boolean, Int64, or Float64",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use planlens_core::TableError;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Three rows: two Dabeiba sentences in one paragraph, one Anorí
    /// sentence elsewhere.
    fn sample_batch(class_label: &str, first_similarity: f64) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new(col::MUNICIPALITY, DataType::Utf8, false),
            Field::new(col::DEPARTMENT, DataType::Utf8, false),
            Field::new(col::POVERTY_INDEX, DataType::Float64, true),
            Field::new(col::PDET, DataType::Float64, true),
            Field::new(col::CONFLICT, DataType::Utf8, true),
            Field::new(col::CAPACITY, DataType::Utf8, true),
            Field::new(col::REC_CODE, DataType::Utf8, false),
            Field::new(col::REC_TEXT, DataType::Utf8, false),
            Field::new(col::REC_TOPIC, DataType::Utf8, false),
            Field::new(col::REC_PRIORITY, DataType::Int64, true),
            Field::new(col::PARAGRAPH_ID, DataType::Int64, false),
            Field::new(col::PARAGRAPH_TEXT, DataType::Utf8, false),
            Field::new(col::PARAGRAPH_SIMILARITY, DataType::Float64, false),
            Field::new(col::PAGE_NUMBER, DataType::Int64, false),
            Field::new(col::SENTENCE_ID, DataType::Int64, true),
            Field::new(col::SENTENCE_ID_PARAGRAPH, DataType::Int64, true),
            Field::new(col::SENTENCE_TEXT, DataType::Utf8, false),
            Field::new(col::SENTENCE_SIMILARITY, DataType::Float64, false),
            Field::new(col::PREDICTED_CLASS, DataType::Utf8, false),
            Field::new(col::PREDICTION_CONFIDENCE, DataType::Float64, false),
        ]);

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["Dabeiba", "Dabeiba", "Anorí"])),
                Arc::new(StringArray::from(vec![
                    "Antioquia",
                    "Antioquia",
                    "Antioquia",
                ])),
                Arc::new(Float64Array::from(vec![Some(48.7), Some(48.7), None])),
                Arc::new(Float64Array::from(vec![Some(1.0), Some(1.0), None])),
                Arc::new(StringArray::from(vec![Some("Alto"), Some("Alto"), None])),
                Arc::new(StringArray::from(vec![Some("G2"), Some("G2"), None])),
                Arc::new(StringArray::from(vec!["R01", "R01", "R02"])),
                Arc::new(StringArray::from(vec![
                    "Fortalecer la asistencia técnica agropecuaria",
                    "Fortalecer la asistencia técnica agropecuaria",
                    "Ampliar la cobertura educativa rural",
                ])),
                Arc::new(StringArray::from(vec![
                    "Desarrollo rural",
                    "Desarrollo rural",
                    "Educación",
                ])),
                Arc::new(Int64Array::from(vec![Some(1), Some(1), Some(0)])),
                Arc::new(Int64Array::from(vec![11, 11, 42])),
                Arc::new(StringArray::from(vec![
                    "Párrafo sobre asistencia técnica",
                    "Párrafo sobre asistencia técnica",
                    "Párrafo sobre educación",
                ])),
                Arc::new(Float64Array::from(vec![0.55, 0.55, 0.40])),
                Arc::new(Int64Array::from(vec![23, 23, 80])),
                Arc::new(Int64Array::from(vec![Some(101), Some(102), None])),
                Arc::new(Int64Array::from(vec![Some(1), Some(2), None])),
                Arc::new(StringArray::from(vec![
                    "Se fortalecerá la asistencia técnica",
                    "Con énfasis en pequeños productores",
                    "Se ampliará la cobertura educativa",
                ])),
                Arc::new(Float64Array::from(vec![first_similarity, 0.64, 0.71])),
                Arc::new(StringArray::from(vec![class_label, "Incluida", "Incluida"])),
                Arc::new(Float64Array::from(vec![0.91, 0.88, 0.93])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn extracts_typed_rows() {
        let rows = mentions_from_batches(&[sample_batch("Incluida", 0.82)]).unwrap();
        assert_eq!(rows.len(), 3);

        let first = &rows[0];
        assert_eq!(first.municipality, "Dabeiba");
        assert_eq!(first.recommendation_code, "R01");
        assert!(first.recommendation_priority);
        assert_eq!(first.paragraph_id, 11);
        assert_eq!(first.page_number, 23);
        assert_eq!(first.sentence_id, Some(101));
        assert!((first.sentence_similarity - 0.82).abs() < 1e-9);
        assert_eq!(first.predicted_class, PredictedClass::Incluida);
        assert_eq!(first.poverty_index, Some(48.7));
        assert_eq!(first.pdet_flag, Some(true));
        assert_eq!(first.conflict_category.as_deref(), Some("Alto"));

        let last = &rows[2];
        assert!(!last.recommendation_priority);
        assert_eq!(last.sentence_id, None);
        assert_eq!(last.poverty_index, None);
        assert_eq!(last.pdet_flag, None);
        assert_eq!(last.capacity_group, None);
    }

    #[test]
    fn parquet_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mentions.parquet");
        let batch = sample_batch("Incluida", 0.82);

        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_mentions(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[2].municipality, "Anorí");
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let result = load_mentions(Path::new("/nonexistent/mentions.parquet"));
        assert!(matches!(result, Err(StoreError::DataUnavailable(_))));
    }

    #[test]
    fn missing_column_is_rejected() {
        let batch = sample_batch("Incluida", 0.82);
        let schema = batch.schema();
        let keep: Vec<usize> = (0..schema.fields().len())
            .filter(|&i| schema.field(i).name() != col::SENTENCE_SIMILARITY)
            .collect();
        let truncated = batch.project(&keep).unwrap();

        let result = mentions_from_batches(&[truncated]);
        assert!(matches!(
            result,
            Err(StoreError::MissingColumn(name)) if name == col::SENTENCE_SIMILARITY
        ));
    }

    #[test]
    fn unknown_class_label_is_rejected() {
        let result = mentions_from_batches(&[sample_batch("Dudosa", 0.82)]);
        assert!(matches!(
            result,
            Err(StoreError::UnknownClass { row: 0, label }) if label == "Dudosa"
        ));
    }

    #[test]
    fn out_of_range_similarity_is_rejected_at_load() {
        let rows = mentions_from_batches(&[sample_batch("Incluida", 1.4)]).unwrap();
        let result = MentionTable::new(rows);
        assert!(matches!(
            result,
            Err(TableError::SimilarityOutOfRange { row: 0, .. })
        ));
    }

    #[test]
    fn empty_batches_load_an_empty_table() {
        let rows = mentions_from_batches(&[]).unwrap();
        assert!(rows.is_empty());
    }
}
