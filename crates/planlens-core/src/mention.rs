//! The immutable mention table.
//!
//! One row per (municipality, recommendation, sentence) link with similarity
//! scores and a policy-relevance classification. The table is loaded once per
//! analysis session and never mutated; every downstream view borrows rows
//! from it.

use serde::{Deserialize, Serialize};

use crate::TableError;

/// Policy-relevance classification of a sentence.
///
/// Labels come verbatim from the upstream classifier: `Incluida` marks
/// policy content, `Excluida` everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictedClass {
    Incluida,
    Excluida,
}

impl PredictedClass {
    /// Parse a classifier label. Returns `None` for anything unknown.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Incluida" => Some(Self::Incluida),
            "Excluida" => Some(Self::Excluida),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incluida => "Incluida",
            Self::Excluida => "Excluida",
        }
    }
}

/// One row of the mention table.
///
/// Recommendation fields are functionally dependent on
/// `recommendation_code`; paragraph fields on `paragraph_id` within one
/// document; the municipality attributes on `municipality`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub municipality: String,
    pub department: String,

    pub recommendation_code: String,
    pub recommendation_text: String,
    pub recommendation_topic: String,
    pub recommendation_priority: bool,

    pub paragraph_id: i64,
    pub paragraph_text: String,
    pub paragraph_similarity: f64,
    pub page_number: i64,

    pub sentence_id: Option<i64>,
    pub sentence_id_paragraph: Option<i64>,
    pub sentence_text: String,
    pub sentence_similarity: f64,

    pub predicted_class: PredictedClass,
    pub prediction_confidence: f64,

    // Municipality-level static attributes, repeated on every row.
    pub poverty_index: Option<f64>,
    pub pdet_flag: Option<bool>,
    pub conflict_category: Option<String>,
    pub capacity_group: Option<String>,
}

/// The immutable input relation.
#[derive(Debug)]
pub struct MentionTable {
    rows: Vec<Mention>,
}

impl MentionTable {
    /// Build a table, rejecting rows with scores outside [0, 1].
    pub fn new(rows: Vec<Mention>) -> Result<Self, TableError> {
        for (i, row) in rows.iter().enumerate() {
            check_unit_range(i, "sentence_similarity", row.sentence_similarity)?;
            check_unit_range(i, "paragraph_similarity", row.paragraph_similarity)?;
            check_unit_range(i, "prediction_confidence", row.prediction_confidence)?;
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Mention] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn check_unit_range(row: usize, column: &'static str, value: f64) -> Result<(), TableError> {
    // NaN fails the range check as well.
    if !(0.0..=1.0).contains(&value) {
        return Err(TableError::SimilarityOutOfRange { row, column, value });
    }
    Ok(())
}
