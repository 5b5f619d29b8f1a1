//! Shared fixtures for the engine tests.

use crate::{Mention, MentionTable, PredictedClass};

/// Baseline mention row; tests tweak individual fields as needed.
pub fn mention(municipality: &str, code: &str, sentence_similarity: f64) -> Mention {
    Mention {
        municipality: municipality.to_string(),
        department: "Antioquia".to_string(),
        recommendation_code: code.to_string(),
        recommendation_text: format!("Recommendation {code} full text"),
        recommendation_topic: "Desarrollo económico".to_string(),
        recommendation_priority: false,
        paragraph_id: 1,
        paragraph_text: "Paragraph text".to_string(),
        paragraph_similarity: 0.5,
        page_number: 10,
        sentence_id: None,
        sentence_id_paragraph: None,
        sentence_text: format!("A sentence mentioning {code}"),
        sentence_similarity,
        predicted_class: PredictedClass::Incluida,
        prediction_confidence: 0.9,
        poverty_index: None,
        pdet_flag: None,
        conflict_category: None,
        capacity_group: None,
    }
}

pub fn table(rows: Vec<Mention>) -> MentionTable {
    MentionTable::new(rows).unwrap()
}
