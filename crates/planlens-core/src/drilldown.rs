//! Paragraph- and sentence-level drilldown for one selected recommendation.
//!
//! Both views are computed over the qualifying view and stable-sorted by
//! similarity descending, ready for the pagination controller.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::filter::View;
use crate::{Mention, PredictedClass};

/// One paragraph with aggregated sentence metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ParagraphRow {
    pub paragraph_id: i64,
    pub paragraph_text: String,
    /// Constant within a paragraph; carried from the first row.
    pub paragraph_similarity: f64,
    pub page_number: i64,
    pub sentences: usize,
    pub mean_similarity: f64,
    pub max_similarity: f64,
    /// Most frequent class among the paragraph's sentences.
    pub modal_class: PredictedClass,
}

/// One qualifying sentence.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceRow {
    pub sentence_id: Option<i64>,
    pub sentence_id_paragraph: Option<i64>,
    pub sentence_text: String,
    pub page_number: i64,
    pub paragraph_id: i64,
    pub sentence_similarity: f64,
    pub predicted_class: PredictedClass,
}

/// A recommendation available for drilldown.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRef {
    pub code: String,
    pub text: String,
}

/// Recommendations with at least one qualifying mention, in first-encounter
/// order.
pub fn available_recommendations(view: &View<'_>) -> Vec<RecommendationRef> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut refs = Vec::new();
    for m in view.rows() {
        if seen.insert(m.recommendation_code.as_str()) {
            refs.push(RecommendationRef {
                code: m.recommendation_code.clone(),
                text: m.recommendation_text.clone(),
            });
        }
    }
    refs
}

/// Full text of a recommendation, from its first qualifying row.
pub fn recommendation_text<'a>(view: &View<'a>, code: &str) -> Option<&'a str> {
    view.rows()
        .iter()
        .find(|m| m.recommendation_code == code)
        .map(|m| m.recommendation_text.as_str())
}

/// Paragraph-level view: the recommendation's qualifying rows grouped by
/// paragraph, stable-sorted by mean sentence similarity descending.
///
/// Groups form in first-encounter order, so paragraphs with tied means keep
/// their document order.
pub fn paragraph_view(view: &View<'_>, code: &str) -> Vec<ParagraphRow> {
    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<&Mention>> = HashMap::new();
    for m in view.rows().iter().filter(|m| m.recommendation_code == code) {
        if !groups.contains_key(&m.paragraph_id) {
            order.push(m.paragraph_id);
        }
        groups.entry(m.paragraph_id).or_default().push(m);
    }

    let mut rows: Vec<ParagraphRow> = order
        .into_iter()
        .map(|paragraph_id| {
            let members = &groups[&paragraph_id];
            let first = members[0];
            let sum: f64 = members.iter().map(|m| m.sentence_similarity).sum();
            let max = members
                .iter()
                .map(|m| m.sentence_similarity)
                .fold(f64::NEG_INFINITY, f64::max);
            ParagraphRow {
                paragraph_id,
                paragraph_text: first.paragraph_text.clone(),
                paragraph_similarity: first.paragraph_similarity,
                page_number: first.page_number,
                sentences: members.len(),
                mean_similarity: sum / members.len() as f64,
                max_similarity: max,
                modal_class: modal_class(members),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.mean_similarity
            .partial_cmp(&a.mean_similarity)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Sentence-level view: the recommendation's qualifying rows stable-sorted
/// by sentence similarity descending.
pub fn sentence_view(view: &View<'_>, code: &str) -> Vec<SentenceRow> {
    let mut rows: Vec<SentenceRow> = view
        .rows()
        .iter()
        .filter(|m| m.recommendation_code == code)
        .map(|m| SentenceRow {
            sentence_id: m.sentence_id,
            sentence_id_paragraph: m.sentence_id_paragraph,
            sentence_text: m.sentence_text.clone(),
            page_number: m.page_number,
            paragraph_id: m.paragraph_id,
            sentence_similarity: m.sentence_similarity,
            predicted_class: m.predicted_class,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.sentence_similarity
            .partial_cmp(&a.sentence_similarity)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Most frequent class; a tie goes to the value encountered first.
fn modal_class(members: &[&Mention]) -> PredictedClass {
    let mut counts: Vec<(PredictedClass, usize)> = Vec::new();
    for m in members {
        match counts.iter_mut().find(|(class, _)| *class == m.predicted_class) {
            Some((_, n)) => *n += 1,
            None => counts.push((m.predicted_class, 1)),
        }
    }
    let mut best = counts[0];
    for &(class, n) in &counts[1..] {
        if n > best.1 {
            best = (class, n);
        }
    }
    best.0
}
