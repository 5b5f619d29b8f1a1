//! Rollups over filtered views: mention frequency, topic counts, and the
//! recommendation dictionary.
//!
//! Every output carries an explicit total order (count descending with a
//! name tiebreak, or code ascending) so repeated runs over the same view are
//! byte-identical.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::filter::View;

/// One row of the frequency rollup.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyEntry {
    pub recommendation_code: String,
    pub mentions: usize,
    pub recommendation_text: String,
}

/// Most-mentioned recommendations in the qualifying view.
///
/// Sorted by mention count descending; ties broken by code ascending.
pub fn top_frequent(view: &View<'_>, k: usize) -> Vec<FrequencyEntry> {
    let mut counts: HashMap<&str, (usize, &str)> = HashMap::new();
    for m in view.rows() {
        counts
            .entry(m.recommendation_code.as_str())
            .or_insert((0, m.recommendation_text.as_str()))
            .0 += 1;
    }

    let mut entries: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(code, (mentions, text))| FrequencyEntry {
            recommendation_code: code.to_string(),
            mentions,
            recommendation_text: text.to_string(),
        })
        .collect();
    entries.sort_by(|a, b| {
        b.mentions
            .cmp(&a.mentions)
            .then_with(|| a.recommendation_code.cmp(&b.recommendation_code))
    });
    entries.truncate(k);
    entries
}

/// One row of the topic rollup.
#[derive(Debug, Clone, Serialize)]
pub struct TopicEntry {
    pub topic: String,
    /// Distinct recommendation codes under the topic, not row count.
    pub recommendations: usize,
}

/// Distinct implemented recommendations per topic, in the qualifying view.
///
/// Sorted by count descending; ties broken by topic name ascending.
pub fn by_topic(view: &View<'_>) -> Vec<TopicEntry> {
    let mut codes_by_topic: HashMap<&str, HashSet<&str>> = HashMap::new();
    for m in view.rows() {
        codes_by_topic
            .entry(m.recommendation_topic.as_str())
            .or_default()
            .insert(m.recommendation_code.as_str());
    }

    let mut entries: Vec<TopicEntry> = codes_by_topic
        .into_iter()
        .map(|(topic, codes)| TopicEntry {
            topic: topic.to_string(),
            recommendations: codes.len(),
        })
        .collect();
    entries.sort_by(|a, b| {
        b.recommendations
            .cmp(&a.recommendations)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    entries
}

/// Whether the dictionary reports coverage globally or for one municipality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryScope {
    Global,
    Municipality,
}

/// Municipality coverage of one dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Coverage {
    /// Global scope: distinct municipalities with at least one mention.
    Municipalities(usize),
    /// Scoped mode: the selected municipality itself.
    Municipality(String),
}

/// One recommendation in the dictionary.
#[derive(Debug, Clone, Serialize)]
pub struct DictionaryEntry {
    pub recommendation_code: String,
    pub recommendation_text: String,
    pub recommendation_topic: String,
    pub recommendation_priority: bool,
    pub mentions: usize,
    pub mean_similarity: f64,
    pub max_similarity: f64,
    pub coverage: Coverage,
}

/// Build the recommendation dictionary from a base-semantics view (policy +
/// geography filters applied, threshold not applied).
///
/// A recommendation with no surviving mention is omitted rather than listed
/// with zero counts. Text, topic, and priority are taken from the first row
/// seen for each code. Sorted by code ascending.
pub fn dictionary(view: &View<'_>, scope: DictionaryScope) -> Vec<DictionaryEntry> {
    struct Accum<'a> {
        text: &'a str,
        topic: &'a str,
        priority: bool,
        mentions: usize,
        sum_similarity: f64,
        max_similarity: f64,
        municipalities: HashSet<&'a str>,
        first_municipality: &'a str,
    }

    let mut by_code: HashMap<&str, Accum<'_>> = HashMap::new();
    for m in view.rows() {
        let entry = by_code
            .entry(m.recommendation_code.as_str())
            .or_insert_with(|| Accum {
                text: m.recommendation_text.as_str(),
                topic: m.recommendation_topic.as_str(),
                priority: m.recommendation_priority,
                mentions: 0,
                sum_similarity: 0.0,
                max_similarity: f64::NEG_INFINITY,
                municipalities: HashSet::new(),
                first_municipality: m.municipality.as_str(),
            });
        entry.mentions += 1;
        entry.sum_similarity += m.sentence_similarity;
        entry.max_similarity = entry.max_similarity.max(m.sentence_similarity);
        entry.municipalities.insert(m.municipality.as_str());
    }

    let mut entries: Vec<DictionaryEntry> = by_code
        .into_iter()
        .map(|(code, accum)| DictionaryEntry {
            recommendation_code: code.to_string(),
            recommendation_text: accum.text.to_string(),
            recommendation_topic: accum.topic.to_string(),
            recommendation_priority: accum.priority,
            mentions: accum.mentions,
            mean_similarity: accum.sum_similarity / accum.mentions as f64,
            max_similarity: accum.max_similarity,
            coverage: match scope {
                DictionaryScope::Global => Coverage::Municipalities(accum.municipalities.len()),
                DictionaryScope::Municipality => {
                    Coverage::Municipality(accum.first_municipality.to_string())
                }
            },
        })
        .collect();
    entries.sort_by(|a, b| a.recommendation_code.cmp(&b.recommendation_code));
    entries
}

/// Priority refinement for dictionary queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriorityFilter {
    #[default]
    All,
    Prioritized,
    NotPrioritized,
}

/// Search/topic/priority refinement over an already-built dictionary.
#[derive(Debug, Clone, Default)]
pub struct DictionaryFilter {
    /// Case-insensitive substring match over code and text.
    pub search: Option<String>,
    pub topic: Option<String>,
    pub priority: PriorityFilter,
}

/// Apply a [`DictionaryFilter`], preserving entry order.
pub fn refine(entries: Vec<DictionaryEntry>, filter: &DictionaryFilter) -> Vec<DictionaryEntry> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    entries
        .into_iter()
        .filter(|e| {
            if let Some(term) = search.as_deref() {
                let hit = e.recommendation_code.to_lowercase().contains(term)
                    || e.recommendation_text.to_lowercase().contains(term);
                if !hit {
                    return false;
                }
            }
            if let Some(topic) = filter.topic.as_deref()
                && e.recommendation_topic != topic
            {
                return false;
            }
            match filter.priority {
                PriorityFilter::All => true,
                PriorityFilter::Prioritized => e.recommendation_priority,
                PriorityFilter::NotPrioritized => !e.recommendation_priority,
            }
        })
        .collect()
}
