//! Municipality ranking by distinct implemented recommendations.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::filter::View;

/// One ranked municipality.
#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    pub municipality: String,
    pub department: String,
    /// Distinct recommendation codes with at least one qualifying sentence.
    pub implemented: usize,
    /// Dense rank, 1..N, unique per entry even under tied counts.
    pub rank: usize,
}

/// The global municipality ranking for one threshold.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    entries: Vec<RankEntry>,
}

/// Rank municipalities by how many distinct recommendations they implement.
///
/// Takes the policy-filtered view — never a geography-filtered one; the
/// ranking universe is always global. A recommendation mentioned in five
/// qualifying sentences still counts once. Ties are broken by municipality
/// then department name, and every entry receives a unique dense rank.
pub fn rank(policy_view: &View<'_>, threshold: f64) -> Ranking {
    let mut groups: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
    for m in policy_view.rows() {
        // Every municipality in the view gets a group, qualifying or not,
        // so zero-count municipalities still appear at the bottom.
        let codes = groups
            .entry((m.municipality.as_str(), m.department.as_str()))
            .or_default();
        if m.sentence_similarity >= threshold {
            codes.insert(m.recommendation_code.as_str());
        }
    }

    let mut entries: Vec<RankEntry> = groups
        .into_iter()
        .map(|((municipality, department), codes)| RankEntry {
            municipality: municipality.to_string(),
            department: department.to_string(),
            implemented: codes.len(),
            rank: 0,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.implemented
            .cmp(&a.implemented)
            .then_with(|| a.municipality.cmp(&b.municipality))
            .then_with(|| a.department.cmp(&b.department))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    Ranking { entries }
}

impl Ranking {
    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `n` entries.
    pub fn top(&self, n: usize) -> &[RankEntry] {
        &self.entries[..self.entries.len().min(n)]
    }

    /// Rank of a municipality, if it is in the ranking universe at all.
    pub fn position_of(&self, municipality: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.municipality == municipality)
            .map(|e| e.rank)
    }
}
