//! Ordered filter pipeline producing the derived views.
//!
//! The order is a contract, not an implementation detail: the policy filter
//! runs first because it fixes the universe over which rankings and
//! total-recommendation counts are computed, and the similarity threshold
//! runs last, deriving the qualifying view from the geography-filtered base
//! view.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Mention, MentionTable, PredictedClass};

/// Sentences classified `Excluida` below this confidence are kept anyway.
pub const EXCLUDED_CONFIDENCE_CUTOFF: f64 = 0.8;

/// User-selected filter parameters. `None` geography means "all".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterParams {
    pub policy_only: bool,
    pub department: Option<String>,
    pub municipality: Option<String>,
    pub threshold: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            policy_only: true,
            department: None,
            municipality: None,
            threshold: 0.6,
        }
    }
}

/// An ordered, borrowed subset of the mention table.
///
/// Views preserve table row order; all sorting happens in the engines that
/// consume them.
#[derive(Debug, Clone)]
pub struct View<'a> {
    rows: Vec<&'a Mention>,
}

impl<'a> View<'a> {
    pub fn rows(&self) -> &[&'a Mention] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output of the filter pipeline.
pub struct FilteredViews<'a> {
    /// Policy + geography filters applied; the threshold is not.
    ///
    /// Dictionaries and summary counts are computed over this view.
    pub base: View<'a>,
    /// `base` restricted to sentences at or above the similarity threshold.
    pub qualifying: View<'a>,
}

/// A row is policy-relevant when classified `Incluida`, or classified
/// `Excluida` with confidence below [`EXCLUDED_CONFIDENCE_CUTOFF`].
pub fn is_policy_relevant(m: &Mention) -> bool {
    match m.predicted_class {
        PredictedClass::Incluida => true,
        PredictedClass::Excluida => m.prediction_confidence < EXCLUDED_CONFIDENCE_CUTOFF,
    }
}

/// Rows surviving the policy filter alone.
///
/// Ranking and the total-recommendations denominator are computed over this
/// view: the geography filters never narrow the ranking universe.
pub fn policy_view(table: &MentionTable, policy_only: bool) -> View<'_> {
    let rows = table
        .rows()
        .iter()
        .filter(|m| !policy_only || is_policy_relevant(m))
        .collect();
    View { rows }
}

/// Apply the full pipeline: policy → department → municipality → threshold.
pub fn apply<'a>(table: &'a MentionTable, params: &FilterParams) -> FilteredViews<'a> {
    let mut rows = policy_view(table, params.policy_only).rows;

    if let Some(department) = params.department.as_deref() {
        rows.retain(|m| m.department == department);
    }
    if let Some(municipality) = params.municipality.as_deref() {
        rows.retain(|m| m.municipality == municipality);
    }

    let base = View { rows: rows.clone() };
    rows.retain(|m| m.sentence_similarity >= params.threshold);
    let qualifying = View { rows };

    debug!(
        base = base.len(),
        qualifying = qualifying.len(),
        "filter pipeline applied"
    );
    FilteredViews { base, qualifying }
}
