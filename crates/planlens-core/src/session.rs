//! Session-level rollup: the headline numbers above the engine views.
//!
//! An [`AnalysisSession`] pairs the cached table with the active filter
//! parameters. Derived views are recomputed on every call — identical
//! parameters always yield identical output, so nothing here is cached.

use std::collections::HashSet;

use serde::Serialize;

use crate::Mention;
use crate::MentionTable;
use crate::filter::{self, FilterParams, FilteredViews};
use crate::rank::{self, Ranking};

/// Municipality-level static attributes, from the first base-view row.
#[derive(Debug, Clone, Serialize)]
pub struct MunicipalityProfile {
    pub municipality: String,
    pub department: String,
    pub poverty_index: Option<f64>,
    pub pdet_flag: Option<bool>,
    pub conflict_category: Option<String>,
    pub capacity_group: Option<String>,
}

/// Headline implementation numbers for the selected municipality.
#[derive(Debug, Clone, Serialize)]
pub struct ImplementationMetrics {
    /// Distinct recommendations with a qualifying mention.
    pub implemented: usize,
    /// Distinct recommendations in the policy universe. Always computed
    /// from the current universe, never a constant.
    pub total_recommendations: usize,
    pub priority_implemented: usize,
    pub priority_total: usize,
    /// Position in the global ranking; `None` renders as "N/A".
    pub ranking_position: Option<usize>,
    pub ranked_municipalities: usize,
}

/// Aggregate numbers for the all-municipalities comparative mode.
#[derive(Debug, Clone, Serialize)]
pub struct ComparativeSummary {
    pub municipalities: usize,
    pub departments: usize,
    pub recommendations: usize,
    pub mean_similarity: Option<f64>,
}

/// One analysis session: the immutable table plus the active filters.
pub struct AnalysisSession<'a> {
    table: &'a MentionTable,
    params: FilterParams,
}

impl<'a> AnalysisSession<'a> {
    pub fn new(table: &'a MentionTable, params: FilterParams) -> Self {
        Self { table, params }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// The base and qualifying views for the current parameters.
    pub fn views(&self) -> FilteredViews<'a> {
        filter::apply(self.table, &self.params)
    }

    /// The global ranking for the current policy setting and threshold.
    pub fn ranking(&self) -> Ranking {
        let policy = filter::policy_view(self.table, self.params.policy_only);
        rank::rank(&policy, self.params.threshold)
    }

    /// Static attributes of the selected municipality, if any row survives
    /// the base filters.
    pub fn profile(&self) -> Option<MunicipalityProfile> {
        let municipality = self.params.municipality.as_deref()?;
        let views = self.views();
        let first = views.base.rows().first()?;
        Some(MunicipalityProfile {
            municipality: municipality.to_string(),
            department: first.department.clone(),
            poverty_index: first.poverty_index,
            pdet_flag: first.pdet_flag,
            conflict_category: first.conflict_category.clone(),
            capacity_group: first.capacity_group.clone(),
        })
    }

    /// Implementation metrics over the current filters.
    ///
    /// Numerators come from the qualifying view; denominators and the
    /// ranking from the global policy universe.
    pub fn metrics(&self) -> ImplementationMetrics {
        let views = self.views();
        let policy = filter::policy_view(self.table, self.params.policy_only);
        let ranking = rank::rank(&policy, self.params.threshold);
        let ranking_position = self
            .params
            .municipality
            .as_deref()
            .and_then(|m| ranking.position_of(m));
        ImplementationMetrics {
            implemented: distinct_codes(views.qualifying.rows(), false),
            total_recommendations: distinct_codes(policy.rows(), false),
            priority_implemented: distinct_codes(views.qualifying.rows(), true),
            priority_total: distinct_codes(policy.rows(), true),
            ranking_position,
            ranked_municipalities: ranking.len(),
        }
    }

    /// Comparative summary over the base view.
    pub fn summary(&self) -> ComparativeSummary {
        let views = self.views();
        let rows = views.base.rows();
        let municipalities: HashSet<&str> = rows.iter().map(|m| m.municipality.as_str()).collect();
        let departments: HashSet<&str> = rows.iter().map(|m| m.department.as_str()).collect();
        let mean_similarity = if rows.is_empty() {
            None
        } else {
            let sum: f64 = rows.iter().map(|m| m.sentence_similarity).sum();
            Some(sum / rows.len() as f64)
        };
        ComparativeSummary {
            municipalities: municipalities.len(),
            departments: departments.len(),
            recommendations: distinct_codes(rows, false),
            mean_similarity,
        }
    }
}

fn distinct_codes(rows: &[&Mention], priority_only: bool) -> usize {
    rows.iter()
        .filter(|m| !priority_only || m.recommendation_priority)
        .map(|m| m.recommendation_code.as_str())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PredictedClass;
    use crate::testutil::{mention, table};

    fn scoped(municipality: &str) -> FilterParams {
        FilterParams {
            municipality: Some(municipality.to_string()),
            ..FilterParams::default()
        }
    }

    #[test]
    fn profile_reads_static_attributes() {
        let mut m = mention("Dabeiba", "R01", 0.9);
        m.poverty_index = Some(48.7);
        m.pdet_flag = Some(true);
        m.conflict_category = Some("Alto".to_string());
        m.capacity_group = Some("G2".to_string());
        let t = table(vec![m]);

        let session = AnalysisSession::new(&t, scoped("Dabeiba"));
        let profile = session.profile().unwrap();
        assert_eq!(profile.department, "Antioquia");
        assert_eq!(profile.poverty_index, Some(48.7));
        assert_eq!(profile.pdet_flag, Some(true));
        assert_eq!(profile.conflict_category.as_deref(), Some("Alto"));
        assert_eq!(profile.capacity_group.as_deref(), Some("G2"));
    }

    #[test]
    fn profile_requires_a_selected_municipality() {
        let t = table(vec![mention("Dabeiba", "R01", 0.9)]);
        let session = AnalysisSession::new(&t, FilterParams::default());
        assert!(session.profile().is_none());
    }

    #[test]
    fn profile_none_when_filters_remove_everything() {
        let t = table(vec![mention("Dabeiba", "R01", 0.9)]);
        let session = AnalysisSession::new(&t, scoped("Mitú"));
        assert!(session.profile().is_none());
    }

    #[test]
    fn metrics_denominator_is_the_policy_universe() {
        // Three recommendations exist globally; Dabeiba qualifies on one.
        let t = table(vec![
            mention("Dabeiba", "R01", 0.9),
            mention("Dabeiba", "R02", 0.3),
            mention("Anorí", "R03", 0.9),
        ]);
        let session = AnalysisSession::new(&t, scoped("Dabeiba"));
        let metrics = session.metrics();
        assert_eq!(metrics.implemented, 1);
        assert_eq!(metrics.total_recommendations, 3);
    }

    #[test]
    fn metrics_denominator_shrinks_with_the_policy_filter() {
        let mut excluded = mention("Anorí", "R03", 0.9);
        excluded.predicted_class = PredictedClass::Excluida;
        excluded.prediction_confidence = 0.95;
        let t = table(vec![mention("Dabeiba", "R01", 0.9), excluded]);

        let session = AnalysisSession::new(&t, scoped("Dabeiba"));
        assert_eq!(session.metrics().total_recommendations, 1);

        let params = FilterParams {
            policy_only: false,
            ..scoped("Dabeiba")
        };
        let session = AnalysisSession::new(&t, params);
        assert_eq!(session.metrics().total_recommendations, 2);
    }

    #[test]
    fn priority_counts_track_the_priority_flag() {
        let mut priority_hit = mention("Dabeiba", "R01", 0.9);
        priority_hit.recommendation_priority = true;
        let mut priority_miss = mention("Dabeiba", "R02", 0.2);
        priority_miss.recommendation_priority = true;
        let t = table(vec![
            priority_hit,
            priority_miss,
            mention("Dabeiba", "R03", 0.9),
        ]);

        let session = AnalysisSession::new(&t, scoped("Dabeiba"));
        let metrics = session.metrics();
        assert_eq!(metrics.priority_implemented, 1);
        assert_eq!(metrics.priority_total, 2);
        assert_eq!(metrics.implemented, 2);
    }

    #[test]
    fn ranking_position_is_global_despite_scoping() {
        let t = table(vec![
            mention("Anorí", "R01", 0.9),
            mention("Anorí", "R02", 0.9),
            mention("Dabeiba", "R01", 0.9),
        ]);
        let session = AnalysisSession::new(&t, scoped("Dabeiba"));
        let metrics = session.metrics();
        assert_eq!(metrics.ranking_position, Some(2));
        assert_eq!(metrics.ranked_municipalities, 2);
    }

    #[test]
    fn missing_municipality_has_no_position() {
        let t = table(vec![mention("Anorí", "R01", 0.9)]);
        let session = AnalysisSession::new(&t, scoped("Mitú"));
        let metrics = session.metrics();
        assert_eq!(metrics.ranking_position, None);
        assert_eq!(metrics.implemented, 0);
    }

    #[test]
    fn summary_over_the_base_view() {
        let mut other_dept = mention("Quibdó", "R02", 0.4);
        other_dept.department = "Chocó".to_string();
        let t = table(vec![mention("Anorí", "R01", 0.8), other_dept]);

        let session = AnalysisSession::new(&t, FilterParams::default());
        let summary = session.summary();
        assert_eq!(summary.municipalities, 2);
        assert_eq!(summary.departments, 2);
        assert_eq!(summary.recommendations, 2);
        // Mean over the base view: the threshold does not apply.
        assert!((summary.mean_similarity.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_has_no_mean() {
        let t = table(Vec::new());
        let session = AnalysisSession::new(&t, FilterParams::default());
        let summary = session.summary();
        assert_eq!(summary.municipalities, 0);
        assert_eq!(summary.mean_similarity, None);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let t = table(vec![
            mention("Anorí", "R01", 0.9),
            mention("Dabeiba", "R02", 0.7),
        ]);
        let session = AnalysisSession::new(&t, FilterParams::default());
        let first = session.metrics();
        let second = session.metrics();
        assert_eq!(first.implemented, second.implemented);
        assert_eq!(first.total_recommendations, second.total_recommendations);
        assert_eq!(first.ranking_position, second.ranking_position);
    }
}
