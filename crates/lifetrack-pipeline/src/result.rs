//! The pipeline's final output: coverage, fitted influence/baseline
//! summaries, goodness-of-fit diagnostics, and a short ranked list of
//! human-facing insights distilled from all of the above.

use lifetrack_model::{BaselineSummary, DiagnosticResult, InfluenceEdge};
use lifetrack_windows::CoverageReport;
use serde::{Deserialize, Serialize};

/// `co-occurrence` is any influence edge whose 50%-mass time is under 15
/// minutes — effectively instantaneous, as opposed to a delayed `influence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    Influence,
    Rhythm,
    CoOccurrence,
}

const CO_OCCURRENCE_THRESHOLD_MS: f64 = 15.0 * 60_000.0;

/// One ranked, human-readable highlight extracted from the fitted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    /// The score this insight was ranked by; not meaningful across kinds,
    /// only used to order insights of the same kind against each other
    /// before interleaving.
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub coverage: CoverageReport,
    pub total_observed_hours: f64,
    pub num_events: usize,
    pub num_types: usize,
    pub edges: Vec<InfluenceEdge>,
    pub baselines: Vec<BaselineSummary>,
    pub diagnostics: Vec<DiagnosticResult>,
    pub insights: Vec<Insight>,
    pub model_fitted: bool,
    /// Set when the run stopped early without fitting, e.g. too few events
    /// or too few distinct types.
    pub aborted_reason: Option<String>,
}

impl AnalysisResult {
    pub fn aborted(coverage: CoverageReport, num_events: usize, num_types: usize, reason: impl Into<String>) -> Self {
        Self {
            coverage,
            total_observed_hours: 0.0,
            num_events,
            num_types,
            edges: Vec::new(),
            baselines: Vec::new(),
            diagnostics: Vec::new(),
            insights: Vec::new(),
            model_fitted: false,
            aborted_reason: Some(reason.into()),
        }
    }
}

/// Render the top `max_insights` edges and baselines (by strength /
/// amplitude) as short, ranked, human-readable insights.
pub fn build_insights(edges: &[InfluenceEdge], baselines: &[BaselineSummary], max_insights: usize) -> Vec<Insight> {
    let mut insights: Vec<Insight> = Vec::new();

    for edge in edges {
        let verb = match edge.direction {
            lifetrack_model::EdgeDirection::Excite => "raises the likelihood of",
            lifetrack_model::EdgeDirection::Inhibit => "lowers the likelihood of",
            lifetrack_model::EdgeDirection::Neutral => "has a negligible effect on",
        };
        let kind = if edge.mass_time_ms < CO_OCCURRENCE_THRESHOLD_MS {
            InsightKind::CoOccurrence
        } else {
            InsightKind::Influence
        };
        insights.push(Insight {
            kind,
            message: format!(
                "{} {verb} {} (peak lag {:.0} min, mass by {:.0} min)",
                edge.source_type,
                edge.target_type,
                edge.peak_lag_ms / 60_000.0,
                edge.mass_time_ms / 60_000.0
            ),
            score: edge.strength,
        });
    }

    for baseline in baselines {
        if baseline.hour_of_day_amplitude < 0.05 {
            continue;
        }
        insights.push(Insight {
            kind: InsightKind::Rhythm,
            message: format!(
                "{} peaks around hour {:.0} of the day",
                baseline.type_name, baseline.hour_of_day_peak
            ),
            score: baseline.hour_of_day_amplitude,
        });
    }

    insights.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    insights.truncate(max_insights);
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Property 10: round-trip through serialization preserves every field.
    #[test]
    fn analysis_result_round_trips_through_json() {
        let result = AnalysisResult::aborted(CoverageReport::default(), 3, 1, "too few events");
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_events, result.num_events);
        assert_eq!(back.num_types, result.num_types);
        assert_eq!(back.aborted_reason, result.aborted_reason);
        assert_eq!(back.model_fitted, result.model_fitted);
    }

    #[test]
    fn co_occurrence_threshold_splits_insight_kind() {
        let edges = vec![InfluenceEdge {
            source_type: "a".into(),
            target_type: "b".into(),
            peak_lag_ms: 60_000.0,
            mass_time_ms: 60_000.0, // 1 min, under the 15 min threshold
            peak_effect: 1.0,
            integrated_effect: 1.0,
            hazard_ratio_at_peak: 2.0,
            hazard_ratio_at_15m: 1.5,
            hazard_ratio_at_1h: 1.2,
            hazard_ratio_at_6h: 1.1,
            direction: lifetrack_model::EdgeDirection::Excite,
            strength: 0.5,
            weights: vec![1.0],
        }];
        let insights = build_insights(&edges, &[], 20);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::CoOccurrence);
    }
}
