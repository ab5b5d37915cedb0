//! The pipeline state machine: coverage → windowing → fit → summarize →
//! diagnose, with progress reported at each transition.

use lifetrack_core::{Event, ExponentialBasis};
use lifetrack_model::{diagnose, fit_all, summarize_baselines, summarize_edges, AdamConfig};
use lifetrack_windows::{build_event_stream, build_windows, total_observed_hours, CoverageAnalyzer};
use tracing::{info, warn};

use crate::options::{AnalysisOptions, MIN_EVENT_TYPES, MIN_TOTAL_EVENTS};
use crate::progress::{ProgressMessage, Stage};
use crate::result::{build_insights, AnalysisResult};

/// Run the full pipeline over raw `events`, calling `on_progress` after
/// every stage transition.
pub fn run_pipeline(
    events: &[Event],
    options: &AnalysisOptions,
    mut on_progress: impl FnMut(ProgressMessage),
) -> AnalysisResult {
    on_progress(ProgressMessage::new(Stage::Coverage, 5, "segmenting tracking coverage"));
    let coverage = CoverageAnalyzer::analyze(events);

    on_progress(ProgressMessage::new(Stage::Streaming, 10, "building observation windows"));
    let windows = build_windows(&coverage.periods);
    let (stream, diag) = build_event_stream(events, &windows);
    if diag.has_errors() {
        warn!(count = diag.error_count(), "errors while building event stream");
    }

    if stream.len() < MIN_TOTAL_EVENTS || stream.num_types() < MIN_EVENT_TYPES {
        let reason = format!(
            "insufficient data: {} in-window events across {} types (need >= {MIN_TOTAL_EVENTS} events and >= {MIN_EVENT_TYPES} types)",
            stream.len(),
            stream.num_types()
        );
        info!(%reason, "aborting pipeline run");
        on_progress(ProgressMessage::new(Stage::Aborted, 100, reason.clone()));
        return AnalysisResult::aborted(coverage, stream.len(), stream.num_types(), reason);
    }

    let basis = ExponentialBasis::new(options.num_bases);
    let config = AdamConfig {
        learning_rate: options.learning_rate,
        max_iter: options.max_iter,
        ..AdamConfig::default()
    };

    on_progress(ProgressMessage::new(Stage::Fitting, 15, "fitting per-target GLMs"));
    let fit = fit_all(
        &stream,
        &windows,
        &basis,
        &config,
        options.lambda1,
        options.lambda2,
        options.num_quad_points,
        |done, total| {
            let fraction = if total == 0 { 1.0 } else { done as f64 / total as f64 };
            let percent = (15.0 + 70.0 * fraction).round() as u8;
            on_progress(ProgressMessage::new(
                Stage::Fitting,
                percent,
                format!("fit {done}/{total} target types"),
            ));
        },
    );

    on_progress(ProgressMessage::new(Stage::Summarizing, 90, "extracting influence edges and baselines"));
    let edges = summarize_edges(&fit, &basis, options.min_strength);
    let baselines = summarize_baselines(&fit);

    on_progress(ProgressMessage::new(Stage::Diagnosing, 95, "running goodness-of-fit diagnostics"));
    let mut diagnostics = Vec::new();
    let mut target_names: Vec<&String> = fit.results.keys().collect();
    target_names.sort();
    for name in target_names {
        if let Some(target_idx) = stream.type_index(name) {
            diagnostics.push(diagnose(
                &stream,
                &windows,
                &fit.params,
                target_idx as usize,
                &basis,
                options.diagnostic_quad_points,
            ));
        }
    }

    let insights = build_insights(&edges, &baselines, options.max_insights);

    on_progress(ProgressMessage::new(Stage::Done, 100, "analysis complete"));

    AnalysisResult {
        coverage,
        total_observed_hours: total_observed_hours(&windows),
        num_events: stream.len(),
        num_types: stream.num_types(),
        edges,
        baselines,
        diagnostics,
        insights,
        model_fitted: fit.model_fitted,
        aborted_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_events(n: usize, step_ms: f64, type_name: &str) -> Vec<Event> {
        (0..n).map(|i| Event::new(type_name, i as f64 * step_ms)).collect()
    }

    #[test]
    fn empty_input_aborts_immediately() {
        let result = run_pipeline(&[], &AnalysisOptions::default(), |_| {});
        assert!(result.aborted_reason.is_some());
        assert!(!result.model_fitted);
        assert_eq!(result.coverage.total_days, 0);
    }

    #[test]
    fn single_type_aborts_for_too_few_types() {
        let events = make_events(200, 3_600_000.0, "walk");
        let result = run_pipeline(&events, &AnalysisOptions::default(), |_| {});
        assert!(result.aborted_reason.is_some());
    }

    #[test]
    fn enough_events_and_types_fits_a_model() {
        let mut events = make_events(120, 1_800_000.0, "coffee");
        events.extend(make_events(80, 3_000_000.0, "walk"));
        let options = AnalysisOptions { max_iter: 30, ..Default::default() };
        let mut stages_seen = Vec::new();
        let result = run_pipeline(&events, &options, |p| stages_seen.push(p.stage));

        assert!(result.model_fitted);
        assert!(result.aborted_reason.is_none());
        assert!(stages_seen.contains(&Stage::Done));
        assert!(!stages_seen.contains(&Stage::Aborted));
    }
}
