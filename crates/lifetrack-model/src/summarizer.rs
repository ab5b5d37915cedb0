//! Turns a fitted model into human-facing influence edges and baseline
//! rhythm summaries.

use std::f64::consts::PI;

use lifetrack_core::ExponentialBasis;
use serde::{Deserialize, Serialize};

use crate::fitter::FullModelFit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    Excite,
    Inhibit,
    Neutral,
}

/// A source→target influence summary derived from `theta[target][source]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluenceEdge {
    pub source_type: String,
    pub target_type: String,
    pub peak_lag_ms: f64,
    pub mass_time_ms: f64,
    pub peak_effect: f64,
    pub integrated_effect: f64,
    pub hazard_ratio_at_peak: f64,
    pub hazard_ratio_at_15m: f64,
    pub hazard_ratio_at_1h: f64,
    pub hazard_ratio_at_6h: f64,
    pub direction: EdgeDirection,
    pub strength: f64,
    pub weights: Vec<f64>,
}

/// A target type's fitted baseline rhythm, decomposed from `beta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub type_name: String,
    pub intercept_log_rate: f64,
    pub hour_of_day_peak: f64,
    pub hour_of_day_amplitude: f64,
    pub day_of_week_peak: u8,
    pub day_of_week_amplitude: f64,
}

/// Edges whose influence weights' combined absolute mass is below
/// `min_strength` are dropped as noise rather than reported.
pub fn summarize_edges(fit: &FullModelFit, basis: &ExponentialBasis, min_strength: f64) -> Vec<InfluenceEdge> {
    let mut edges = Vec::new();

    for (target_name, result) in &fit.results {
        let Some(target_idx) = fit.type_names.iter().position(|n| n == target_name) else {
            continue;
        };

        for source_idx in 0..fit.type_names.len() {
            if source_idx == target_idx {
                continue;
            }
            let weights = &result.params.theta[source_idx];
            let abs_mass: f64 = weights.iter().map(|w| w.abs()).sum();
            if abs_mass < min_strength {
                continue;
            }

            let (peak_lag_ms, peak_value) = basis.peak_lag(weights);
            let mass_time_ms = basis.mass_time(weights);
            let integrated_effect = basis.integrated_effect(weights);

            let hazard_ratio_at = |lag_hours: f64| basis.curve(weights, lag_hours).exp();

            let direction = if integrated_effect > 0.1 {
                EdgeDirection::Excite
            } else if integrated_effect < -0.1 {
                EdgeDirection::Inhibit
            } else {
                EdgeDirection::Neutral
            };

            edges.push(InfluenceEdge {
                source_type: fit.type_names[source_idx].clone(),
                target_type: target_name.clone(),
                peak_lag_ms,
                mass_time_ms,
                peak_effect: peak_value,
                integrated_effect,
                hazard_ratio_at_peak: peak_value.exp(),
                hazard_ratio_at_15m: hazard_ratio_at(0.25),
                hazard_ratio_at_1h: hazard_ratio_at(1.0),
                hazard_ratio_at_6h: hazard_ratio_at(6.0),
                direction,
                strength: abs_mass / (1.0 + abs_mass),
                weights: weights.clone(),
            });
        }
    }

    edges.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap()
            .then_with(|| a.target_type.cmp(&b.target_type))
            .then_with(|| a.source_type.cmp(&b.source_type))
    });
    edges
}

/// Decompose each fitted target's `beta` into an intercept rate plus
/// hour-of-day and day-of-week rhythm peaks and amplitudes.
///
/// `beta` layout: `[intercept, sin(2πh/24), cos(2πh/24), sin(4πh/24),
/// cos(4πh/24), sin(2πd/7), cos(2πd/7)]`. Only the fundamental (period-24h
/// and period-7d) harmonics are summarized; the first-harmonic (12h) term
/// still shapes the fitted curve but isn't reduced to a single peak/phase.
pub fn summarize_baselines(fit: &FullModelFit) -> Vec<BaselineSummary> {
    let mut summaries: Vec<BaselineSummary> = fit
        .results
        .iter()
        .map(|(type_name, result)| {
            let beta = &result.params.beta;

            let hour_amplitude = beta[1].hypot(beta[2]);
            let hour_phase = beta[1].atan2(beta[2]);
            let hour_of_day_peak = (24.0 - 24.0 * hour_phase / (2.0 * PI)).rem_euclid(24.0);

            let dow_amplitude = beta[5].hypot(beta[6]);
            let dow_phase = beta[5].atan2(beta[6]);
            // rem_euclid(7.0) gives [0,7), but .round() alone can still land
            // exactly on 7 for values in [6.5,7.0); wrap back into {0..6}.
            let day_of_week_peak =
                ((7.0 - 7.0 * dow_phase / (2.0 * PI)).rem_euclid(7.0).round() as u32 % 7) as u8;

            BaselineSummary {
                type_name: type_name.clone(),
                intercept_log_rate: beta[0],
                hour_of_day_peak,
                hour_of_day_amplitude: hour_amplitude,
                day_of_week_peak,
                day_of_week_amplitude: dow_amplitude,
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.type_name.cmp(&b.type_name));
    summaries
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::fitter::{FitResult, TargetParams};

    fn fit_with_theta(num_types: usize, theta_row: Vec<Vec<f64>>) -> FullModelFit {
        let mut results = HashMap::new();
        results.insert(
            "b".to_string(),
            FitResult {
                params: TargetParams { beta: [0.0; 7], theta: theta_row },
                final_log_likelihood: 0.0,
                converged: true,
                iterations: 10,
            },
        );
        FullModelFit {
            params: crate::params::PPGLMParams::zeroed(num_types, 2),
            results,
            type_names: vec!["a".to_string(), "b".to_string()],
            model_fitted: true,
        }
    }

    #[test]
    fn weak_edges_are_dropped_below_min_strength() {
        let theta = vec![vec![0.001, 0.001], vec![0.0, 0.0]];
        let fit = fit_with_theta(2, theta);
        let basis = ExponentialBasis::new(2);
        let edges = summarize_edges(&fit, &basis, 0.1);
        assert!(edges.is_empty());
    }

    #[test]
    fn strong_positive_edge_is_classified_as_excite() {
        let theta = vec![vec![2.0, 1.0], vec![0.0, 0.0]];
        let fit = fit_with_theta(2, theta);
        let basis = ExponentialBasis::new(2);
        let edges = summarize_edges(&fit, &basis, 0.1);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source_type, "a");
        assert_eq!(edges[0].target_type, "b");
        assert_eq!(edges[0].direction, EdgeDirection::Excite);
        assert!(edges[0].strength > 0.0 && edges[0].strength < 1.0);
    }

    #[test]
    fn baseline_hour_peak_matches_pure_cosine_bump() {
        let mut results = HashMap::new();
        // beta[1] = sin coeff = 0, beta[2] = cos coeff = 1: peaks at hour 0.
        let mut beta = [0.0; 7];
        beta[2] = 1.0;
        results.insert(
            "a".to_string(),
            FitResult {
                params: TargetParams { beta, theta: vec![vec![0.0; 2]; 1] },
                final_log_likelihood: 0.0,
                converged: true,
                iterations: 5,
            },
        );
        let fit = FullModelFit {
            params: crate::params::PPGLMParams::zeroed(1, 2),
            results,
            type_names: vec!["a".to_string()],
            model_fitted: true,
        };
        let summaries = summarize_baselines(&fit);
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].hour_of_day_peak < 1e-6 || summaries[0].hour_of_day_peak > 23.999);
    }
}
