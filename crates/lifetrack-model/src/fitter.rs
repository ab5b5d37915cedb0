//! Per-target Adam optimization of the regularized Poisson GLM.

use std::collections::HashMap;

use lifetrack_core::{ExponentialBasis, EventStream, FEATURE_DIM};
use lifetrack_windows::{total_observed_hours, ObservationWindow};
use serde::{Deserialize, Serialize};

use crate::likelihood;
use crate::params::PPGLMParams;

/// Minimum number of observed events of a type before it is fit as a
/// target at all; types below this count keep all-zero parameters and are
/// excluded from [`FullModelFit::results`].
const MIN_TARGET_EVENT_COUNT: usize = 10;

/// Adam hyperparameters and stopping criteria for a single target's fit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdamConfig {
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Fit is considered converged once consecutive log-likelihood values
    /// differ by less than this.
    pub tolerance: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            learning_rate: 0.01,
            max_iter: 150,
            tolerance: 1e-6,
        }
    }
}

/// A fitted target's own rows of `beta`/`theta`, extracted as a standalone
/// snapshot independent of the shared [`PPGLMParams`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetParams {
    pub beta: [f64; FEATURE_DIM],
    /// `theta[s][b]`, `s` over every source type (`s == target` row unused).
    pub theta: Vec<Vec<f64>>,
}

/// Outcome of fitting one target type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub params: TargetParams,
    pub final_log_likelihood: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// The complete fit: shared parameters plus per-target results for every
/// type that met the minimum event count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullModelFit {
    pub params: PPGLMParams,
    /// Keyed by type name rather than index, so it survives independent of
    /// any particular `EventStream`'s interning.
    pub results: HashMap<String, FitResult>,
    pub type_names: Vec<String>,
    pub model_fitted: bool,
}

/// Seed `beta[k][0]` (the intercept) from the type's empirical average
/// rate; every other coefficient starts at zero.
pub fn init_params_from_data(stream: &EventStream, windows: &[ObservationWindow], num_bases: usize) -> PPGLMParams {
    let num_types = stream.num_types();
    let mut params = PPGLMParams::zeroed(num_types, num_bases);
    let total_hours = total_observed_hours(windows).max(1.0);
    for k in 0..num_types {
        let count = stream.count_of(k as u32);
        params.beta[k][0] = ((count as f64 + 0.5) / total_hours).ln();
    }
    params
}

/// Fit every eligible target type independently with Adam, reporting
/// progress via `on_target_done(completed, total)` after each one.
pub fn fit_all(
    stream: &EventStream,
    windows: &[ObservationWindow],
    basis: &ExponentialBasis,
    config: &AdamConfig,
    lambda1: f64,
    lambda2: f64,
    num_quad_points: usize,
    mut on_target_done: impl FnMut(usize, usize),
) -> FullModelFit {
    let num_types = stream.num_types();
    let mut params = init_params_from_data(stream, windows, basis.num_bases());

    let eligible: Vec<usize> = (0..num_types)
        .filter(|&k| stream.count_of(k as u32) >= MIN_TARGET_EVENT_COUNT)
        .collect();

    let mut results = HashMap::new();
    for (done, &target) in eligible.iter().enumerate() {
        let result = fit_target(stream, windows, &mut params, target, basis, config, lambda1, lambda2, num_quad_points);
        results.insert(stream.type_names[target].clone(), result);
        on_target_done(done + 1, eligible.len());
    }

    FullModelFit {
        model_fitted: !eligible.is_empty(),
        params,
        results,
        type_names: stream.type_names.clone(),
    }
}

/// Adam-optimize `params`' rows for `target` in place, returning the
/// extracted snapshot and fit diagnostics.
fn fit_target(
    stream: &EventStream,
    windows: &[ObservationWindow],
    params: &mut PPGLMParams,
    target: usize,
    basis: &ExponentialBasis,
    config: &AdamConfig,
    lambda1: f64,
    lambda2: f64,
    num_quad_points: usize,
) -> FitResult {
    let num_types = params.num_types;
    let num_bases = params.num_bases;

    let mut m_beta = [0.0; FEATURE_DIM];
    let mut v_beta = [0.0; FEATURE_DIM];
    let mut m_theta = vec![vec![0.0; num_bases]; num_types];
    let mut v_theta = vec![vec![0.0; num_bases]; num_types];

    let mut prev_ll = f64::NEG_INFINITY;
    let mut last_ll = f64::NEG_INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    for t in 1..=config.max_iter {
        let (ll, grad) = likelihood::evaluate(stream, windows, params, target, basis, lambda1, lambda2, num_quad_points);
        last_ll = ll;
        iterations = t;

        let bias1 = 1.0 - config.beta1.powi(t as i32);
        let bias2 = 1.0 - config.beta2.powi(t as i32);

        for j in 0..FEATURE_DIM {
            let g = grad.grad_beta[j];
            m_beta[j] = config.beta1 * m_beta[j] + (1.0 - config.beta1) * g;
            v_beta[j] = config.beta2 * v_beta[j] + (1.0 - config.beta2) * g * g;
            let m_hat = m_beta[j] / bias1;
            let v_hat = v_beta[j] / bias2;
            params.beta[target][j] += config.learning_rate * m_hat / (v_hat.sqrt() + config.eps);
        }

        for s in 0..num_types {
            if s == target {
                continue;
            }
            for b in 0..num_bases {
                let g = grad.grad_theta[s][b];
                m_theta[s][b] = config.beta1 * m_theta[s][b] + (1.0 - config.beta1) * g;
                v_theta[s][b] = config.beta2 * v_theta[s][b] + (1.0 - config.beta2) * g * g;
                let m_hat = m_theta[s][b] / bias1;
                let v_hat = v_theta[s][b] / bias2;
                params.theta[target][s][b] += config.learning_rate * m_hat / (v_hat.sqrt() + config.eps);
            }
        }

        params.clamp_target(target);

        if (ll - prev_ll).abs() < config.tolerance {
            converged = true;
            break;
        }
        prev_ll = ll;
    }

    FitResult {
        params: TargetParams {
            beta: params.beta[target],
            theta: params.theta[target].clone(),
        },
        final_log_likelihood: last_ll,
        converged,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrack_core::Event;

    fn dense_poisson_stream(n: usize, rate_per_hour: f64) -> (EventStream, Vec<ObservationWindow>) {
        let mut events = Vec::new();
        let step_ms = (1.0 / rate_per_hour) * 3_600_000.0;
        for i in 0..n {
            events.push(Event::new("a", i as f64 * step_ms));
        }
        let (stream, _) = EventStream::from_events(&events);
        let horizon_ms = n as f64 * step_ms + step_ms;
        let windows = vec![ObservationWindow { start_ms: 0.0, end_ms: horizon_ms }];
        (stream, windows)
    }

    #[test]
    fn fit_all_skips_types_below_minimum_event_count() {
        let events: Vec<Event> = (0..5).map(|i| Event::new("rare", i as f64 * 1000.0)).collect();
        let (stream, _) = EventStream::from_events(&events);
        let windows = vec![ObservationWindow { start_ms: 0.0, end_ms: 10_000.0 }];
        let basis = ExponentialBasis::new(3);
        let config = AdamConfig { max_iter: 5, ..Default::default() };

        let fit = fit_all(&stream, &windows, &basis, &config, 0.01, 0.001, 10, |_, _| {});
        assert!(!fit.model_fitted);
        assert!(fit.results.is_empty());
    }

    #[test]
    fn fitted_intercept_recovers_approximate_rate() {
        let (stream, windows) = dense_poisson_stream(200, 5.0);
        let basis = ExponentialBasis::new(1);
        let config = AdamConfig { max_iter: 120, ..Default::default() };

        let fit = fit_all(&stream, &windows, &basis, &config, 0.0, 0.0, 20, |_, _| {});
        assert!(fit.model_fitted);
        let result = &fit.results["a"];
        let fitted_rate = result.params.beta[0].exp();
        assert!((fitted_rate - 5.0).abs() / 5.0 < 0.3, "fitted_rate={fitted_rate}");
    }
}
