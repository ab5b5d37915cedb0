//! Time-rescaling Kolmogorov–Smirnov goodness-of-fit diagnostic.
//!
//! If the fitted intensity is correct, the rescaled inter-event gaps
//! `Λ_i = ∫_{t_{i-1}}^{t_i} λ(t) dt` between consecutive events of a type
//! are i.i.d. `Exp(1)`. Comparing their empirical CDF against `1 -
//! exp(-x)` with a one-sample KS statistic is the model's only built-in
//! check on whether it actually fits the data it was trained on.

use lifetrack_core::ExponentialBasis;
use lifetrack_windows::ObservationWindow;
use serde::{Deserialize, Serialize};

use lifetrack_core::EventStream;

use crate::params::PPGLMParams;
use crate::quadrature::{walk_target, TickKind};

/// 1.36 is the critical KS coefficient at the 5% significance level
/// (`D_crit = 1.36 / sqrt(n)`, asymptotic two-sided one-sample test).
const KS_CRITICAL_COEFFICIENT: f64 = 1.36;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub type_name: String,
    pub sample_count: usize,
    pub ks_statistic: f64,
    pub ks_passes_at_05: bool,
}

/// Run the time-rescaling KS diagnostic for `target`. Types with fewer
/// than 10 events, or fewer than one rescaled gap once restricted to
/// windows, report a maximal (failing) statistic rather than a spurious
/// pass on insufficient data.
pub fn diagnose(
    stream: &EventStream,
    windows: &[ObservationWindow],
    params: &PPGLMParams,
    target: usize,
    basis: &ExponentialBasis,
    num_quad_points: usize,
) -> DiagnosticResult {
    let type_name = stream.type_names[target].clone();

    if stream.count_of(target as u32) < 10 {
        return DiagnosticResult { type_name, sample_count: 0, ks_statistic: 1.0, ks_passes_at_05: false };
    }

    let mut rescaled_gaps = Vec::new();
    let mut accumulated = 0.0;
    let mut seen_first_target_event = false;

    walk_target(stream, windows, params, target, num_quad_points, basis, |_t, kind, _eta, lambda, _f, _s| {
        match kind {
            TickKind::Quadrature { dt_hours } => {
                accumulated += lambda * dt_hours;
            }
            TickKind::Event { is_target, .. } => {
                if !is_target {
                    return;
                }
                if seen_first_target_event {
                    rescaled_gaps.push(accumulated);
                }
                accumulated = 0.0;
                seen_first_target_event = true;
            }
        }
    });

    if rescaled_gaps.is_empty() {
        return DiagnosticResult { type_name, sample_count: 0, ks_statistic: 1.0, ks_passes_at_05: false };
    }

    let n = rescaled_gaps.len();
    let ks_statistic = ks_statistic_against_exp1(&rescaled_gaps);
    let threshold = KS_CRITICAL_COEFFICIENT / (n as f64).sqrt();

    DiagnosticResult {
        type_name,
        sample_count: n,
        ks_statistic,
        ks_passes_at_05: ks_statistic < threshold,
    }
}

/// One-sample two-sided KS statistic of `samples` against `Exp(1)`.
fn ks_statistic_against_exp1(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len() as f64;

    let mut d_max: f64 = 0.0;
    for (i, &x) in sorted.iter().enumerate() {
        let cdf = 1.0 - (-x).exp();
        let empirical_upper = (i as f64 + 1.0) / n;
        let empirical_lower = i as f64 / n;
        d_max = d_max.max((empirical_upper - cdf).abs()).max((cdf - empirical_lower).abs());
    }
    d_max.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrack_core::Event;

    #[test]
    fn insufficient_events_fail_closed() {
        let events: Vec<Event> = (0..5).map(|i| Event::new("a", i as f64 * 1000.0)).collect();
        let (stream, _) = EventStream::from_events(&events);
        let windows = vec![ObservationWindow { start_ms: 0.0, end_ms: 10_000.0 }];
        let params = PPGLMParams::zeroed(1, 3);
        let basis = ExponentialBasis::new(3);

        let result = diagnose(&stream, &windows, &params, 0, &basis, 20);
        assert_eq!(result.ks_statistic, 1.0);
        assert!(!result.ks_passes_at_05);
    }

    #[test]
    fn exactly_exp1_samples_pass_the_test() {
        // Hand-construct a unit-rate Poisson process (zero params => λ=1)
        // over a long horizon; rescaled gaps should be close to Exp(1) and
        // pass the KS test comfortably.
        let mut events = Vec::new();
        let mut t = 0.0;
        // Deterministic "Poisson-like" spacing via a low-discrepancy
        // sequence rather than a RNG (none is available in this crate).
        for i in 1..400u32 {
            let u = ((i as f64) * 0.6180339887) % 1.0;
            let gap_hours = -u.max(1e-6).ln();
            t += gap_hours * 3_600_000.0;
            events.push(Event::new("a", t));
        }
        let (stream, _) = EventStream::from_events(&events);
        let windows = vec![ObservationWindow { start_ms: 0.0, end_ms: t + 3_600_000.0 }];
        let params = PPGLMParams::zeroed(1, 3);
        let basis = ExponentialBasis::new(3);

        let result = diagnose(&stream, &windows, &params, 0, &basis, 30);
        assert!(result.sample_count > 300);
        assert!(result.ks_statistic < 0.5, "ks={}", result.ks_statistic);
    }
}
