//! The single forward pass shared by the likelihood/gradient computation
//! and the KS diagnostics: event times and per-window quadrature points,
//! interleaved in time order, driving one recursive-state walk.
//!
//! Using the exponential basis lets the running influence sum
//! `Σ_s Σ_b θ·S` be evaluated exactly and recursively, which is what turns
//! an otherwise `O(events × history)` likelihood evaluation into a single
//! `O(events + quadrature points)` linear pass.

use lifetrack_core::{feature_vector, ExponentialBasis, EventStream, RecursiveState, FEATURE_DIM};
use lifetrack_windows::ObservationWindow;

use crate::params::PPGLMParams;

/// What kind of tick is currently being visited.
#[derive(Debug, Clone, Copy)]
pub enum TickKind {
    /// A left-rectangle quadrature point of width `dt_hours`.
    Quadrature { dt_hours: f64 },
    /// An observed event of the given source type.
    Event { source_type: usize, is_target: bool },
}

/// `η_k(t, S) = Σ_j β[k,j]·f_j(t) + Σ_{s≠k} Σ_b θ[k][s,b]·S[s][b]`.
pub fn linear_predictor(
    params: &PPGLMParams,
    target: usize,
    features: &[f64; FEATURE_DIM],
    state: &RecursiveState,
) -> f64 {
    let beta = &params.beta[target];
    let mut eta: f64 = beta.iter().zip(features.iter()).map(|(b, f)| b * f).sum();
    for s in 0..params.num_types {
        if s == target {
            continue;
        }
        let theta_row = &params.theta[target][s];
        let state_row = state.row(s);
        for b in 0..params.num_bases {
            eta += theta_row[b] * state_row[b];
        }
    }
    eta
}

/// Walk events and quadrature points for `target` in time order, calling
/// `visit` once per tick with the evaluated linear predictor, intensity,
/// baseline features, and the recursive state *as of just before* this
/// tick's own impulse is applied.
///
/// Quadrature points sort before events at the same instant, so the
/// intensity at an event time is always evaluated from pre-event history.
pub fn walk_target(
    stream: &EventStream,
    windows: &[ObservationWindow],
    params: &PPGLMParams,
    target: usize,
    num_quad_points: usize,
    basis: &ExponentialBasis,
    mut visit: impl FnMut(f64, TickKind, f64, f64, &[f64; FEATURE_DIM], &RecursiveState),
) {
    let mut state = RecursiveState::new(params.num_types, params.num_bases);

    let event_hours: Vec<f64> = stream.times_ms.iter().map(|&t| t / 3_600_000.0).collect();
    let mut ev_idx = 0usize;

    let mut window_idx = 0usize;
    let mut quad_i = 0usize;
    let mut next_quad = advance_quad_cursor(windows, &mut window_idx, &mut quad_i, num_quad_points);

    loop {
        let event_time = event_hours.get(ev_idx).copied();
        let quad_time = next_quad.map(|(t, _)| t);

        let take_quad = match (quad_time, event_time) {
            (Some(qt), Some(et)) => qt <= et,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if take_quad {
            let (t, dt) = next_quad.unwrap();
            state.advance_to(t, basis);
            let features = feature_vector(t * 3_600_000.0);
            let eta = linear_predictor(params, target, &features, &state);
            let lambda = eta.clamp(-20.0, 20.0).exp();
            visit(t, TickKind::Quadrature { dt_hours: dt }, eta, lambda, &features, &state);
            next_quad = advance_quad_cursor(windows, &mut window_idx, &mut quad_i, num_quad_points);
        } else {
            let t = event_time.unwrap();
            let source_type = stream.type_idx[ev_idx] as usize;
            state.advance_to(t, basis);
            let features = feature_vector(t * 3_600_000.0);
            let eta = linear_predictor(params, target, &features, &state);
            let lambda = eta.clamp(-20.0, 20.0).exp();
            visit(
                t,
                TickKind::Event { source_type, is_target: source_type == target },
                eta,
                lambda,
                &features,
                &state,
            );
            state.increment(source_type);
            ev_idx += 1;
        }
    }
}

/// Produce the next `(time_hours, dt_hours)` quadrature point, advancing
/// past exhausted windows. `Q` points per window, left-rectangle rule.
fn advance_quad_cursor(
    windows: &[ObservationWindow],
    window_idx: &mut usize,
    quad_i: &mut usize,
    num_quad_points: usize,
) -> Option<(f64, f64)> {
    while *window_idx < windows.len() {
        let w = &windows[*window_idx];
        if *quad_i < num_quad_points {
            let start_hours = w.start_ms / 3_600_000.0;
            let len_hours = w.len_ms() / 3_600_000.0;
            let dt = len_hours / num_quad_points as f64;
            let t = start_hours + *quad_i as f64 * dt;
            *quad_i += 1;
            return Some((t, dt));
        }
        *window_idx += 1;
        *quad_i = 0;
    }
    None
}

/// Subgradient of `|x|` at `x == 0` taken as `0` (rather than `f64::signum`'s
/// `1.0`), so an L1-regularized weight that has settled at zero stays there.
pub fn subgradient_sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
