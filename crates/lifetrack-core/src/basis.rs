//! Fixed family of exponential decay kernels used as the influence basis.
//!
//! Every source→target influence curve is modeled as a weighted sum of
//! `B` exponential kernels `exp(-Δh/τ)` drawn from a fixed ladder of
//! timescales. Because the kernels are Markovian, the running sum
//! `Σ θ_b · Σ exp(-(t-t_e)/τ_b)` can be maintained recursively (see
//! [`crate::recursive_state`]) instead of being recomputed from full event
//! history — this is the load-bearing trick that keeps the likelihood
//! evaluation linear in the number of events.

/// Number of timescales in the fixed ladder.
pub const B_MAX: usize = 9;

/// Fixed timescales, in hours, from 5 minutes out to 21 days.
pub const TIMESCALES_HOURS: [f64; B_MAX] = [
    5.0 / 60.0,
    15.0 / 60.0,
    1.0,
    4.0,
    12.0,
    24.0,
    72.0,
    168.0,
    504.0,
];

/// Default number of active bases (up to the 1-day timescale).
pub const DEFAULT_NUM_BASES: usize = 6;

/// Horizon (hours) used for peak-lag search, mass-time integration, and
/// the closed-form integrated effect.
const HORIZON_HOURS: f64 = 168.0;

const PEAK_GRID_POINTS: usize = 200;
const MASS_GRID_POINTS: usize = 500;
const MASS_GRID_START_HOURS: f64 = 1.0 / 60.0;

/// The fixed exponential basis, truncated to the first `num_bases` of the
/// 9 available timescales.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBasis {
    num_bases: usize,
}

impl ExponentialBasis {
    /// Construct a basis using the first `num_bases` timescales.
    ///
    /// `num_bases` is clamped to `1..=B_MAX`.
    pub fn new(num_bases: usize) -> Self {
        Self {
            num_bases: num_bases.clamp(1, B_MAX),
        }
    }

    pub fn num_bases(&self) -> usize {
        self.num_bases
    }

    pub fn timescale_hours(&self, b: usize) -> f64 {
        TIMESCALES_HOURS[b]
    }

    pub fn timescales(&self) -> &[f64] {
        &TIMESCALES_HOURS[..self.num_bases]
    }

    /// `exp(-Δh/τ)` for `Δh > 0`, else `0`. This is the value added to the
    /// linear predictor by a single past impulse at lag `delta_hours`.
    #[inline]
    pub fn kernel(tau_hours: f64, delta_hours: f64) -> f64 {
        if delta_hours > 0.0 {
            (-delta_hours / tau_hours).exp()
        } else {
            0.0
        }
    }

    /// `exp(-Δh/τ)`, used for decaying already-accumulated recursive
    /// state forward in time (Δh is assumed `>= 0`).
    #[inline]
    pub fn decay(delta_hours: f64, tau_hours: f64) -> f64 {
        (-delta_hours / tau_hours).exp()
    }

    /// `g(Δh) = Σ_b θ_b · kernel(τ_b, Δh)`, the influence curve for a
    /// given weight vector.
    pub fn curve(&self, weights: &[f64], delta_hours: f64) -> f64 {
        weights
            .iter()
            .zip(self.timescales())
            .map(|(&w, &tau)| w * Self::kernel(tau, delta_hours))
            .sum()
    }

    /// Sweep a log-spaced grid of lags in `[5min, 168h]` and return the
    /// lag (in ms) and curve value at the point of maximal `|g|`.
    pub fn peak_lag(&self, weights: &[f64]) -> (f64, f64) {
        let start = TIMESCALES_HOURS[0];
        let end = HORIZON_HOURS;
        let mut best_lag = start;
        let mut best_val = self.curve(weights, start);
        let mut best_abs = best_val.abs();

        for i in 0..PEAK_GRID_POINTS {
            let dh = log_space_point(start, end, PEAK_GRID_POINTS, i);
            let val = self.curve(weights, dh);
            if val.abs() > best_abs {
                best_abs = val.abs();
                best_val = val;
                best_lag = dh;
            }
        }

        (best_lag * 3_600_000.0, best_val)
    }

    /// Smallest lag (ms) whose cumulative absolute mass reaches 50% of the
    /// total absolute integral of `g` over `[1min, 168h]`. Returns `0` if
    /// the total absolute integral is below `1e-10`.
    pub fn mass_time(&self, weights: &[f64]) -> f64 {
        let start = MASS_GRID_START_HOURS;
        let end = HORIZON_HOURS;

        let grid: Vec<f64> = (0..MASS_GRID_POINTS)
            .map(|i| log_space_point(start, end, MASS_GRID_POINTS, i))
            .collect();
        let abs_vals: Vec<f64> = grid.iter().map(|&dh| self.curve(weights, dh).abs()).collect();

        // Trapezoidal rule over the (non-uniform) log-spaced grid.
        let mut cumulative = vec![0.0; grid.len()];
        let mut total = 0.0;
        for i in 1..grid.len() {
            let width = grid[i] - grid[i - 1];
            let area = 0.5 * (abs_vals[i] + abs_vals[i - 1]) * width;
            total += area;
            cumulative[i] = total;
        }

        if total < 1e-10 {
            return 0.0;
        }

        let half = 0.5 * total;
        for i in 0..grid.len() {
            if cumulative[i] >= half {
                return grid[i] * 3_600_000.0;
            }
        }
        grid[grid.len() - 1] * 3_600_000.0
    }

    /// Closed-form `Σ_b θ_b · τ_b · (1 - exp(-Δh_max/τ_b))` over the fixed
    /// 168h horizon.
    pub fn integrated_effect(&self, weights: &[f64]) -> f64 {
        weights
            .iter()
            .zip(self.timescales())
            .map(|(&w, &tau)| w * tau * (1.0 - (-HORIZON_HOURS / tau).exp()))
            .sum()
    }
}

/// `i`-th of `n` log-spaced points in `[start, end]` inclusive.
fn log_space_point(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return start;
    }
    let log_start = start.ln();
    let log_end = end.ln();
    let t = i as f64 / (n - 1) as f64;
    (log_start + t * (log_end - log_start)).exp()
}
