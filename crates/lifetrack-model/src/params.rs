//! Shared parameter object for the multivariate point-process GLM.

use lifetrack_core::FEATURE_DIM;
use serde::{Deserialize, Serialize};

const CLAMP_BOUND: f64 = 50.0;

/// Baseline coefficients `β[k]` (length 7) and influence coefficients
/// `θ[k][s][b]` (only `s != k` rows are meaningful) for every target type
/// `k`, owned as a single struct so the optimizer can mutate one target's
/// rows in place while leaving every other target's rows untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PPGLMParams {
    pub num_types: usize,
    pub num_bases: usize,
    /// `beta[k]`: the 7 baseline feature coefficients for target `k`.
    pub beta: Vec<[f64; FEATURE_DIM]>,
    /// `theta[k][s][b]`: influence of source `s` on target `k` via basis
    /// `b`. The `s == k` row always stays zero and is never read.
    pub theta: Vec<Vec<Vec<f64>>>,
}

impl PPGLMParams {
    /// All-zero parameters for `num_types` target types and `num_bases` bases.
    pub fn zeroed(num_types: usize, num_bases: usize) -> Self {
        Self {
            num_types,
            num_bases,
            beta: vec![[0.0; FEATURE_DIM]; num_types],
            theta: vec![vec![vec![0.0; num_bases]; num_types]; num_types],
        }
    }

    /// Clamp a single target's rows to `[-CLAMP_BOUND, CLAMP_BOUND]`,
    /// resetting any non-finite entry to 0 first.
    pub fn clamp_target(&mut self, target: usize) {
        for v in &mut self.beta[target] {
            if !v.is_finite() {
                *v = 0.0;
            }
            *v = v.clamp(-CLAMP_BOUND, CLAMP_BOUND);
        }
        for row in &mut self.theta[target] {
            for v in row {
                if !v.is_finite() {
                    *v = 0.0;
                }
                *v = v.clamp(-CLAMP_BOUND, CLAMP_BOUND);
            }
        }
    }
}
