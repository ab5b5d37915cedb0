//! Tunables for a single pipeline run.

use serde::{Deserialize, Serialize};

/// Minimum number of in-window events required to attempt a fit at all.
pub const MIN_TOTAL_EVENTS: usize = 50;
/// Minimum number of distinct event types required to attempt a fit.
pub const MIN_EVENT_TYPES: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub num_bases: usize,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub lambda1: f64,
    pub lambda2: f64,
    pub min_strength: f64,
    pub max_insights: usize,
    /// Quadrature points per observation window used by the fitter.
    pub num_quad_points: usize,
    /// Quadrature points per observation window used by the KS diagnostic
    /// (cheaper than the fitter's, since it only runs once per target
    /// after fitting has already converged).
    pub diagnostic_quad_points: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            num_bases: 6,
            max_iter: 150,
            learning_rate: 0.01,
            lambda1: 0.01,
            lambda2: 0.001,
            min_strength: 0.1,
            max_insights: 20,
            num_quad_points: 50,
            diagnostic_quad_points: 20,
        }
    }
}
