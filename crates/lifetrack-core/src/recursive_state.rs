//! Per-source-type recursive impulse state, the Markovian trick that keeps
//! likelihood evaluation linear in the number of events.

use crate::basis::ExponentialBasis;

/// `S[s][b]`: the running, continuously-decaying impulse sum for source
/// type `s` and basis `b`, plus the last time the state was advanced to.
#[derive(Debug, Clone)]
pub struct RecursiveState {
    values: Vec<Vec<f64>>,
    last_time_hours: f64,
    num_bases: usize,
}

impl RecursiveState {
    /// A fresh state for `num_types` source types and `num_bases` bases,
    /// all zero, with no last-advance time set.
    pub fn new(num_types: usize, num_bases: usize) -> Self {
        Self {
            values: vec![vec![0.0; num_bases]; num_types],
            last_time_hours: f64::NAN,
            num_bases,
        }
    }

    pub fn num_bases(&self) -> usize {
        self.num_bases
    }

    pub fn last_time_hours(&self) -> f64 {
        self.last_time_hours
    }

    /// Value of `S[source_type][basis]`.
    #[inline]
    pub fn get(&self, source_type: usize, basis: usize) -> f64 {
        self.values[source_type][basis]
    }

    /// `S[source_type][..]`.
    #[inline]
    pub fn row(&self, source_type: usize) -> &[f64] {
        &self.values[source_type]
    }

    /// Advance the state to `time_hours`, decaying every component by
    /// `decay(Δh, τ_b)`. If the state has no prior time (non-finite
    /// `last_time_hours`), the time is simply recorded without decaying —
    /// there is nothing to decay yet.
    pub fn advance_to(&mut self, time_hours: f64, basis: &ExponentialBasis) {
        if !self.last_time_hours.is_finite() {
            self.last_time_hours = time_hours;
            return;
        }

        let delta = time_hours - self.last_time_hours;
        if delta > 0.0 {
            let factors: Vec<f64> = basis
                .timescales()
                .iter()
                .map(|&tau| ExponentialBasis::decay(delta, tau))
                .collect();
            for row in &mut self.values {
                for (v, f) in row.iter_mut().zip(&factors) {
                    *v *= f;
                }
            }
        }
        self.last_time_hours = time_hours;
    }

    /// Add 1 to every basis component of `S[source_type]`: every basis
    /// shares the same per-event impulse, the kernel differs only in τ.
    pub fn increment(&mut self, source_type: usize) {
        for v in &mut self.values[source_type] {
            *v += 1.0;
        }
    }
}
