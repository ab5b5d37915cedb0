//! Segments the observed timeline into active and gap periods using a
//! rolling-median activity baseline, so the model is not penalized for
//! missing events during genuine absences from tracking.

use lifetrack_core::Event;
use serde::{Deserialize, Serialize};

const MS_PER_DAY: f64 = 86_400_000.0;
const ROLLING_WINDOW_RADIUS: i64 = 30;
const MIN_GAP_DAYS: i64 = 14;

/// A maximal run of consecutive calendar days sharing the same
/// active/inactive classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingPeriod {
    pub start_day: i64,
    /// Inclusive.
    pub end_day: i64,
    pub day_count: i64,
    pub event_count: u64,
    pub is_gap: bool,
}

/// Coverage summary over the full observed calendar range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_days: i64,
    pub active_days: i64,
    pub gap_days: i64,
    pub coverage_percent: f64,
    pub periods: Vec<TrackingPeriod>,
}

fn day_of(time_ms: f64) -> i64 {
    (time_ms / MS_PER_DAY).floor() as i64
}

/// Internal mutable period representation used while merging.
struct Run {
    start_day: i64,
    end_day: i64,
    event_count: u64,
    is_gap: bool,
}

/// Segments a raw event list into active/gap [`TrackingPeriod`]s.
pub struct CoverageAnalyzer;

impl CoverageAnalyzer {
    /// Build the coverage report for the given events. Events with
    /// non-finite timestamps are ignored for the purpose of day-bucketing
    /// (they carry no usable day).
    pub fn analyze(events: &[Event]) -> CoverageReport {
        let finite_times: Vec<f64> = events
            .iter()
            .map(|e| e.time_ms)
            .filter(|t| t.is_finite())
            .collect();

        if finite_times.is_empty() {
            return CoverageReport::default();
        }

        let first_day = finite_times.iter().map(|&t| day_of(t)).min().unwrap();
        let last_day = finite_times.iter().map(|&t| day_of(t)).max().unwrap();
        let total_days = last_day - first_day + 1;

        let mut counts = vec![0u64; total_days as usize];
        for &t in &finite_times {
            let idx = (day_of(t) - first_day) as usize;
            counts[idx] += 1;
        }

        let baselines = rolling_median_baseline(&counts);

        let active: Vec<bool> = counts
            .iter()
            .zip(&baselines)
            .map(|(&c, &baseline)| c as f64 >= (2.0_f64).max(0.1 * baseline))
            .collect();

        let mut runs = build_runs(first_day, &counts, &active);
        merge_short_gaps(&mut runs);

        let periods: Vec<TrackingPeriod> = runs
            .into_iter()
            .map(|r| TrackingPeriod {
                start_day: r.start_day,
                end_day: r.end_day,
                day_count: r.end_day - r.start_day + 1,
                event_count: r.event_count,
                is_gap: r.is_gap,
            })
            .collect();

        let active_days: i64 = periods
            .iter()
            .filter(|p| !p.is_gap)
            .map(|p| p.day_count)
            .sum();
        let gap_days = total_days - active_days;
        let coverage_percent = if total_days > 0 {
            100.0 * active_days as f64 / total_days as f64
        } else {
            0.0
        };

        CoverageReport {
            total_days,
            active_days,
            gap_days,
            coverage_percent,
            periods,
        }
    }
}

fn rolling_median_baseline(counts: &[u64]) -> Vec<f64> {
    let n = counts.len() as i64;
    (0..n)
        .map(|i| {
            let lo = (i - ROLLING_WINDOW_RADIUS).max(0) as usize;
            let hi = (i + ROLLING_WINDOW_RADIUS).min(n - 1) as usize;
            let mut window: Vec<u64> = counts[lo..=hi].to_vec();
            window.sort_unstable();
            median(&window)
        })
        .collect()
}

fn median(sorted: &[u64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    if len % 2 == 1 {
        sorted[len / 2] as f64
    } else {
        (sorted[len / 2 - 1] as f64 + sorted[len / 2] as f64) / 2.0
    }
}

fn build_runs(first_day: i64, counts: &[u64], active: &[bool]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < active.len() {
        let mut j = i;
        while j + 1 < active.len() && active[j + 1] == active[i] {
            j += 1;
        }
        let event_count: u64 = counts[i..=j].iter().sum();
        runs.push(Run {
            start_day: first_day + i as i64,
            end_day: first_day + j as i64,
            event_count,
            is_gap: !active[i],
        });
        i = j + 1;
    }
    runs
}

/// Flips inactive runs shorter than [`MIN_GAP_DAYS`] to active, then
/// coalesces adjacent runs that now share an `is_gap` flag, repeating
/// until no two neighbors agree and no run remains a too-short gap.
fn merge_short_gaps(runs: &mut Vec<Run>) {
    loop {
        let mut flipped = false;
        for r in runs.iter_mut() {
            if r.is_gap && (r.end_day - r.start_day + 1) < MIN_GAP_DAYS {
                r.is_gap = false;
                flipped = true;
            }
        }

        let before = runs.len();
        let coalesced = coalesce(std::mem::take(runs));
        let did_coalesce = coalesced.len() != before;
        *runs = coalesced;

        if !flipped && !did_coalesce {
            break;
        }
    }
}

fn coalesce(runs: Vec<Run>) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::with_capacity(runs.len());
    for r in runs {
        match out.last_mut() {
            Some(last) if last.is_gap == r.is_gap => {
                last.end_day = r.end_day;
                last.event_count += r.event_count;
            }
            _ => out.push(r),
        }
    }
    out
}
