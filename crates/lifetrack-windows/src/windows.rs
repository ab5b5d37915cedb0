//! Converts active [`TrackingPeriod`]s into half-open observation windows
//! and builds the sorted, type-interned event stream restricted to them.

use lifetrack_core::{Diagnostics, Event, EventStream};
use serde::{Deserialize, Serialize};

use crate::coverage::TrackingPeriod;

const MS_PER_DAY: f64 = 86_400_000.0;
const MERGE_GAP_MS: f64 = 6.0 * 3_600_000.0;

/// A half-open `[start_ms, end_ms)` interval during which the user was
/// considered to be actively tracking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl ObservationWindow {
    pub fn len_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }

    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }
}

/// Build half-open windows from the active periods, merging windows whose
/// gap is at most 6 hours.
pub fn build_windows(periods: &[TrackingPeriod]) -> Vec<ObservationWindow> {
    let mut raw: Vec<ObservationWindow> = periods
        .iter()
        .filter(|p| !p.is_gap)
        .map(|p| ObservationWindow {
            start_ms: p.start_day as f64 * MS_PER_DAY,
            end_ms: (p.end_day + 1) as f64 * MS_PER_DAY,
        })
        .collect();
    raw.sort_by(|a, b| a.start_ms.partial_cmp(&b.start_ms).unwrap());

    let mut merged: Vec<ObservationWindow> = Vec::with_capacity(raw.len());
    for w in raw.drain(..) {
        match merged.last_mut() {
            Some(last) if w.start_ms <= last.end_ms + MERGE_GAP_MS => {
                last.end_ms = last.end_ms.max(w.end_ms);
            }
            _ => merged.push(w),
        }
    }
    merged
}

/// Total observed duration across all windows, in hours.
pub fn total_observed_hours(windows: &[ObservationWindow]) -> f64 {
    windows.iter().map(|w| w.len_ms()).sum::<f64>() / 3_600_000.0
}

/// Drop events outside all windows, then build the sorted, type-interned
/// [`EventStream`] from the remainder.
pub fn build_event_stream(events: &[Event], windows: &[ObservationWindow]) -> (EventStream, Diagnostics) {
    let mut diag = Diagnostics::new();

    let in_any_window = |t: f64| -> bool {
        // Windows are sorted and non-overlapping: find the last window
        // whose start is <= t and check containment.
        let idx = windows.partition_point(|w| w.start_ms <= t);
        idx > 0 && windows[idx - 1].contains(t)
    };

    let finite_count = events
        .iter()
        .filter(|e| e.time_ms.is_finite() && !e.type_name.is_empty())
        .count();

    let filtered: Vec<Event> = events
        .iter()
        .filter(|e| e.time_ms.is_finite() && !e.type_name.is_empty() && in_any_window(e.time_ms))
        .cloned()
        .collect();

    let dropped_outside_windows = finite_count - filtered.len();
    if dropped_outside_windows > 0 {
        diag.add_warning(
            "windows",
            format!("dropped {dropped_outside_windows} events outside observation windows"),
        );
    }

    let (stream, dropped_malformed) = EventStream::from_events(&filtered);
    if dropped_malformed > 0 {
        diag.add_warning(
            "windows",
            format!("dropped {dropped_malformed} events with non-finite timestamps or empty type names"),
        );
    }

    (stream, diag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::TrackingPeriod;

    fn period(start_day: i64, end_day: i64, is_gap: bool) -> TrackingPeriod {
        TrackingPeriod {
            start_day,
            end_day,
            day_count: end_day - start_day + 1,
            event_count: 0,
            is_gap,
        }
    }

    #[test]
    fn windows_are_half_open_and_sorted() {
        let periods = vec![period(0, 2, false), period(3, 13, true), period(14, 20, false)];
        let windows = build_windows(&periods);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start_ms, 0.0);
        assert_eq!(windows[0].end_ms, 3.0 * MS_PER_DAY);
        for w in windows.windows(2) {
            assert!(w[0].end_ms <= w[1].start_ms);
        }
    }

    #[test]
    fn nearby_active_windows_merge_across_short_gap() {
        // Two active periods separated by a 1-day gap (gap itself isn't
        // passed in here; we simulate two adjacent active periods whose
        // day boundary leaves < 6h between window end and next start,
        // which can't happen with whole-day periods unless adjacent, so
        // instead check merge directly via two close windows.
        let a = ObservationWindow { start_ms: 0.0, end_ms: 10.0 * 3_600_000.0 };
        let b = ObservationWindow { start_ms: 15.0 * 3_600_000.0, end_ms: 20.0 * 3_600_000.0 };
        let periods_as_windows = vec![a, b];
        let mut merged: Vec<ObservationWindow> = Vec::new();
        for w in periods_as_windows {
            match merged.last_mut() {
                Some(last) if w.start_ms <= last.end_ms + MERGE_GAP_MS => {
                    last.end_ms = last.end_ms.max(w.end_ms);
                }
                _ => merged.push(w),
            }
        }
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn event_stream_excludes_events_outside_windows() {
        let windows = vec![ObservationWindow { start_ms: 0.0, end_ms: 100.0 }];
        let events = vec![
            Event::new("a", 50.0),
            Event::new("a", 150.0), // outside
        ];
        let (stream, diag) = build_event_stream(&events, &windows);
        assert_eq!(stream.len(), 1);
        assert_eq!(diag.warning_count(), 1);
    }
}
