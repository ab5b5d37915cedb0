//! # lifetrack-windows: coverage segmentation and observation windows
//!
//! Decides which calendar days count as "genuinely tracking" versus
//! dormant absence ([`coverage`]), then turns the resulting active periods
//! into half-open observation windows and the event stream restricted to
//! them ([`windows`]).

pub mod coverage;
pub mod windows;

pub use coverage::{CoverageAnalyzer, CoverageReport, TrackingPeriod};
pub use windows::{build_event_stream, build_windows, total_observed_hours, ObservationWindow};
