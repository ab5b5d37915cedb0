//! # lifetrack-pipeline: end-to-end orchestration
//!
//! Wires coverage segmentation, windowing, GLM fitting, summarization, and
//! diagnostics into a single progress-reporting run.

pub mod options;
pub mod pipeline;
pub mod progress;
pub mod result;

pub use options::{AnalysisOptions, MIN_EVENT_TYPES, MIN_TOTAL_EVENTS};
pub use pipeline::run_pipeline;
pub use progress::{ProgressMessage, Stage};
pub use result::{build_insights, AnalysisResult, Insight, InsightKind};
