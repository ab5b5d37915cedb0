//! # lifetrack-model: the regularized point-process GLM
//!
//! Everything needed to go from a windowed event stream to a fitted model
//! and its human-facing summary:
//!
//! - [`params`] — `PPGLMParams`, the shared baseline/influence coefficients
//! - [`quadrature`] — the shared event/quadrature tick-evaluator
//! - [`likelihood`] — per-target log-likelihood and gradient
//! - [`fitter`] — the per-target Adam optimizer and `FullModelFit`
//! - [`summarizer`] — influence edges and baseline rhythm summaries
//! - [`diagnostics`] — the time-rescaling KS goodness-of-fit check

pub mod diagnostics;
pub mod fitter;
pub mod likelihood;
pub mod params;
pub mod quadrature;
pub mod summarizer;

pub use diagnostics::{diagnose, DiagnosticResult};
pub use fitter::{fit_all, init_params_from_data, AdamConfig, FitResult, FullModelFit, TargetParams};
pub use likelihood::Gradient;
pub use params::PPGLMParams;
pub use quadrature::{linear_predictor, walk_target, TickKind};
pub use summarizer::{summarize_baselines, summarize_edges, BaselineSummary, EdgeDirection, InfluenceEdge};
