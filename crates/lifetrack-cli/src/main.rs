//! CLI entry point: read a JSON array of events, run the analysis
//! pipeline, stream progress to stderr via `tracing`, and print the final
//! result as JSON on stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lifetrack_core::Event;
use lifetrack_pipeline::{run_pipeline, AnalysisOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Analyze a life-event log for self-exciting influence and rhythm structure.
#[derive(Debug, Parser)]
#[command(name = "lifetrack", version, about)]
struct Cli {
    /// Path to a JSON file containing an array of `{typeName, timeMs}` events.
    events_path: PathBuf,

    #[arg(long, default_value_t = AnalysisOptions::default().num_bases)]
    num_bases: usize,

    #[arg(long, default_value_t = AnalysisOptions::default().max_iter)]
    max_iter: usize,

    #[arg(long, default_value_t = AnalysisOptions::default().learning_rate)]
    learning_rate: f64,

    #[arg(long, default_value_t = AnalysisOptions::default().lambda1)]
    lambda1: f64,

    #[arg(long, default_value_t = AnalysisOptions::default().lambda2)]
    lambda2: f64,

    #[arg(long, default_value_t = AnalysisOptions::default().min_strength)]
    min_strength: f64,

    #[arg(long, default_value_t = AnalysisOptions::default().max_insights)]
    max_insights: usize,

    /// Print progress updates to stderr as the run proceeds.
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.events_path)
        .with_context(|| format!("reading events file {}", cli.events_path.display()))?;
    let events: Vec<Event> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing events JSON from {}", cli.events_path.display()))?;

    info!(count = events.len(), "loaded events");

    let options = AnalysisOptions {
        num_bases: cli.num_bases,
        max_iter: cli.max_iter,
        learning_rate: cli.learning_rate,
        lambda1: cli.lambda1,
        lambda2: cli.lambda2,
        min_strength: cli.min_strength,
        max_insights: cli.max_insights,
        ..AnalysisOptions::default()
    };

    let show_progress = cli.progress;
    let result = run_pipeline(&events, &options, |message| {
        if show_progress {
            info!(stage = ?message.stage, percent = message.percent, "{}", message.detail);
        }
    });

    if let Some(reason) = &result.aborted_reason {
        info!(%reason, "run aborted without fitting a model");
    }

    serde_json::to_writer_pretty(std::io::stdout(), &result).context("serializing analysis result")?;
    println!();

    Ok(())
}
