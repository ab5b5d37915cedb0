//! Progress reporting for long-running pipeline runs.

use serde::{Deserialize, Serialize};

/// Named stage of the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Idle,
    Coverage,
    Streaming,
    Fitting,
    Summarizing,
    Diagnosing,
    Done,
    Aborted,
    Error,
}

/// A single progress update, suitable for streaming to a caller while a
/// run is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressMessage {
    pub stage: Stage,
    /// 0-100.
    pub percent: u8,
    pub detail: String,
}

impl ProgressMessage {
    pub fn new(stage: Stage, percent: u8, detail: impl Into<String>) -> Self {
        Self { stage, percent, detail: detail.into() }
    }
}
