//! Per-invocation pipeline state machine
//!
//! ```text
//! Idle → ComputingPrimary ─┬→ PrimaryFailed ───────────────────────→ Idle
//!                          ├→ Persisted (primary trigger) ─────────→ Idle
//!                          └→ ComputingSecondary → Rendering → Persisted → Idle
//! ```
//! Any running state may drop straight back to `Idle` when a stage has
//! nothing to produce or a fault ends the run.
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    ComputingPrimary,
    PrimaryFailed,
    ComputingSecondary,
    Rendering,
    Persisted,
}

pub fn allowed_transitions(from: PipelineState) -> Vec<PipelineState> {
    use PipelineState::*;
    match from {
        Idle => vec![ComputingPrimary],
        ComputingPrimary => vec![PrimaryFailed, ComputingSecondary, Persisted, Idle],
        PrimaryFailed => vec![Idle],
        ComputingSecondary => vec![Rendering, Idle],
        Rendering => vec![Persisted, Idle],
        Persisted => vec![Idle],
    }
}

pub fn validate_transition(from: PipelineState, to: PipelineState) -> Result<(), PipelineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition { from, to })
    }
}

/// Path one invocation took through the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTrace {
    path: Vec<PipelineState>,
}

impl StateTrace {
    pub fn new() -> Self {
        Self {
            path: vec![PipelineState::Idle],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.path.last().copied().unwrap_or(PipelineState::Idle)
    }

    pub fn advance(&mut self, to: PipelineState) -> Result<(), PipelineError> {
        validate_transition(self.current(), to)?;
        tracing::trace!(from = ?self.current(), to = ?to, "pipeline transition");
        self.path.push(to);
        Ok(())
    }

    pub fn path(&self) -> &[PipelineState] {
        &self.path
    }

    pub fn into_path(self) -> Vec<PipelineState> {
        self.path
    }
}

impl Default for StateTrace {
    fn default() -> Self {
        Self::new()
    }
}
