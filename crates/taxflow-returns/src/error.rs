//! Pipeline error model
//!
//! Validation problems are data: they travel inside `RunOutcome::Failed`.
//! Everything in this module is a fault that ends the current invocation.
use thiserror::Error;

use crate::state::PipelineState;

/// How a primary trigger can reject a request
#[derive(Error, Debug)]
pub enum TriggerFailure {
    /// User-facing validation problems; an empty list is treated as a fault
    #[error("TRIGGER/VALIDATION: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Anything not shaped as a validation list
    #[error("TRIGGER/FAULT: {0}")]
    Fault(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("PIPELINE/FAULT/{stage}: {source}")]
    Fault {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("PIPELINE/TRANSITION: {from:?} -> {to:?}")]
    IllegalTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

impl PipelineError {
    pub fn fault(stage: &'static str, source: anyhow::Error) -> Self {
        PipelineError::Fault { stage, source }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, PipelineError::Fault { .. })
    }
}
