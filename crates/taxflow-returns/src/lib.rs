//! Taxflow Returns: primary → secondary return generation pipeline
//!
//! # Pipeline Flow
//!
//! ```text
//! capability gate ─┬─ primary:   trigger(compute → render → save) ──▶ receipt | errors
//!                  └─ secondary: compute primary → compute secondary → render → save
//! ```
//!
//! Validation errors come back as data in `RunOutcome::Failed`. Any other
//! failure is a `PipelineError::Fault`: logged, returned, never swallowed.

pub mod artifact;
pub mod board;
pub mod collaborators;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use artifact::{primary_filename, secondary_filename, Artifact, ArtifactKind, ArtifactReceipt};
pub use board::{ErrorBoard, Ticket};
pub use collaborators::{
    ComposedPrimary, ComputedReturn, DocumentRenderer, DocumentSaver, PrimaryTrigger,
    ReturnComputer,
};
pub use error::{PipelineError, TriggerFailure};
pub use orchestrator::{Orchestrator, RunOutcome, RunReport, SecondaryErrorPolicy};
pub use state::{allowed_transitions, validate_transition, PipelineState, StateTrace};
