//! Return generation orchestrator
//!
//! Runs one invocation of either pipeline at a time per call. The two
//! pipelines are independent: each call owns its state trace and its
//! error list, and the only shared state is the `ErrorBoard`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taxflow_core::{FactSet, RunContext};
use taxflow_registry::{CapabilityTable, Offers};

use crate::artifact::{primary_filename, secondary_filename, Artifact, ArtifactKind, ArtifactReceipt};
use crate::board::{ErrorBoard, Ticket};
use crate::collaborators::{
    ComposedPrimary, DocumentRenderer, DocumentSaver, PrimaryTrigger, ReturnComputer,
};
use crate::error::{PipelineError, TriggerFailure};
use crate::state::{PipelineState, StateTrace};

/// What the secondary pipeline does when the primary computation reports
/// validation errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryErrorPolicy {
    /// Show the same errors the primary pipeline would
    #[default]
    Surface,
    /// Produce nothing and show nothing
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The action is not offered; nothing was attempted
    Unavailable { notice: String },
    /// Validation errors to display
    Failed { errors: Vec<String> },
    /// The pipeline had nothing to produce
    Skipped,
    Persisted { receipt: ArtifactReceipt },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub trace_id: String,
    pub kind: ArtifactKind,
    pub path: Vec<PipelineState>,
    pub outcome: RunOutcome,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn errors(&self) -> &[String] {
        match &self.outcome {
            RunOutcome::Failed { errors } => errors,
            _ => &[],
        }
    }
}

pub struct Orchestrator {
    capabilities: CapabilityTable,
    trigger: Arc<dyn PrimaryTrigger>,
    computer: Arc<dyn ReturnComputer>,
    renderer: Arc<dyn DocumentRenderer>,
    saver: Arc<dyn DocumentSaver>,
    policy: SecondaryErrorPolicy,
    board: Arc<ErrorBoard>,
}

impl Orchestrator {
    /// Orchestrator whose primary trigger composes the same collaborators
    pub fn new(
        capabilities: CapabilityTable,
        computer: Arc<dyn ReturnComputer>,
        renderer: Arc<dyn DocumentRenderer>,
        saver: Arc<dyn DocumentSaver>,
    ) -> Self {
        let trigger = Arc::new(ComposedPrimary::new(
            computer.clone(),
            renderer.clone(),
            saver.clone(),
        ));
        Self {
            capabilities,
            trigger,
            computer,
            renderer,
            saver,
            policy: SecondaryErrorPolicy::default(),
            board: Arc::new(ErrorBoard::new()),
        }
    }

    pub fn with_trigger(mut self, trigger: Arc<dyn PrimaryTrigger>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_policy(mut self, policy: SecondaryErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub fn board(&self) -> &ErrorBoard {
        &self.board
    }

    /// Capability check only; no collaborator is called
    pub fn offers(&self, facts: &FactSet) -> Option<Offers> {
        facts
            .active_year
            .map(|year| self.capabilities.offers(year, facts.residency()))
    }

    pub async fn run_primary(&self, facts: &FactSet) -> Result<RunReport, PipelineError> {
        let ctx = RunContext::new(facts.active_year);
        let kind = ArtifactKind::Primary;
        let mut trace = StateTrace::new();

        let offers = match self.offers(facts) {
            Some(offers) => offers,
            None => return Ok(unavailable(&ctx, kind, trace, no_year_notice())),
        };
        if let Some(notice) = offers.primary.notice() {
            return Ok(unavailable(&ctx, kind, trace, notice.to_string()));
        }

        let ticket = self.board.issue(kind);
        let filename = primary_filename(facts.surname(), self.renderer.extension());
        tracing::info!(trace_id = %ctx.trace_id, %filename, "creating primary return");

        trace.advance(PipelineState::ComputingPrimary)?;
        let outcome = match self.trigger.create(facts, &filename).await {
            Ok(receipt) => {
                trace.advance(PipelineState::Persisted)?;
                RunOutcome::Persisted { receipt }
            }
            Err(TriggerFailure::Validation(errors)) if !errors.is_empty() => {
                trace.advance(PipelineState::PrimaryFailed)?;
                RunOutcome::Failed { errors }
            }
            Err(TriggerFailure::Validation(_)) => {
                return Err(self.fault(&ctx, ticket, &trace, "primary", anyhow::anyhow!(
                    "primary trigger rejected with an empty error list"
                )));
            }
            Err(TriggerFailure::Fault(source)) => {
                return Err(self.fault(&ctx, ticket, &trace, "primary", source));
            }
        };

        self.finish(&ctx, kind, ticket, trace, outcome)
    }

    pub async fn run_secondary(&self, facts: &FactSet) -> Result<RunReport, PipelineError> {
        let ctx = RunContext::new(facts.active_year);
        let kind = ArtifactKind::Secondary;
        let mut trace = StateTrace::new();

        let (year, jurisdiction) = match (facts.active_year, facts.residency()) {
            (Some(year), Some(j)) if self.capabilities.secondary_available(year, j) => (year, j),
            (Some(year), j) => {
                let offers = self.capabilities.offers(year, j);
                let notice = offers.secondary.notice().unwrap_or_default().to_string();
                return Ok(unavailable(&ctx, kind, trace, notice));
            }
            (None, _) => return Ok(unavailable(&ctx, kind, trace, no_year_notice())),
        };

        let ticket = self.board.issue(kind);
        trace.advance(PipelineState::ComputingPrimary)?;

        let primary = match self.computer.compute_primary(facts) {
            Ok(primary) => primary,
            Err(errors) if errors.is_empty() => {
                return Err(self.fault(&ctx, ticket, &trace, "secondary", anyhow::anyhow!(
                    "primary computation rejected with an empty error list"
                )));
            }
            Err(errors) => {
                let outcome = match self.policy {
                    SecondaryErrorPolicy::Surface => {
                        trace.advance(PipelineState::PrimaryFailed)?;
                        RunOutcome::Failed { errors }
                    }
                    SecondaryErrorPolicy::Silent => {
                        tracing::debug!(trace_id = %ctx.trace_id, "primary computation failed; secondary skipped");
                        RunOutcome::Skipped
                    }
                };
                return self.finish(&ctx, kind, ticket, trace, outcome);
            }
        };

        trace.advance(PipelineState::ComputingSecondary)?;
        let secondary = match self.computer.compute_secondary(facts, &primary, year).await {
            Ok(Some(secondary)) => secondary,
            Ok(None) => return self.finish(&ctx, kind, ticket, trace, RunOutcome::Skipped),
            Err(source) => return Err(self.fault(&ctx, ticket, &trace, "compute_secondary", source)),
        };

        trace.advance(PipelineState::Rendering)?;
        let bytes = match self.renderer.render(kind, &secondary).await {
            Ok(bytes) => bytes,
            Err(source) => return Err(self.fault(&ctx, ticket, &trace, "render", source)),
        };

        let filename = secondary_filename(facts.surname(), jurisdiction, self.renderer.extension());
        let artifact = Artifact::new(kind, filename, bytes);
        if let Err(source) = self.saver.save(&artifact.bytes, &artifact.filename).await {
            return Err(self.fault(&ctx, ticket, &trace, "save", source));
        }

        trace.advance(PipelineState::Persisted)?;
        let receipt = artifact.receipt();
        tracing::info!(
            trace_id = %ctx.trace_id,
            filename = %receipt.filename,
            digest = %receipt.digest,
            "secondary return persisted"
        );
        self.finish(&ctx, kind, ticket, trace, RunOutcome::Persisted { receipt })
    }

    fn finish(
        &self,
        ctx: &RunContext,
        kind: ArtifactKind,
        ticket: Ticket,
        mut trace: StateTrace,
        outcome: RunOutcome,
    ) -> Result<RunReport, PipelineError> {
        if trace.current() != PipelineState::Idle {
            trace.advance(PipelineState::Idle)?;
        }

        let errors = match &outcome {
            RunOutcome::Failed { errors } => errors.clone(),
            _ => Vec::new(),
        };
        if !errors.is_empty() {
            tracing::warn!(trace_id = %ctx.trace_id, %kind, count = errors.len(), "validation errors");
        }
        self.board.publish(ticket, errors);

        Ok(RunReport {
            trace_id: ctx.trace_id.clone(),
            kind,
            path: trace.into_path(),
            outcome,
            elapsed_ms: ctx.elapsed_ms(),
        })
    }

    /// Log a fault and clear the displayed errors for its kind.
    fn fault(
        &self,
        ctx: &RunContext,
        ticket: Ticket,
        trace: &StateTrace,
        stage: &'static str,
        source: anyhow::Error,
    ) -> PipelineError {
        tracing::error!(
            trace_id = %ctx.trace_id,
            stage,
            state = ?trace.current(),
            error = %source,
            "unhandled pipeline fault"
        );
        self.board.publish(ticket, Vec::new());
        PipelineError::fault(stage, source)
    }
}

fn unavailable(ctx: &RunContext, kind: ArtifactKind, trace: StateTrace, notice: String) -> RunReport {
    tracing::info!(trace_id = %ctx.trace_id, %kind, %notice, "pipeline not offered");
    RunReport {
        trace_id: ctx.trace_id.clone(),
        kind,
        path: trace.into_path(),
        outcome: RunOutcome::Unavailable { notice },
        elapsed_ms: 0,
    }
}

fn no_year_notice() -> String {
    "No tax year is selected.".to_string()
}
