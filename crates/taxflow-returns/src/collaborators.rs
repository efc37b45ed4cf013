//! Collaborator contracts: computation, rendering, persistence
//!
//! The orchestrator owns none of these behaviours. It sequences them and
//! decides which failures are user-facing and which are faults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taxflow_core::{FactSet, TaxYear};

use crate::artifact::{Artifact, ArtifactKind, ArtifactReceipt};
use crate::error::TriggerFailure;

/// Output of the domain computation, opaque to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedReturn(pub serde_json::Value);

/// Domain computation (pure with respect to the facts)
#[async_trait]
pub trait ReturnComputer: Send + Sync {
    /// Primary return, or the validation problems that prevent it
    fn compute_primary(&self, facts: &FactSet) -> Result<ComputedReturn, Vec<String>>;

    /// Secondary return derived from the primary one; `None` when there is
    /// nothing to produce
    async fn compute_secondary(
        &self,
        facts: &FactSet,
        primary: &ComputedReturn,
        year: TaxYear,
    ) -> anyhow::Result<Option<ComputedReturn>>;
}

/// Turns a computed return into document bytes
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, kind: ArtifactKind, object: &ComputedReturn) -> anyhow::Result<Vec<u8>>;

    /// Filename extension of rendered documents
    fn extension(&self) -> &str {
        "pdf"
    }
}

/// Hands document bytes over to storage
#[async_trait]
pub trait DocumentSaver: Send + Sync {
    async fn save(&self, bytes: &[u8], filename: &str) -> anyhow::Result<()>;
}

/// User-triggered creation of the primary document
#[async_trait]
pub trait PrimaryTrigger: Send + Sync {
    async fn create(&self, facts: &FactSet, filename: &str) -> Result<ArtifactReceipt, TriggerFailure>;
}

/// Default primary trigger: compute, render, save
#[derive(Clone)]
pub struct ComposedPrimary {
    computer: Arc<dyn ReturnComputer>,
    renderer: Arc<dyn DocumentRenderer>,
    saver: Arc<dyn DocumentSaver>,
}

impl ComposedPrimary {
    pub fn new(
        computer: Arc<dyn ReturnComputer>,
        renderer: Arc<dyn DocumentRenderer>,
        saver: Arc<dyn DocumentSaver>,
    ) -> Self {
        Self {
            computer,
            renderer,
            saver,
        }
    }
}

#[async_trait]
impl PrimaryTrigger for ComposedPrimary {
    async fn create(&self, facts: &FactSet, filename: &str) -> Result<ArtifactReceipt, TriggerFailure> {
        let computed = self
            .computer
            .compute_primary(facts)
            .map_err(TriggerFailure::Validation)?;

        let bytes = self.renderer.render(ArtifactKind::Primary, &computed).await?;
        let artifact = Artifact::new(ArtifactKind::Primary, filename, bytes);
        self.saver.save(&artifact.bytes, &artifact.filename).await?;

        Ok(artifact.receipt())
    }
}
