//! Fact Store: read/merge contract and an in-memory actor implementation
//!
//! The store is treated as an external actor. Callers only hold a handle
//! and talk to it through messages; the actor task owns the `FactSet` and
//! applies commands one at a time.
//!
//! A `snapshot` followed by a `merge` is two commands, and other writers
//! may run in between. A patch that depends on what is stored must be
//! computed inside the actor with `update`.
//!
//! ```text
//! handle ──Command──▶ mpsc ──▶ actor task (owns FactSet)
//!    ▲                              │
//!    └──────────── oneshot ◀────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;
use crate::facts::{FactPatch, FactSet};

/// Position of the interview; advanced after each submitted page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterviewStage(pub u32);

/// Computes a patch from the stored facts; runs inside the store.
pub type PatchFn = Box<dyn FnOnce(&FactSet) -> FactPatch + Send>;

/// Narrow contract the core uses to talk to the fact store.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Current snapshot of all facts and answers
    async fn snapshot(&self) -> Result<FactSet, StoreError>;

    /// Merge a patch: present keys overwrite, tombstones delete
    async fn merge(&self, patch: FactPatch) -> Result<(), StoreError>;

    /// Compute a patch from the current facts and merge it, with no other
    /// command in between. Returns the patch that was applied.
    async fn update(&self, compute: PatchFn) -> Result<FactPatch, StoreError>;

    /// Signal that the interview moves on to the next stage
    async fn advance_stage(&self) -> Result<InterviewStage, StoreError>;

    /// Current interview stage
    async fn stage(&self) -> Result<InterviewStage, StoreError>;
}

enum Command {
    Snapshot(oneshot::Sender<FactSet>),
    Merge(FactPatch, oneshot::Sender<()>),
    Update(PatchFn, oneshot::Sender<FactPatch>),
    Advance(oneshot::Sender<InterviewStage>),
    Stage(oneshot::Sender<InterviewStage>),
}

/// Handle to an in-memory fact store actor. Clones share the same actor.
#[derive(Debug, Clone)]
pub struct MemoryFactStore {
    sender: mpsc::Sender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Snapshot(_) => "Snapshot",
            Command::Merge(..) => "Merge",
            Command::Update(..) => "Update",
            Command::Advance(_) => "Advance",
            Command::Stage(_) => "Stage",
        };
        f.write_str(name)
    }
}

impl MemoryFactStore {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(initial: FactSet) -> Self {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(store_task(initial, rx));
        Self { sender: tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn snapshot(&self) -> Result<FactSet, StoreError> {
        self.request(Command::Snapshot).await
    }

    async fn merge(&self, patch: FactPatch) -> Result<(), StoreError> {
        self.request(|reply| Command::Merge(patch, reply)).await
    }

    async fn update(&self, compute: PatchFn) -> Result<FactPatch, StoreError> {
        self.request(|reply| Command::Update(compute, reply)).await
    }

    async fn advance_stage(&self) -> Result<InterviewStage, StoreError> {
        self.request(Command::Advance).await
    }

    async fn stage(&self) -> Result<InterviewStage, StoreError> {
        self.request(Command::Stage).await
    }
}

async fn store_task(mut facts: FactSet, mut rx: mpsc::Receiver<Command>) {
    let mut stage = InterviewStage::default();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Snapshot(reply) => {
                let _ = reply.send(facts.clone());
            }
            Command::Merge(patch, reply) => {
                tracing::debug!(
                    facts = patch.facts.len(),
                    responses = patch.responses.len(),
                    "merging fact patch"
                );
                facts.apply(&patch);
                let _ = reply.send(());
            }
            Command::Update(compute, reply) => {
                let patch = compute(&facts);
                tracing::debug!(responses = patch.responses.len(), "applying computed patch");
                facts.apply(&patch);
                let _ = reply.send(patch);
            }
            Command::Advance(reply) => {
                stage.0 += 1;
                tracing::debug!(stage = stage.0, "interview advanced");
                let _ = reply.send(stage);
            }
            Command::Stage(reply) => {
                let _ = reply.send(stage);
            }
        }
    }

    tracing::debug!("fact store actor stopped");
}
