//! Error board: the error lists currently displayed to the user
//!
//! Each invocation takes a ticket when it starts and publishes its error
//! list when it ends. Per artifact kind the newest ticket wins: a result
//! from an invocation that started before the last published one is
//! dropped, so a slow stale run never replaces a newer run's errors.
//! A run that ends in a fault publishes an empty list.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::artifact::ArtifactKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: ArtifactKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

#[derive(Debug, Default)]
struct Slot {
    seq: u64,
    errors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ErrorBoard {
    next: AtomicU64,
    slots: Mutex<HashMap<ArtifactKind, Slot>>,
}

impl ErrorBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, kind: ArtifactKind) -> Ticket {
        Ticket {
            kind,
            seq: self.next.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Publish the errors of the invocation holding `ticket`.
    /// Returns `false` when a newer invocation already published.
    pub fn publish(&self, ticket: Ticket, errors: Vec<String>) -> bool {
        let mut slots = self.slots.lock();
        let slot = slots.entry(ticket.kind).or_default();
        if ticket.seq < slot.seq {
            tracing::debug!(kind = %ticket.kind, seq = ticket.seq, "dropping stale error list");
            return false;
        }
        slot.seq = ticket.seq;
        slot.errors = errors;
        true
    }

    pub fn errors(&self, kind: ArtifactKind) -> Vec<String> {
        self.slots
            .lock()
            .get(&kind)
            .map(|s| s.errors.clone())
            .unwrap_or_default()
    }
}
