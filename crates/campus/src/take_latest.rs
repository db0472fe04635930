//! Latest-wins bookkeeping for saga handlers.
//!
//! Each request [`ActionKind`] owns a generation counter. Dispatching a
//! request bumps the generation and aborts the handler started for the
//! previous one; a handler may only apply its effects while its generation is
//! still current. The store performs both the bump and the check inside its
//! write lock, so a stale result can never land after a newer request.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::AbortHandle;

use crate::action::ActionKind;

#[derive(Default)]
struct Slot {
    generation: u64,
    abort: Option<AbortHandle>,
}

/// Proof that a handler was started for `kind` at `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: ActionKind,
    generation: u64,
}

impl Ticket {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Default)]
pub struct LatestTracker {
    slots: Arc<DashMap<ActionKind, Slot>>,
}

impl LatestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes whatever handler is running for `kind`.
    pub fn begin(&self, kind: ActionKind) -> Ticket {
        let mut slot = self.slots.entry(kind).or_default();
        slot.generation += 1;
        if let Some(previous) = slot.abort.take() {
            if !previous.is_finished() {
                tracing::debug!(action = %kind, generation = slot.generation, "superseding in-flight handler");
            }
            previous.abort();
        }
        Ticket {
            kind,
            generation: slot.generation,
        }
    }

    /// Records the task running for `ticket` so a later request can abort it.
    pub fn attach(&self, ticket: &Ticket, handle: AbortHandle) {
        if let Some(mut slot) = self.slots.get_mut(&ticket.kind) {
            if slot.generation == ticket.generation {
                slot.abort = Some(handle);
            }
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.slots
            .get(&ticket.kind)
            .is_some_and(|slot| slot.generation == ticket.generation)
    }

    /// Invalidates and aborts every in-flight handler.
    pub fn reset_all(&self) {
        for mut slot in self.slots.iter_mut() {
            slot.generation += 1;
            if let Some(handle) = slot.abort.take() {
                handle.abort();
            }
        }
    }
}
