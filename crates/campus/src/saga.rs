//! Sagas turn request actions into network calls and terminal actions.

use std::sync::Arc;

use async_trait::async_trait;
use smallvec::SmallVec;
use tokio::sync::watch;
use uuid::Uuid;

/// Actions a saga run dispatches once it resolves, in order.
///
/// Usually the terminal `Success`/`Failure`, optionally followed by a
/// list refresh.
pub type Effects<A> = SmallVec<[A; 2]>;

/// Request-to-outcome coordinator for one slice.
///
/// The engine calls [`handle`](Saga::handle) for every dispatched action
/// that [`watches`](Saga::watches) accepts. A newer action of the same kind
/// supersedes a running handle: the old run is aborted and its effects are
/// discarded if it already finished.
///
/// Sagas must never fail outward. Every error is turned into a `Failure`
/// action inside `handle`.
#[async_trait]
pub trait Saga<S, A, D>: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn watches(&self, action: &A) -> bool;

    async fn handle(&self, action: A, ctx: SagaContext<S, D>) -> Effects<A>;
}

/// What a saga run can see: shared dependencies and the live state.
pub struct SagaContext<S, D> {
    deps: Arc<D>,
    state: watch::Receiver<S>,
    correlation_id: Uuid,
}

impl<S, D> SagaContext<S, D> {
    pub(crate) fn new(deps: Arc<D>, state: watch::Receiver<S>) -> Self {
        Self {
            deps,
            state,
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Reads the current state. Do not hold the result of `f` borrowed
    /// across an await.
    pub fn select<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Unique id of this run, for log correlation.
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
