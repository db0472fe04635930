//! The single-writer state container.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::action::{Action, PhaseTag};
use crate::inflight::{InflightGuard, InflightTracker};
use crate::tap::StateTap;
use crate::take_latest::{LatestTracker, Ticket};

/// Pure state transition. No IO, no async.
pub trait Reducer<S, A>: Send + Sync + 'static {
    fn reduce(&self, state: &mut S, action: &A);
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&mut S, &A) + Send + Sync + 'static,
{
    fn reduce(&self, state: &mut S, action: &A) {
        self(state, action)
    }
}

/// An action waiting for the saga loop, holding its in-flight slot.
pub(crate) struct Queued<A> {
    pub(crate) action: A,
    /// Issued for request actions when they were reduced.
    pub(crate) ticket: Option<Ticket>,
    pub(crate) _guard: InflightGuard,
}

struct StoreInner<S, A> {
    state: watch::Sender<S>,
    reducer: Box<dyn Reducer<S, A>>,
    taps: Vec<Arc<dyn StateTap<S, A>>>,
    outbox: mpsc::UnboundedSender<Queued<A>>,
    latest: LatestTracker,
    inflight: InflightTracker,
}

/// Process-wide state tree.
///
/// The state is only ever written here, by the root reducer. Sagas and
/// callers read snapshots and dispatch actions.
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Default + Send + Sync + 'static,
    A: Action,
{
    pub(crate) fn new(
        initial: S,
        reducer: Box<dyn Reducer<S, A>>,
        taps: Vec<Arc<dyn StateTap<S, A>>>,
    ) -> (Self, mpsc::UnboundedReceiver<Queued<A>>) {
        let (state, _) = watch::channel(initial);
        let (outbox, inbox) = mpsc::unbounded_channel();
        let store = Self {
            inner: Arc::new(StoreInner {
                state,
                reducer,
                taps,
                outbox,
                latest: LatestTracker::new(),
                inflight: InflightTracker::new(),
            }),
        };
        (store, inbox)
    }

    /// Reduces `action` into the state, notifies taps, then hands the action
    /// to the sagas.
    ///
    /// A reset action restores `S::default()` without consulting the reducer
    /// and invalidates every in-flight saga result first. A request action
    /// supersedes any earlier request of the same kind.
    pub fn dispatch(&self, action: A) {
        self.dispatch_checked(action, None);
    }

    /// Dispatches a saga's effects, but only if `ticket` is still the latest
    /// request of its kind. Returns whether they were applied.
    pub(crate) fn dispatch_effects(&self, ticket: &Ticket, effects: impl IntoIterator<Item = A>) -> bool {
        let mut effects = effects.into_iter();
        let Some(first) = effects.next() else {
            return true;
        };
        if !self.dispatch_checked(first, Some(ticket)) {
            return false;
        }
        effects.for_each(|effect| self.dispatch(effect));
        true
    }

    fn dispatch_checked(&self, action: A, guard: Option<&Ticket>) -> bool {
        let kind = action.kind();
        let reset = action.is_reset();
        let inner = &*self.inner;
        let mut accepted = true;

        // The generation check, the bump, the reduction, the taps and the
        // hand-off to the sagas all happen under the state write lock, so
        // taps and sagas see actions in reduction order.
        inner.state.send_if_modified(|state| {
            if let Some(guard) = guard {
                if !inner.latest.is_current(guard) {
                    accepted = false;
                    return false;
                }
            }
            let mut ticket = None;
            if reset {
                inner.latest.reset_all();
                *state = S::default();
            } else {
                if kind.phase == PhaseTag::Request {
                    ticket = Some(inner.latest.begin(kind));
                }
                inner.reducer.reduce(state, &action);
            }

            for tap in &inner.taps {
                tap.on_dispatch(&action, state);
            }

            let queued = Queued {
                action,
                ticket,
                _guard: inner.inflight.enter(),
            };
            if inner.outbox.send(queued).is_err() {
                tracing::trace!(action = %kind, "no saga loop running; action not routed");
            }
            true
        });

        if !accepted {
            tracing::debug!(action = %kind, "dropping superseded result");
            return false;
        }
        if reset {
            tracing::debug!(action = %kind, "state tree reset");
        } else {
            tracing::trace!(action = %kind, "dispatched");
        }
        true
    }

    /// Snapshot of the whole tree.
    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.inner.state.borrow().clone()
    }

    /// Reads a projection of the current state without cloning the tree.
    pub fn select<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Receiver notified after every reduction.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.inner.state.subscribe()
    }

    pub(crate) fn latest(&self) -> &LatestTracker {
        &self.inner.latest
    }

    pub(crate) fn inflight(&self) -> &InflightTracker {
        &self.inner.inflight
    }
}
