//! Root composition: one store, every saga, one routing loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::action::Action;
use crate::error::EngineError;
use crate::saga::{Effects, Saga, SagaContext};
use crate::store::{Queued, Reducer, Store};
use crate::tap::StateTap;
use crate::take_latest::Ticket;

/// Collects the reducer, sagas and taps for one state tree.
pub struct EngineBuilder<S, A, D> {
    deps: D,
    initial: S,
    reducer: Option<Box<dyn Reducer<S, A>>>,
    sagas: Vec<Arc<dyn Saga<S, A, D>>>,
    taps: Vec<Arc<dyn StateTap<S, A>>>,
}

impl<S, A, D> EngineBuilder<S, A, D>
where
    S: Default + Send + Sync + 'static,
    A: Action,
    D: Send + Sync + 'static,
{
    pub fn new(deps: D) -> Self {
        Self {
            deps,
            initial: S::default(),
            reducer: None,
            sagas: Vec::new(),
            taps: Vec::new(),
        }
    }

    /// Starts from `initial` instead of `S::default()`, e.g. rehydrated state.
    pub fn with_state(mut self, initial: S) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_reducer<R: Reducer<S, A>>(mut self, reducer: R) -> Self {
        self.reducer = Some(Box::new(reducer));
        self
    }

    pub fn with_saga<G: Saga<S, A, D>>(mut self, saga: G) -> Self {
        self.sagas.push(Arc::new(saga));
        self
    }

    pub fn with_tap<T: StateTap<S, A>>(mut self, tap: T) -> Self {
        self.taps.push(Arc::new(tap));
        self
    }

    pub fn build(self) -> Engine<S, A, D> {
        let reducer: Box<dyn Reducer<S, A>> = match self.reducer {
            Some(reducer) => reducer,
            None => Box::new(|_: &mut S, _: &A| {}),
        };
        let (store, inbox) = Store::new(self.initial, reducer, self.taps);
        Engine {
            store,
            inbox,
            sagas: self.sagas,
            deps: Arc::new(self.deps),
        }
    }
}

/// A built but not yet running engine.
pub struct Engine<S, A, D> {
    store: Store<S, A>,
    inbox: mpsc::UnboundedReceiver<Queued<A>>,
    sagas: Vec<Arc<dyn Saga<S, A, D>>>,
    deps: Arc<D>,
}

impl<S, A, D> Engine<S, A, D>
where
    S: Default + Send + Sync + 'static,
    A: Action,
    D: Send + Sync + 'static,
{
    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }

    /// Spawns the routing loop on the current tokio runtime.
    pub fn start(self) -> EngineHandle<S, A> {
        let store = self.store.clone();
        let task = tokio::spawn(self.run());
        EngineHandle { store, task }
    }

    /// Routes every dispatched action to the sagas that watch it, forever.
    pub async fn run(self) {
        let Engine {
            store,
            mut inbox,
            sagas,
            deps,
        } = self;
        tracing::debug!(sagas = sagas.len(), "engine started");

        while let Some(Queued {
            action,
            ticket,
            _guard,
        }) = inbox.recv().await
        {
            let kind = action.kind();
            for saga in &sagas {
                if !saga.watches(&action) {
                    continue;
                }
                let ticket = ticket.unwrap_or_else(|| store.latest().begin(kind));
                if !store.latest().is_current(&ticket) {
                    tracing::debug!(saga = saga.name(), action = %kind, "request superseded before start");
                    continue;
                }
                spawn_handler(&store, Arc::clone(saga), Arc::clone(&deps), action.clone(), ticket);
            }
        }

        tracing::debug!("engine stopped");
    }
}

fn spawn_handler<S, A, D>(
    store: &Store<S, A>,
    saga: Arc<dyn Saga<S, A, D>>,
    deps: Arc<D>,
    action: A,
    ticket: Ticket,
) where
    S: Default + Send + Sync + 'static,
    A: Action,
    D: Send + Sync + 'static,
{
    let kind = action.kind();
    let guard = store.inflight().enter();
    let ctx = SagaContext::new(deps, store.subscribe());
    let correlation_id = ctx.correlation_id();
    let name = saga.name();
    tracing::debug!(saga = name, action = %kind, %correlation_id, "saga started");

    let task_store = store.clone();
    let task = tokio::spawn(async move {
        let _guard = guard;
        match AssertUnwindSafe(saga.handle(action, ctx)).catch_unwind().await {
            Ok(effects) => apply_effects(&task_store, &ticket, effects),
            Err(panic) => {
                let err = EngineError::SagaPanicked {
                    saga: name,
                    message: panic_message(panic.as_ref()),
                };
                tracing::error!(action = %kind, %correlation_id, error = %err, "saga handler crashed");
            }
        }
    });
    store.latest().attach(&ticket, task.abort_handle());
}

fn apply_effects<S, A>(store: &Store<S, A>, ticket: &Ticket, effects: Effects<A>)
where
    S: Default + Send + Sync + 'static,
    A: Action,
{
    if store.dispatch_effects(ticket, effects) {
        tracing::debug!(action = %ticket.kind(), "saga committed");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Handle to a running engine.
pub struct EngineHandle<S, A> {
    store: Store<S, A>,
    task: JoinHandle<()>,
}

impl<S, A> EngineHandle<S, A>
where
    S: Default + Send + Sync + 'static,
    A: Action,
{
    pub fn dispatch(&self, action: A) {
        self.store.dispatch(action);
    }

    /// Dispatches `action` and waits until it and everything it triggered
    /// has resolved.
    pub async fn dispatch_and_await(&self, action: A) -> Result<(), EngineError> {
        if self.task.is_finished() {
            return Err(EngineError::Stopped);
        }
        self.store.dispatch(action);
        self.settled().await;
        Ok(())
    }

    /// Waits until no action is queued and no saga is running.
    pub async fn settled(&self) {
        self.store.inflight().settled().await;
    }

    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.store.state()
    }

    pub fn select<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.store.select(f)
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }

    /// Stops routing and abandons every in-flight saga.
    pub fn shutdown(self) {
        self.store.latest().reset_all();
        self.task.abort();
    }
}
