//! Latest-wins under randomized network latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    smallvec, Action, ActionKind, AsyncSlice, AsyncState, Effects, EngineBuilder, Phase, Saga,
    SagaContext,
};

#[derive(Debug, Clone)]
enum LookupAction {
    Lookup(Phase<u64, u64>),
}

impl Action for LookupAction {
    fn kind(&self) -> ActionKind {
        let Self::Lookup(phase) = self;
        ActionKind::new("stress", "lookup", phase.tag())
    }
}

#[derive(Debug, Clone, Default)]
struct LookupState {
    lookup: AsyncState<u64>,
}

fn reduce(state: &mut LookupState, action: &LookupAction) {
    let LookupAction::Lookup(phase) = action;
    AsyncSlice::new("stress", "lookup", |s: &mut LookupState| &mut s.lookup).apply(state, phase);
}

#[derive(Default)]
struct Calls {
    completed: AtomicUsize,
}

/// Sleeps for a random time, then echoes the request.
struct JitterSaga;

#[async_trait::async_trait]
impl Saga<LookupState, LookupAction, Arc<Calls>> for JitterSaga {
    fn name(&self) -> &'static str {
        "jitter"
    }

    fn watches(&self, action: &LookupAction) -> bool {
        matches!(action, LookupAction::Lookup(Phase::Request(_)))
    }

    async fn handle(&self, action: LookupAction, ctx: SagaContext<LookupState, Arc<Calls>>) -> Effects<LookupAction> {
        let LookupAction::Lookup(Phase::Request(value)) = action else {
            return Effects::new();
        };
        tokio::time::sleep(Duration::from_millis(fastrand::u64(0..15))).await;
        ctx.deps().completed.fetch_add(1, Ordering::SeqCst);
        smallvec![LookupAction::Lookup(Phase::Success(value))]
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_latest_request_always_wins() {
    for round in 0..20 {
        let calls = Arc::new(Calls::default());
        let handle = EngineBuilder::new(Arc::clone(&calls))
            .with_reducer(reduce)
            .with_saga(JitterSaga)
            .build()
            .start();

        let requests = 25 + fastrand::u64(0..25);
        for value in 0..requests {
            handle.dispatch(LookupAction::Lookup(Phase::Request(value)));
            if fastrand::bool() {
                tokio::time::sleep(Duration::from_millis(fastrand::u64(0..3))).await;
            }
        }

        tokio::time::timeout(Duration::from_secs(5), handle.settled())
            .await
            .expect("engine did not settle");

        let state = handle.select(|s| s.lookup.clone());
        assert_eq!(state.data, Some(requests - 1), "round {round}");
        assert!(!state.loading, "round {round}");
        assert!(calls.completed.load(Ordering::SeqCst) >= 1);
        handle.shutdown();
    }
}
