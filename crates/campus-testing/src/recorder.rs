use std::sync::{Arc, Mutex};

use campus_core::{Action, ActionKind, StateTap};

/// Tap that keeps every dispatched action, in dispatch order.
#[derive(Clone)]
pub struct ActionRecorder<A> {
    actions: Arc<Mutex<Vec<A>>>,
}

impl<A> Default for ActionRecorder<A> {
    fn default() -> Self {
        Self {
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A: Action> ActionRecorder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<A> {
        self.actions.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.lock().unwrap().iter().map(Action::kind).collect()
    }

    /// Actions recorded after the first one matching `marker`.
    pub fn after(&self, marker: impl Fn(&A) -> bool) -> Vec<A> {
        self.actions()
            .into_iter()
            .skip_while(|action| !marker(action))
            .skip(1)
            .collect()
    }

    pub fn clear(&self) {
        self.actions.lock().unwrap().clear();
    }
}

impl<S, A: Action> StateTap<S, A> for ActionRecorder<A> {
    fn on_dispatch(&self, action: &A, _state: &S) {
        self.actions.lock().unwrap().push(action.clone());
    }
}
