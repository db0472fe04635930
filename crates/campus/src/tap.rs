//! State observation.

/// Observer called after every reduction, with the action and the state it
/// produced.
///
/// Taps run synchronously inside `dispatch`, under the store's write lock and
/// in reduction order. They must not dispatch or read the store themselves.
pub trait StateTap<S, A>: Send + Sync + 'static {
    fn on_dispatch(&self, action: &A, state: &S);
}

impl<S, A, F> StateTap<S, A> for F
where
    F: Fn(&A, &S) + Send + Sync + 'static,
{
    fn on_dispatch(&self, action: &A, state: &S) {
        self(action, state)
    }
}
