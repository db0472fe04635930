//! Lifecycle state of one API-backed operation and the reducer factory that
//! drives it.

use serde::{Deserialize, Serialize};

use crate::action::Phase;
use crate::error::FailurePayload;

/// `{data, loading, error}` for one operation.
///
/// `loading == true` implies `data` and `error` are both empty: a request
/// clears whatever was shown before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> AsyncState<T> {
    pub fn request(&mut self) {
        self.loading = true;
        self.error = None;
        self.data = None;
    }

    /// Overwrites any previous payload, no merging.
    pub fn succeed(&mut self, payload: T) {
        self.loading = false;
        self.data = Some(payload);
        self.error = None;
    }

    pub fn fail(&mut self, payload: &FailurePayload) {
        self.loading = false;
        self.data = None;
        self.error = Some(payload.message().to_owned());
    }

    /// Never requested, or reset.
    pub fn is_idle(&self) -> bool {
        !self.loading && self.data.is_none() && self.error.is_none()
    }
}

/// Reducer factory for one keyed [`AsyncState`] inside a slice `S`.
///
/// Built once per operation from a slice name, a state key and a selector;
/// the three reducers it exposes are the whole lifecycle contract.
///
/// ```ignore
/// let list = AsyncSlice::new("academicYear", "list", |s: &mut CrudState<AcademicYear>| &mut s.list);
/// list.apply(&mut state, &phase);
/// ```
pub struct AsyncSlice<S, T> {
    name: &'static str,
    key: &'static str,
    select: fn(&mut S) -> &mut AsyncState<T>,
}

impl<S, T> AsyncSlice<S, T> {
    pub fn new(name: &'static str, key: &'static str, select: fn(&mut S) -> &mut AsyncState<T>) -> Self {
        Self { name, key, select }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn request(&self, state: &mut S) {
        (self.select)(state).request();
    }

    pub fn success(&self, state: &mut S, payload: T) {
        (self.select)(state).succeed(payload);
    }

    pub fn failure(&self, state: &mut S, payload: &FailurePayload) {
        tracing::debug!(
            slice = self.name,
            key = self.key,
            error = payload.message(),
            "operation failed"
        );
        (self.select)(state).fail(payload);
    }

    /// Routes a lifecycle phase to the matching reducer.
    pub fn apply<R>(&self, state: &mut S, phase: &Phase<R, T>)
    where
        T: Clone,
    {
        match phase {
            Phase::Request(_) => self.request(state),
            Phase::Success(payload) => self.success(state, payload.clone()),
            Phase::Failure(payload) => self.failure(state, payload),
        }
    }
}
