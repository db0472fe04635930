//! # Campus
//!
//! A single-writer state tree where reducers decide, sagas call the network,
//! and the most recent request always wins.
//!
//! ## Core Concepts
//!
//! Every API-backed operation moves through three phases:
//! - `Request` - the caller asked for something; the operation is loading
//! - `Success` - the call resolved with a payload
//! - `Failure` - the call failed; only the message is kept
//!
//! [`AsyncState`] holds `{data, loading, error}` for one operation and
//! [`AsyncSlice`] is the reducer factory that drives it, so slices never
//! hand-write the same three reducers again.
//!
//! ## Architecture
//!
//! ```text
//! Caller (UI / CLI)
//!     │
//!     ▼ dispatch(Request)
//! Store ── root reducer ── state tree ──► taps (persistence, recorders)
//!     │
//!     ▼ queue
//! Engine.run() loop
//!     │
//!     ├─► Saga A.watches()? ─► spawn handle() ──┐
//!     │      (LatestTracker: begin, abort prev) │
//!     └─► Saga B.watches()? ─► no               │
//!                                               ▼
//!                                  network call (Transport)
//!                                               │
//!                       commit if still latest  │
//!     ◄── dispatch(Success | Failure [, list Request]) ─┘
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Only reducers write state** - sagas and callers dispatch actions
//! 2. **Latest wins** - per action kind, a newer request aborts the older
//!    handler and discards its result
//! 3. **Sagas never fail outward** - every error becomes a `Failure` action
//! 4. **Reset is global** - a reset action restores the default tree and
//!    invalidates all in-flight results
//! 5. **No retries** - a failure is surfaced once
//!
//! ## Example
//!
//! ```ignore
//! use campus_core::{EngineBuilder, Phase};
//!
//! let handle = EngineBuilder::new(api_client)
//!     .with_reducer(reduce)
//!     .with_saga(CrudSaga::<AcademicYear>::new())
//!     .build()
//!     .start();
//!
//! handle
//!     .dispatch_and_await(AppAction::AcademicYear(CrudAction::List(Phase::Request(query))))
//!     .await?;
//!
//! let years = handle.select(|s| s.academic_year.list.data.clone());
//! ```

mod action;
mod async_state;
mod engine;
mod error;
mod inflight;
mod saga;
mod store;
mod tap;
mod take_latest;


#[cfg(test)]
mod stress_tests;

pub use action::{Action, ActionKind, Phase, PhaseTag};

pub use async_state::{AsyncSlice, AsyncState};

pub use error::{ApiErrorEnvelope, EngineError, FailurePayload, UNEXPECTED_ERROR, UNKNOWN_ERROR};

pub use store::{Reducer, Store};

pub use saga::{Effects, Saga, SagaContext};

pub use tap::StateTap;

pub use take_latest::{LatestTracker, Ticket};

pub use engine::{Engine, EngineBuilder, EngineHandle};

pub use inflight::{InflightGuard, InflightTracker};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use smallvec::smallvec;
