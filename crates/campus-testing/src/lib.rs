//! Testing utilities for campus sagas and stores.
//!
//! - [`MockTransport`] answers API calls from a script, so sagas run
//!   against a deterministic backend.
//! - [`ActionRecorder`] is a tap that keeps every dispatched action.
//!
//! # Example
//!
//! ```ignore
//! use campus_testing::{MockTransport, Reply};
//! use campus_api::{ApiClient, Method};
//! use serde_json::json;
//!
//! let mock = MockTransport::new()
//!     .on(Method::GET, "students", Reply::ok(json!([{ "_id": "s1" }])));
//! let api = ApiClient::new(std::sync::Arc::new(mock.clone()));
//! ```

mod recorder;
mod transport;

pub use recorder::ActionRecorder;
pub use transport::{MockTransport, Reply};
