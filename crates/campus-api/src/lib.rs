//! REST access for campus sagas.
//!
//! Every operation is one HTTP request built by [`endpoints`], sent through
//! an [`ApiClient`] and judged by [`settle`]. The [`Transport`] trait is the
//! seam: [`HttpTransport`] talks to the real backend, tests script replies.
//!
//! Failure handling follows one rule: whatever went wrong, the caller gets an
//! [`ApiErrorEnvelope`](campus_core::ApiErrorEnvelope) it can put into a
//! `Failure` action.

mod client;
mod config;
pub mod endpoints;
mod settle;
mod transport;
mod types;

pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError, BASE_URL_VAR, DEFAULT_BASE_URL, TIMEOUT_VAR};
pub use settle::{settle, OpClass, NO_DATA_MESSAGE};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError, DEFAULT_TIMEOUT};
pub use types::{ApiEnvelope, EntityId, ListQuery, Page, PageQuery};

pub use reqwest::Method;
