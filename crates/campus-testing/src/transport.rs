//! Scripted transport.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use campus_api::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use serde_json::{json, Value};
use tokio::sync::Notify;

/// What a scripted route answers with.
#[derive(Debug, Clone)]
enum Outcome {
    Respond { status: u16, body: Value },
    Unreachable(String),
}

/// One scripted answer, optionally delayed or held until released.
#[derive(Debug, Clone)]
pub struct Reply {
    outcome: Outcome,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
}

impl Reply {
    /// Any status. 2xx resolves, everything else fails the way an HTTP
    /// client does on error statuses.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            outcome: Outcome::Respond { status, body },
            delay: None,
            gate: None,
        }
    }

    /// `200 {success: true, data}`.
    pub fn ok(data: Value) -> Self {
        Self::json(200, json!({ "success": true, "data": data }))
    }

    /// `201 {success: true, data, message}`.
    pub fn created(data: Value, message: &str) -> Self {
        Self::json(201, json!({ "success": true, "data": data, "message": message }))
    }

    /// Error status with `{message, errors}`.
    pub fn rejected(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "success": false, "message": message, "errors": [] }))
    }

    /// The call never reaches the server.
    pub fn unreachable(reason: &str) -> Self {
        Self {
            outcome: Outcome::Unreachable(reason.to_owned()),
            delay: None,
            gate: None,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds the reply until `gate` is notified.
    pub fn held(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

type RouteKey = (Method, String);

#[derive(Default)]
struct Script {
    routes: HashMap<RouteKey, VecDeque<Reply>>,
    calls: Vec<ApiRequest>,
}

/// In-memory [`Transport`] answering from scripted routes.
///
/// Replies for a route are consumed in order; the last one repeats. Every
/// request is recorded.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    arrived: Arc<Notify>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .routes
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: &Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|call| &call.method == method && call.path == path)
            .collect()
    }

    /// Waits until at least `count` requests have arrived.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> Result<()> {
        let wait = async {
            loop {
                let arrived = self.arrived.notified();
                if self.calls().len() >= count {
                    return;
                }
                arrived.await;
            }
        };
        if tokio::time::timeout(timeout, wait).await.is_err() {
            bail!("expected {count} calls, saw {}", self.calls().len());
        }
        Ok(())
    }

    fn next_reply(&self, request: &ApiRequest) -> Option<Reply> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(request.clone());
        let queue = script
            .routes
            .get_mut(&(request.method.clone(), request.path.clone()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = self.next_reply(&request);
        self.arrived.notify_waiters();

        let Some(reply) = reply else {
            return Err(TransportError::Status {
                status: 404,
                body: json!({ "message": format!("no route for {} {}", request.method, request.path) }),
            });
        };

        if let Some(gate) = &reply.gate {
            gate.notified().await;
        }
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        match reply.outcome {
            Outcome::Respond { status, body } if (200..300).contains(&status) => Ok(ApiResponse::new(status, body)),
            Outcome::Respond { status, body } => Err(TransportError::Status { status, body }),
            Outcome::Unreachable(reason) => Err(TransportError::Network(reason)),
        }
    }
}
