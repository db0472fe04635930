//! The HTTP boundary.

use std::time::Duration;

use async_trait::async_trait;
use campus_core::ApiErrorEnvelope;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;

/// One outgoing call, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        self.body = Some(serde_json::to_value(body).map_err(TransportError::Encode)?);
        Ok(self)
    }

    /// Adds `Authorization: Bearer <token>` when a token is present.
    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// Status and decoded JSON body of a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-2xx response. The body usually carries `{message, errors}`.
    #[error("request failed with status {status}")]
    Status { status: u16, body: Value },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Failure envelope for a call that did not return normally: the embedded
    /// response body's message and errors if there is one, otherwise the
    /// generic fallback.
    pub fn to_envelope(&self) -> ApiErrorEnvelope {
        match self {
            Self::Status { body, .. } => ApiErrorEnvelope::from_body_or_unexpected(body),
            _ => ApiErrorEnvelope::unexpected(),
        }
    }
}

/// Sends requests somewhere. [`HttpTransport`] in production, scripted
/// doubles in tests.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(classify)?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode(err.to_string()))?
        };

        if status.is_success() {
            Ok(ApiResponse::new(status.as_u16(), body))
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response and returns the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (format!("http://{addr}/api"), task)
    }

    fn transport(base_url: String) -> HttpTransport {
        HttpTransport::new(&ApiConfig {
            base_url,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slashes() {
        let transport = transport("http://localhost:4000/api/".into());
        assert_eq!(transport.url("/academic-years"), "http://localhost:4000/api/academic-years");
    }

    #[tokio::test]
    async fn test_success_returns_status_and_body() {
        let (base_url, server) = serve_once("201 Created", r#"{"data":{"_id":"1"},"message":"Created"}"#).await;
        let request = ApiRequest::post("academic-years")
            .json(&json!({ "name": "2025-26" }))
            .unwrap()
            .bearer(Some("tok".into()));

        let response = transport(base_url).send(request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body["message"], "Created");
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/academic-years"));
        assert!(raw.to_lowercase().contains("authorization: bearer tok"));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let (base_url, _server) = serve_once("401 Unauthorized", r#"{"message":"Invalid credentials"}"#).await;

        let err = transport(base_url)
            .send(ApiRequest::post("auth/login"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Status { status: 401, .. }));
        assert_eq!(err.to_envelope().message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_network_error_uses_fallback_message() {
        let envelope = TransportError::Network("connection refused".into()).to_envelope();
        assert_eq!(envelope, ApiErrorEnvelope::unexpected());
    }
}
