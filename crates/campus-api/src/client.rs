use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError};

/// Shared handle sagas use to reach the backend.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn http(config: &ApiConfig) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = request.method.clone();
        let path = request.path.clone();
        let started = Instant::now();

        let result = self.transport.send(request).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                tracing::debug!(%method, %path, status = response.status, elapsed_ms, "api call")
            }
            Err(TransportError::Status { status, .. }) => {
                tracing::info!(%method, %path, status, elapsed_ms, "api call rejected")
            }
            Err(err) => tracing::warn!(%method, %path, elapsed_ms, error = %err, "api call failed"),
        }
        result
    }

    /// Sends a request whose construction may itself have failed, e.g. while
    /// encoding its body.
    pub async fn call(
        &self,
        request: Result<ApiRequest, TransportError>,
        token: Option<String>,
    ) -> Result<ApiResponse, TransportError> {
        self.send(request?.bearer(token)).await
    }
}
