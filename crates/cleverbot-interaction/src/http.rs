//! reqwest-backed transports.

use async_trait::async_trait;
use cleverbot_core::error::{CleverbotError, Result};
use cleverbot_core::transport::{BlockingTransport, Transport, TransportError, TransportResponse};
use std::time::Duration;

/// Sent as the `User-Agent` of every request.
pub const USER_AGENT: &str = concat!("cleverbot.rs/", env!("CARGO_PKG_VERSION"));

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(err.to_string())
    }
}

/// Asynchronous HTTP transport.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client that identifies itself with [`USER_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CleverbotError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        timeout: Option<Duration>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut request = self.client.get(url).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        tracing::trace!(status, bytes = body.len(), "Received response");
        Ok(TransportResponse::new(status, body))
    }
}

/// Blocking HTTP transport.
///
/// Must not be created or dropped inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
}

impl BlockingReqwestTransport {
    /// Blocking counterpart of [`ReqwestTransport::new`].
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CleverbotError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl BlockingTransport for BlockingReqwestTransport {
    fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        timeout: Option<Duration>,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut request = self.client.get(url).query(query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        Ok(TransportResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_library() {
        assert!(USER_AGENT.starts_with("cleverbot.rs/"));
        assert!(USER_AGENT.len() > "cleverbot.rs/".len());
    }

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .get("not a url", &[], Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
