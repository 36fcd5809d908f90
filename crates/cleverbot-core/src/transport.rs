//! Transport traits.
//!
//! The clients only need "GET this URL with these query parameters and give
//! me the status and body". Implementations live in `cleverbot-interaction`;
//! tests plug in mocks.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Raw reply from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failures reported by a transport before any reply was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Asynchronous transport shared by a root conversation and its children.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError>;
}

/// Blocking counterpart of [`Transport`].
pub trait BlockingTransport: Send + Sync {
    fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError>;
}
