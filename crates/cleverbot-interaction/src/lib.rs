//! HTTP transports and configuration for Cleverbot clients.

pub mod config;
pub mod http;

pub use config::{ClientConfig, ConfigLayer};
pub use http::{BlockingReqwestTransport, ReqwestTransport, USER_AGENT};

use cleverbot_core::error::Result;
use cleverbot_core::state::RootState;
use cleverbot_core::{BlockingCleverbot, Cleverbot};
use std::sync::Arc;

/// Wraps `state` in an async client talking to the configured endpoint.
pub fn connect(config: &ClientConfig, state: RootState) -> Result<Cleverbot> {
    let transport = Arc::new(ReqwestTransport::new()?);
    Ok(Cleverbot::new(state, transport).with_url(config.url.clone()))
}

/// Blocking counterpart of [`connect`].
pub fn connect_blocking(config: &ClientConfig, state: RootState) -> Result<BlockingCleverbot> {
    let transport = Arc::new(BlockingReqwestTransport::new()?);
    Ok(BlockingCleverbot::new(state, transport).with_url(config.url.clone()))
}
