//! Conversational clients.
//!
//! - `asynchronous`: [`Cleverbot`] over an async [`crate::transport::Transport`]
//! - `blocking`: [`BlockingCleverbot`] over a [`crate::transport::BlockingTransport`]
//! - `query`: request parameters and reply decoding shared by both

mod asynchronous;
mod blocking;
mod query;

pub use asynchronous::Cleverbot;
pub use blocking::BlockingCleverbot;
pub use query::{API_URL, Query, Reply, Say, WRAPPER_TAG, interpret};
