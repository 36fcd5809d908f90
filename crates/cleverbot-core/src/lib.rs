//! Core domain of the Cleverbot client: state model, errors, transports and
//! the clients that tie them together.

pub mod client;
pub mod error;
pub mod state;
pub mod transport;

pub use client::{BlockingCleverbot, Cleverbot, Say};
pub use error::{CleverbotError, Result};
pub use state::{ConversationId, ConversationOptions, Mood, Moods, RootState, SubState};
pub use transport::{BlockingTransport, Transport, TransportError, TransportResponse};
