//! Asynchronous client.

use super::query::{API_URL, Query, Reply, Say, interpret};
use crate::error::Result;
use crate::state::{ConversationId, ConversationOptions, RootState};
use crate::transport::Transport;
use std::sync::Arc;

/// An asynchronous Cleverbot client.
///
/// Owns the root state; every sub-conversation shares its transport and
/// credentials. `say` takes `&mut self` because it writes the new
/// continuation back into the state.
pub struct Cleverbot {
    state: RootState,
    transport: Arc<dyn Transport>,
    url: String,
}

impl std::fmt::Debug for Cleverbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cleverbot")
            .field("state", &self.state)
            .field("transport", &"<dyn Transport>")
            .field("url", &self.url)
            .finish()
    }
}

impl Cleverbot {
    /// Attaches a transport to a (new or freshly loaded) state.
    pub fn new(state: RootState, transport: Arc<dyn Transport>) -> Self {
        Self {
            state,
            transport,
            url: API_URL.to_string(),
        }
    }

    /// Points the client at another endpoint (a proxy or a test server).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Mutable access to the root, e.g. to change the timeout or moods
    /// between requests.
    pub fn state_mut(&mut self) -> &mut RootState {
        &mut self.state
    }

    /// Drops the transport and returns the state, ready to be saved.
    pub fn into_state(self) -> RootState {
        self.state
    }

    /// Opens a nameless sub-conversation sharing this client's transport.
    ///
    /// # Errors
    ///
    /// Returns `Structural` once named conversations exist.
    pub fn conversation(&mut self, options: ConversationOptions) -> Result<ConversationId> {
        self.state.conversation(options)
    }

    /// Opens (or replaces) a named sub-conversation.
    ///
    /// # Errors
    ///
    /// Returns `Structural` once nameless conversations exist.
    pub fn named_conversation(
        &mut self,
        name: impl Into<String>,
        options: ConversationOptions,
    ) -> Result<ConversationId> {
        self.state.named_conversation(name, options)
    }

    /// Talks in the root conversation and returns the bot's reply.
    ///
    /// # Errors
    ///
    /// - `Request` when the API answers with a non-success status
    /// - `Decode` when the reply is not the expected JSON
    /// - `Timeout` when the transport gives up
    pub async fn say(&mut self, say: impl Into<Say>) -> Result<String> {
        let query = Query::for_root(&self.state, &say.into())?;
        let reply = self.exchange(&query).await?;
        self.state.set_data(reply.data);
        Ok(reply.output)
    }

    /// Talks in a sub-conversation and returns the bot's reply.
    ///
    /// Only that conversation's continuation is updated; the root is left
    /// as it was.
    ///
    /// # Errors
    ///
    /// - `Structural` when `id` is unknown or was released
    /// - the same request errors as [`Cleverbot::say`]
    pub async fn say_in(&mut self, id: &ConversationId, say: impl Into<Say>) -> Result<String> {
        let query = Query::for_conversation(&self.state.try_view(id)?, &say.into())?;
        let reply = self.exchange(&query).await?;
        if let Some(sub) = self.state.sub_state_mut(id) {
            sub.set_data(reply.data);
        }
        Ok(reply.output)
    }

    /// Forgets every continuation while keeping the conversations.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    async fn exchange(&self, query: &Query) -> Result<Reply> {
        tracing::debug!(url = %self.url, params = query.params.len(), "Sending request");
        let response = self
            .transport
            .get(&self.url, &query.params, query.timeout)
            .await
            .map_err(|e| query.transport_failure(e))?;
        interpret(response)
    }
}
