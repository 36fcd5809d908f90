//! Request parameters and reply interpretation shared by both clients.

use crate::error::{CleverbotError, Result};
use crate::state::{ConversationView, Mood, Moods, ReplyData, RootState};
use crate::transport::{TransportError, TransportResponse};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// The `getreply` endpoint.
pub const API_URL: &str = "https://www.cleverbot.com/getreply";

/// Client-identifying tag sent with every request.
pub const WRAPPER_TAG: &str = "cleverbot.rs";

static HISTORY_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^vtext([2-9]|[1-9][0-9]+)$").expect("Invalid history param regex"));

/// What to send on one `say` call.
///
/// `history` overrides earlier turns of the conversation: `vtext2` replaces
/// the bot's last line, `vtext3` the user's line before it, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Say {
    pub input: Option<String>,
    pub history: BTreeMap<String, String>,
}

impl Say {
    /// A request without input (lets the bot speak first).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self {
            input: Some(text.into()),
            history: BTreeMap::new(),
        }
    }

    pub fn with_history(mut self, param: impl Into<String>, text: impl Into<String>) -> Self {
        self.history.insert(param.into(), text.into());
        self
    }
}

impl From<&str> for Say {
    fn from(text: &str) -> Self {
        Say::input(text)
    }
}

impl From<String> for Say {
    fn from(text: String) -> Self {
        Say::input(text)
    }
}

/// Query parameters and timeout for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Query {
    pub fn for_root(root: &RootState, say: &Say) -> Result<Self> {
        Self::build(&root.key, root.continuation(), &root.moods, root.timeout, say)
    }

    pub fn for_conversation(view: &ConversationView<'_>, say: &Say) -> Result<Self> {
        Self::build(
            view.key(),
            view.continuation(),
            &view.moods(),
            view.timeout(),
            say,
        )
    }

    fn build(
        key: &str,
        continuation: Option<&str>,
        moods: &Moods,
        timeout: Option<Duration>,
        say: &Say,
    ) -> Result<Self> {
        let mut params = vec![("key".to_string(), key.to_string())];
        if let Some(input) = &say.input {
            params.push(("input".to_string(), input.clone()));
        }
        if let Some(cs) = continuation {
            params.push(("cs".to_string(), cs.to_string()));
        }
        for mood in Mood::all() {
            if let Some(value) = moods.get(*mood) {
                params.push((mood.param().to_string(), value.to_string()));
            }
        }
        for (param, text) in &say.history {
            if !HISTORY_PARAM.is_match(param) {
                return Err(CleverbotError::structural(format!(
                    "Unsupported request parameter {param:?}"
                )));
            }
            params.push((param.clone(), text.clone()));
        }
        params.push(("wrapper".to_string(), WRAPPER_TAG.to_string()));

        Ok(Self { params, timeout })
    }

    /// Returns the value of a parameter, if sent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.as_str())
    }

    /// Maps a transport failure to the public error type.
    pub fn transport_failure(&self, err: TransportError) -> CleverbotError {
        match err {
            TransportError::Timeout => CleverbotError::timeout(self.timeout),
            TransportError::Connection(message) => CleverbotError::Transport(message),
        }
    }
}

/// A successful reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub output: String,
    pub data: ReplyData,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes a transport response into a reply or a typed error.
pub fn interpret(response: TransportResponse) -> Result<Reply> {
    let body: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| CleverbotError::decode(e.to_string()))?;

    if response.status != 200 {
        let error: ApiErrorBody = serde_json::from_value(body).unwrap_or_default();
        let status = error.status.unwrap_or(response.status);
        let message = error
            .error
            .unwrap_or_else(|| format!("HTTP status {}", response.status));
        tracing::debug!(status, %message, "API returned an error");
        return Err(CleverbotError::request(status, message));
    }

    let data: ReplyData =
        serde_json::from_value(body).map_err(|e| CleverbotError::decode(e.to_string()))?;
    let output = data
        .output
        .clone()
        .ok_or_else(|| CleverbotError::decode("Reply has no output field"))?;
    Ok(Reply { output, data })
}
