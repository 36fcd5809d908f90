//! Root and sub-conversation state.

use super::mood::{Mood, Moods};
use super::reply::ReplyData;
use crate::error::{CleverbotError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Identifies a sub-conversation inside its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversationId {
    Named(String),
    /// Arena slot of a nameless conversation
    Unnamed(usize),
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationId::Named(name) => write!(f, "{name:?}"),
            ConversationId::Unnamed(index) => write!(f, "#{index}"),
        }
    }
}

/// Per-conversation settings that shadow the root's values when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub key: Option<String>,
    pub timeout: Option<Duration>,
    pub moods: Moods,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.timeout.is_none() && self.moods.is_empty()
    }
}

/// Arguments for the conversation factories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationOptions {
    pub continuation: Option<String>,
    pub overrides: Overrides,
}

impl ConversationOptions {
    /// Options that inherit every setting from the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the root's API key for this conversation.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.overrides.key = Some(key.into());
        self
    }

    /// Starts the conversation from an existing continuation token.
    pub fn with_continuation(mut self, continuation: impl Into<String>) -> Self {
        self.continuation = Some(continuation.into());
        self
    }

    /// Overrides the root's request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.overrides.timeout = Some(timeout);
        self
    }

    /// Overrides one of the root's moods.
    pub fn with_mood(mut self, mood: Mood, value: f64) -> Self {
        self.overrides.moods.set(mood, Some(value));
        self
    }
}

/// State of one nested conversation.
///
/// It holds no reference to its root; settings it does not override are
/// resolved against the root through [`ConversationView`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubState {
    pub overrides: Overrides,
    data: ReplyData,
}

impl SubState {
    pub fn new(options: ConversationOptions) -> Self {
        Self {
            overrides: options.overrides,
            data: ReplyData {
                cs: options.continuation,
                ..ReplyData::default()
            },
        }
    }

    pub fn continuation(&self) -> Option<&str> {
        self.data.cs.as_deref()
    }

    pub fn set_continuation(&mut self, continuation: Option<String>) {
        self.data.cs = continuation;
    }

    /// Data from the latest reply in this conversation.
    pub fn data(&self) -> &ReplyData {
        &self.data
    }

    pub fn set_data(&mut self, data: ReplyData) {
        self.data = data;
    }

    /// Forgets the continuation and every reply field.
    pub fn reset(&mut self) {
        self.data = ReplyData::default();
    }
}

/// Sub-conversations of a root; the shape is fixed by the first factory call.
///
/// Named conversations are ordered by name, not by creation. Snapshots keep
/// that order, including the positional lists written for schemas before
/// 2.5.0. Nameless conversations keep their creation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversations {
    /// Keyed and iterated in name order
    Named(BTreeMap<String, SubState>),
    /// Index-stable arena; released slots stay `None`
    Unnamed(Vec<Option<SubState>>),
}

impl Conversations {
    /// Iterates live conversations: named ones by name, nameless ones by
    /// slot index.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (ConversationId, &SubState)> + '_> {
        match self {
            Conversations::Named(map) => Box::new(
                map.iter()
                    .map(|(name, sub)| (ConversationId::Named(name.clone()), sub)),
            ),
            Conversations::Unnamed(slots) => Box::new(
                slots
                    .iter()
                    .enumerate()
                    .filter_map(|(index, slot)| {
                        slot.as_ref().map(|sub| (ConversationId::Unnamed(index), sub))
                    }),
            ),
        }
    }

    fn iter_mut(&mut self) -> Box<dyn Iterator<Item = &mut SubState> + '_> {
        match self {
            Conversations::Named(map) => Box::new(map.values_mut()),
            Conversations::Unnamed(slots) => Box::new(slots.iter_mut().flatten()),
        }
    }

    /// Number of live conversations.
    pub fn len(&self) -> usize {
        match self {
            Conversations::Named(map) => map.len(),
            Conversations::Unnamed(slots) => slots.iter().filter(|s| s.is_some()).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Conversations::Named(_))
    }
}

/// The primary conversational entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RootState {
    pub key: String,
    pub timeout: Option<Duration>,
    pub moods: Moods,
    data: ReplyData,
    conversations: Option<Conversations>,
}

impl RootState {
    /// Creates a fresh root with no continuation, timeout, moods or
    /// conversations.
    ///
    /// # Arguments
    ///
    /// * `key` - The API key sent with every request
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            timeout: None,
            moods: Moods::default(),
            data: ReplyData::default(),
            conversations: None,
        }
    }

    /// Resumes the root conversation from a continuation token.
    pub fn with_continuation(mut self, continuation: impl Into<String>) -> Self {
        self.data.cs = Some(continuation.into());
        self
    }

    /// Sets the request timeout inherited by every conversation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_mood(mut self, mood: Mood, value: f64) -> Self {
        self.moods.set(mood, Some(value));
        self
    }

    /// The token the next root request resumes from, if any.
    pub fn continuation(&self) -> Option<&str> {
        self.data.cs.as_deref()
    }

    pub fn set_continuation(&mut self, continuation: Option<String>) {
        self.data.cs = continuation;
    }

    /// Data from the latest reply to the root conversation.
    pub fn data(&self) -> &ReplyData {
        &self.data
    }

    pub fn set_data(&mut self, data: ReplyData) {
        self.data = data;
    }

    pub fn conversations(&self) -> Option<&Conversations> {
        self.conversations.as_ref()
    }

    /// Replaces every sub-conversation at once.
    pub fn replace_conversations(&mut self, conversations: Option<Conversations>) {
        self.conversations = conversations;
    }

    /// Creates (or replaces) a named conversation.
    ///
    /// # Arguments
    ///
    /// * `name` - Key of the conversation; an existing entry is replaced
    /// * `options` - Continuation and overrides of the new conversation
    ///
    /// # Errors
    ///
    /// Returns `Structural` once nameless conversations exist.
    pub fn named_conversation(
        &mut self,
        name: impl Into<String>,
        options: ConversationOptions,
    ) -> Result<ConversationId> {
        let name = name.into();
        let map = match self
            .conversations
            .get_or_insert_with(|| Conversations::Named(BTreeMap::new()))
        {
            Conversations::Named(map) => map,
            Conversations::Unnamed(_) => {
                return Err(CleverbotError::structural(
                    "Can't mix named conversations with nameless ones",
                ));
            }
        };
        if map.insert(name.clone(), SubState::new(options)).is_some() {
            tracing::debug!("Replaced named conversation {:?}", name);
        }
        Ok(ConversationId::Named(name))
    }

    /// Creates a nameless conversation in the next arena slot.
    ///
    /// # Errors
    ///
    /// Returns `Structural` once named conversations exist.
    pub fn conversation(&mut self, options: ConversationOptions) -> Result<ConversationId> {
        match self
            .conversations
            .get_or_insert_with(|| Conversations::Unnamed(Vec::new()))
        {
            Conversations::Unnamed(slots) => {
                slots.push(Some(SubState::new(options)));
                Ok(ConversationId::Unnamed(slots.len() - 1))
            }
            Conversations::Named(_) => Err(CleverbotError::structural(
                "Can't mix nameless conversations with named ones",
            )),
        }
    }

    /// Reclaims a nameless conversation; other slots keep their index.
    ///
    /// # Errors
    ///
    /// Returns `Structural` for named ids, which are owned by their mapping,
    /// and for unknown or already released slots.
    pub fn release(&mut self, id: &ConversationId) -> Result<SubState> {
        match (id, self.conversations.as_mut()) {
            (ConversationId::Unnamed(index), Some(Conversations::Unnamed(slots))) => slots
                .get_mut(*index)
                .and_then(Option::take)
                .ok_or_else(|| unknown_conversation(id)),
            (ConversationId::Named(_), _) => Err(CleverbotError::structural(
                "Named conversations are retained by their mapping",
            )),
            _ => Err(unknown_conversation(id)),
        }
    }

    pub fn sub_state(&self, id: &ConversationId) -> Option<&SubState> {
        match (id, self.conversations.as_ref()?) {
            (ConversationId::Named(name), Conversations::Named(map)) => map.get(name),
            (ConversationId::Unnamed(index), Conversations::Unnamed(slots)) => {
                slots.get(*index)?.as_ref()
            }
            _ => None,
        }
    }

    pub fn sub_state_mut(&mut self, id: &ConversationId) -> Option<&mut SubState> {
        match (id, self.conversations.as_mut()?) {
            (ConversationId::Named(name), Conversations::Named(map)) => map.get_mut(name),
            (ConversationId::Unnamed(index), Conversations::Unnamed(slots)) => {
                slots.get_mut(*index)?.as_mut()
            }
            _ => None,
        }
    }

    /// Returns a view that resolves the conversation's effective settings.
    pub fn view(&self, id: &ConversationId) -> Option<ConversationView<'_>> {
        self.sub_state(id).map(|sub| ConversationView { root: self, sub })
    }

    /// Like [`RootState::view`] but fails for unknown or released ids.
    pub fn try_view(&self, id: &ConversationId) -> Result<ConversationView<'_>> {
        self.view(id).ok_or_else(|| unknown_conversation(id))
    }

    /// Clears the root's reply data and that of every conversation.
    ///
    /// Membership is left untouched.
    pub fn reset(&mut self) {
        self.data = ReplyData::default();
        if let Some(conversations) = self.conversations.as_mut() {
            for sub in conversations.iter_mut() {
                sub.reset();
            }
        }
    }
}

fn unknown_conversation(id: &ConversationId) -> CleverbotError {
    CleverbotError::structural(format!("Unknown conversation {id}"))
}

/// A sub-conversation read through its root.
///
/// Unset overrides fall back to the root's current values at read time.
#[derive(Debug, Clone, Copy)]
pub struct ConversationView<'a> {
    root: &'a RootState,
    sub: &'a SubState,
}

impl<'a> ConversationView<'a> {
    pub fn key(&self) -> &'a str {
        self.sub.overrides.key.as_deref().unwrap_or(&self.root.key)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.sub.overrides.timeout.or(self.root.timeout)
    }

    pub fn mood(&self, mood: Mood) -> Option<f64> {
        self.sub
            .overrides
            .moods
            .get(mood)
            .or_else(|| self.root.moods.get(mood))
    }

    pub fn moods(&self) -> Moods {
        self.sub.overrides.moods.or(&self.root.moods)
    }

    pub fn continuation(&self) -> Option<&'a str> {
        self.sub.continuation()
    }

    pub fn sub_state(&self) -> &'a SubState {
        self.sub
    }
}
