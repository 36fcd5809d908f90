//! Root conversation DTOs.

use super::conversation::ConversationStateV3_0_0;
use super::node::EntityNode;
use super::{CURRENT_SCHEMA_VERSION, secs_to_timeout, timeout_to_secs};
use crate::migration::EntityKind;
use cleverbot_core::error::{CleverbotError, Result};
use cleverbot_core::state::{Conversations, Moods, RootState, SubState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Conversation container V2.5.0, told apart by its JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversationsV2_5_0<C = Value> {
    Named(BTreeMap<String, C>),
    Unnamed(Vec<C>),
}

/// Root state V2.5.0: the first tagged layout, moods still flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "C: Deserialize<'de>"))]
pub struct CleverbotStateV2_5_0<C = Value> {
    pub key: String,
    #[serde(default)]
    pub continuation: Option<String>,
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default)]
    pub mood1: Option<f64>,
    #[serde(default)]
    pub mood2: Option<f64>,
    #[serde(default)]
    pub mood3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversations: Option<ConversationsV2_5_0<C>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoodsV3_0_0 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood3: Option<f64>,
}

impl MoodsV3_0_0 {
    pub fn is_empty(&self) -> bool {
        self.mood1.is_none() && self.mood2.is_none() && self.mood3.is_none()
    }
}

impl From<&Moods> for MoodsV3_0_0 {
    fn from(moods: &Moods) -> Self {
        Self {
            mood1: moods.mood1,
            mood2: moods.mood2,
            mood3: moods.mood3,
        }
    }
}

impl From<MoodsV3_0_0> for Moods {
    fn from(dto: MoodsV3_0_0) -> Self {
        Moods {
            mood1: dto.mood1,
            mood2: dto.mood2,
            mood3: dto.mood3,
        }
    }
}

/// Conversation container V3.0.0, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationsV3_0_0<C = Value> {
    Named(BTreeMap<String, C>),
    Unnamed(Vec<C>),
}

/// Root state V3.0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "C: Deserialize<'de>"))]
pub struct CleverbotStateV3_0_0<C = Value> {
    pub key: String,
    #[serde(default)]
    pub continuation: Option<String>,
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "MoodsV3_0_0::is_empty")]
    pub moods: MoodsV3_0_0,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversations: Option<ConversationsV3_0_0<C>>,
}

/// A fully typed current-schema snapshot.
pub type CleverbotDocument = EntityNode<CleverbotStateV3_0_0<EntityNode<ConversationStateV3_0_0>>>;

/// Convert RootState (domain) to the current snapshot.
///
/// Only live conversations are written; released slots of a nameless arena
/// are compacted away.
impl From<&RootState> for CleverbotDocument {
    fn from(root: &RootState) -> Self {
        let conversations = root.conversations().map(|conversations| match conversations {
            Conversations::Named(map) => ConversationsV3_0_0::Named(
                map.iter()
                    .map(|(name, sub)| (name.clone(), EntityNode::from(sub)))
                    .collect(),
            ),
            Conversations::Unnamed(_) => ConversationsV3_0_0::Unnamed(
                conversations
                    .iter()
                    .map(|(_, sub)| EntityNode::from(sub))
                    .collect(),
            ),
        });

        EntityNode::new(
            EntityKind::Cleverbot,
            &CURRENT_SCHEMA_VERSION,
            CleverbotStateV3_0_0 {
                key: root.key.clone(),
                continuation: root.continuation().map(str::to_string),
                timeout: timeout_to_secs(root.timeout),
                moods: (&root.moods).into(),
                conversations,
            },
        )
    }
}

/// Convert the current snapshot to RootState (domain).
impl TryFrom<CleverbotDocument> for RootState {
    type Error = CleverbotError;

    fn try_from(node: CleverbotDocument) -> Result<Self> {
        if node.kind != EntityKind::Cleverbot {
            return Err(CleverbotError::structural(format!(
                "Top-level entity needs to be cleverbot, found {}",
                node.kind
            )));
        }
        let state = node.state;

        let conversations = match state.conversations {
            None => None,
            Some(ConversationsV3_0_0::Named(map)) => Some(Conversations::Named(
                map.into_iter()
                    .map(|(name, node)| Ok((name, SubState::try_from(node)?)))
                    .collect::<Result<_>>()?,
            )),
            Some(ConversationsV3_0_0::Unnamed(nodes)) => Some(Conversations::Unnamed(
                nodes
                    .into_iter()
                    .map(|node| SubState::try_from(node).map(Some))
                    .collect::<Result<_>>()?,
            )),
        };

        let mut root = RootState::new(state.key);
        root.timeout = secs_to_timeout(state.timeout)?;
        root.moods = state.moods.into();
        root.set_continuation(state.continuation);
        root.replace_conversations(conversations);
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleverbot_core::state::{ConversationOptions, Mood};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_v2_5_container_is_told_apart_by_shape() {
        let named: ConversationsV2_5_0 = serde_json::from_value(json!({"a": 1})).unwrap();
        assert!(matches!(named, ConversationsV2_5_0::Named(_)));

        let unnamed: ConversationsV2_5_0 = serde_json::from_value(json!([1, 2])).unwrap();
        assert!(matches!(unnamed, ConversationsV2_5_0::Unnamed(ref list) if list.len() == 2));
    }

    #[test]
    fn test_current_layout() {
        let mut root = RootState::new("API_KEY")
            .with_continuation("cs")
            .with_mood(Mood::Wackiness, 75.0);
        root.named_conversation("bob", ConversationOptions::new())
            .unwrap();

        let document = CleverbotDocument::from(&root);
        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "kind": "cleverbot",
                "version": "3.0.0",
                "state": {
                    "key": "API_KEY",
                    "continuation": "cs",
                    "timeout": null,
                    "moods": {"mood1": 75.0},
                    "conversations": {"named": {
                        "bob": {"kind": "conversation", "version": "3.0.0", "state": {"continuation": null}}
                    }}
                }
            })
        );
    }

    #[test]
    fn test_released_slots_are_compacted() {
        let mut root = RootState::new("API_KEY").with_timeout(Duration::from_secs(60));
        let first = root.conversation(ConversationOptions::new()).unwrap();
        root.conversation(ConversationOptions::new().with_continuation("kept"))
            .unwrap();
        root.release(&first).unwrap();

        let restored = RootState::try_from(CleverbotDocument::from(&root)).unwrap();
        let conversations = restored.conversations().unwrap();
        assert_eq!(conversations.len(), 1);
        let (id, sub) = conversations.iter().next().unwrap();
        assert_eq!(id, cleverbot_core::ConversationId::Unnamed(0));
        assert_eq!(sub.continuation(), Some("kept"));
        assert_eq!(restored.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_top_level_must_be_cleverbot() {
        let mut document = CleverbotDocument::from(&RootState::new("k"));
        document.kind = EntityKind::Conversation;
        assert!(RootState::try_from(document).unwrap_err().is_structural());
    }
}
