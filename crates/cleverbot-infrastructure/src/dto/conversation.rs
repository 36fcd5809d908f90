//! Sub-conversation DTOs.

use super::cleverbot::MoodsV3_0_0;
use super::node::EntityNode;
use super::{CURRENT_SCHEMA_VERSION, secs_to_timeout, timeout_to_secs};
use crate::migration::EntityKind;
use cleverbot_core::error::{CleverbotError, Result};
use cleverbot_core::state::{ConversationOptions, Overrides, SubState};
use serde::{Deserialize, Serialize};

/// Conversation state V2.5.0: overrides stored flat next to the continuation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationStateV2_5_0 {
    #[serde(default)]
    pub continuation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood3: Option<f64>,
}

/// Settings a conversation shadows; anything absent falls back to the root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverridesV3_0_0 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "MoodsV3_0_0::is_empty")]
    pub moods: MoodsV3_0_0,
}

impl OverridesV3_0_0 {
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.timeout.is_none() && self.moods.is_empty()
    }
}

/// Conversation state V3.0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationStateV3_0_0 {
    #[serde(default)]
    pub continuation: Option<String>,
    #[serde(default, skip_serializing_if = "OverridesV3_0_0::is_empty")]
    pub overrides: OverridesV3_0_0,
}

impl From<&SubState> for EntityNode<ConversationStateV3_0_0> {
    fn from(sub: &SubState) -> Self {
        EntityNode::new(
            EntityKind::Conversation,
            &CURRENT_SCHEMA_VERSION,
            ConversationStateV3_0_0 {
                continuation: sub.continuation().map(str::to_string),
                overrides: OverridesV3_0_0 {
                    key: sub.overrides.key.clone(),
                    timeout: timeout_to_secs(sub.overrides.timeout),
                    moods: (&sub.overrides.moods).into(),
                },
            },
        )
    }
}

impl TryFrom<EntityNode<ConversationStateV3_0_0>> for SubState {
    type Error = CleverbotError;

    fn try_from(node: EntityNode<ConversationStateV3_0_0>) -> Result<Self> {
        if node.kind != EntityKind::Conversation {
            return Err(CleverbotError::structural(format!(
                "Expected a conversation entity, found {}",
                node.kind
            )));
        }
        let state = node.state;
        Ok(SubState::new(ConversationOptions {
            continuation: state.continuation,
            overrides: Overrides {
                key: state.overrides.key,
                timeout: secs_to_timeout(state.overrides.timeout)?,
                moods: state.overrides.moods.into(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleverbot_core::state::Mood;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_empty_overrides_are_omitted() {
        let sub = SubState::new(ConversationOptions::new().with_continuation("cs"));
        let node = EntityNode::<ConversationStateV3_0_0>::from(&sub);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"kind": "conversation", "version": "3.0.0", "state": {"continuation": "cs"}})
        );
    }

    #[test]
    fn test_sub_state_conversion() {
        let sub = SubState::new(
            ConversationOptions::new()
                .with_key("SUB")
                .with_timeout(Duration::from_secs(5))
                .with_mood(Mood::Talkativeness, 30.0),
        );
        let node = EntityNode::<ConversationStateV3_0_0>::from(&sub);
        assert_eq!(node.state.overrides.moods.mood2, Some(30.0));

        let restored = SubState::try_from(node).unwrap();
        assert_eq!(restored, sub);
    }

    #[test]
    fn test_wrong_kind_is_structural() {
        let node = EntityNode::untagged(EntityKind::Cleverbot, ConversationStateV3_0_0::default());
        assert!(SubState::try_from(node).unwrap_err().is_structural());
    }
}
