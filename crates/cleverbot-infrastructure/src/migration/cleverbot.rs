//! Whole-document and root-entity migrations.
//!
//! The global chain handles the layout changes (positional tuple to entity
//! nodes); the `cleverbot` chain reshapes the root's own state once it is a
//! node.

use super::entity::EntityKind;
use super::traits::{Direction, Migration, TypedMigration, apply_typed};
use crate::dto::{
    CleverbotStateV2_5_0, CleverbotStateV3_0_0, ConversationStateV2_5_0, ConversationsV2_5_0,
    ConversationsV3_0_0, EntityNode, LegacyConversationV2_1_1, LegacyConversationV2_4_0,
    LegacyRootV2_1_1, LegacyRootV2_4_0, LegacyStateV2_1_1, LegacyStateV2_4_0, MoodsV3_0_0,
    SCHEMA_V2_2_0, SCHEMA_V2_5_0, SCHEMA_V3_0_0,
};
use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use serde_json::Value;

type NodeV2_5_0 = EntityNode<CleverbotStateV2_5_0<EntityNode<ConversationStateV2_5_0>>>;

/// Backward across 2.2.0: moods did not exist before it.
#[derive(Debug)]
pub struct DropMoods;

impl Migration for DropMoods {
    fn boundary(&self) -> Version {
        SCHEMA_V2_2_0
    }

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn description(&self) -> &str {
        "Moods will be lost for Cleverbot and its conversations."
    }

    fn is_lossy(&self) -> bool {
        true
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, LegacyStateV2_4_0, LegacyStateV2_1_1>(self, payload)
    }
}

impl TypedMigration<LegacyStateV2_4_0, LegacyStateV2_1_1> for DropMoods {
    fn migrate(&self, LegacyStateV2_4_0(root, conversations): LegacyStateV2_4_0) -> Result<LegacyStateV2_1_1> {
        let root = LegacyRootV2_1_1 {
            key: root.key,
            continuation: root.continuation,
            timeout: root.timeout,
        };
        let conversations = conversations
            .into_iter()
            .map(|c| LegacyConversationV2_1_1 {
                name: c.name,
                continuation: c.continuation,
                key: c.key,
                timeout: c.timeout,
            })
            .collect();
        Ok(LegacyStateV2_1_1(root, conversations))
    }
}

/// Forward across 2.5.0: the positional pair becomes a `cleverbot` node.
///
/// Accepts 2.1.1 tuples as well, their missing moods read as unset.
#[derive(Debug)]
pub struct PositionalToNode;

impl Migration for PositionalToNode {
    fn boundary(&self) -> Version {
        SCHEMA_V2_5_0
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn description(&self) -> &str {
        "Nameless conversations will be lost."
    }

    fn is_lossy(&self) -> bool {
        true
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, LegacyStateV2_4_0, NodeV2_5_0>(self, payload)
    }
}

impl TypedMigration<LegacyStateV2_4_0, NodeV2_5_0> for PositionalToNode {
    fn migrate(&self, LegacyStateV2_4_0(root, conversations): LegacyStateV2_4_0) -> Result<NodeV2_5_0> {
        let total = conversations.len();
        let named: std::collections::BTreeMap<_, _> = conversations
            .into_iter()
            .filter_map(|c| {
                let name = c.name.clone()?;
                Some((name, conversation_node(c)))
            })
            .collect();

        if named.len() < total {
            tracing::debug!("Dropping {} nameless conversation(s)", total - named.len());
        }

        let conversations = (!named.is_empty()).then_some(ConversationsV2_5_0::Named(named));
        Ok(EntityNode::new(
            EntityKind::Cleverbot,
            &SCHEMA_V2_5_0,
            CleverbotStateV2_5_0 {
                key: root.key,
                continuation: root.continuation,
                timeout: root.timeout,
                mood1: root.mood1,
                mood2: root.mood2,
                mood3: root.mood3,
                conversations,
            },
        ))
    }
}

fn conversation_node(c: LegacyConversationV2_4_0) -> EntityNode<ConversationStateV2_5_0> {
    EntityNode::new(
        EntityKind::Conversation,
        &SCHEMA_V2_5_0,
        ConversationStateV2_5_0 {
            continuation: c.continuation,
            key: c.key,
            timeout: c.timeout,
            mood1: c.mood1,
            mood2: c.mood2,
            mood3: c.mood3,
        },
    )
}

/// Backward across 2.5.0: a `cleverbot` node flattens into the positional pair.
#[derive(Debug)]
pub struct NodeToPositional;

impl Migration for NodeToPositional {
    fn boundary(&self) -> Version {
        SCHEMA_V2_5_0
    }

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn description(&self) -> &str {
        "Flatten Cleverbot entity into the positional layout"
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, NodeV2_5_0, LegacyStateV2_4_0>(self, payload)
    }
}

impl TypedMigration<NodeV2_5_0, LegacyStateV2_4_0> for NodeToPositional {
    fn migrate(&self, node: NodeV2_5_0) -> Result<LegacyStateV2_4_0> {
        if node.kind != EntityKind::Cleverbot {
            return Err(CleverbotError::structural(format!(
                "Top-level object needs to be Cleverbot, found {}",
                node.kind.name()
            )));
        }
        let state = node.state;

        let conversations = match state.conversations {
            None => Vec::new(),
            Some(ConversationsV2_5_0::Named(map)) => map
                .into_iter()
                .map(|(name, node)| legacy_conversation(Some(name), node))
                .collect::<Result<_>>()?,
            Some(ConversationsV2_5_0::Unnamed(nodes)) => nodes
                .into_iter()
                .map(|node| legacy_conversation(None, node))
                .collect::<Result<_>>()?,
        };

        let root = LegacyRootV2_4_0 {
            key: state.key,
            continuation: state.continuation,
            timeout: state.timeout,
            mood1: state.mood1,
            mood2: state.mood2,
            mood3: state.mood3,
        };
        Ok(LegacyStateV2_4_0(root, conversations))
    }
}

fn legacy_conversation(
    name: Option<String>,
    node: EntityNode<ConversationStateV2_5_0>,
) -> Result<LegacyConversationV2_4_0> {
    if node.kind != EntityKind::Conversation {
        return Err(CleverbotError::structural(format!(
            "Conversations need to be Conversation entities, found {}",
            node.kind.name()
        )));
    }
    let c = node.state;
    Ok(LegacyConversationV2_4_0 {
        name,
        continuation: c.continuation,
        key: c.key,
        timeout: c.timeout,
        mood1: c.mood1,
        mood2: c.mood2,
        mood3: c.mood3,
    })
}

/// Forward across 3.0.0 for the root: moods grouped, container tagged.
#[derive(Debug)]
pub struct GroupRootMoods;

impl Migration for GroupRootMoods {
    fn boundary(&self) -> Version {
        SCHEMA_V3_0_0
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn description(&self) -> &str {
        "Group Cleverbot moods and tag the conversation container"
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, CleverbotStateV2_5_0, CleverbotStateV3_0_0>(self, payload)
    }
}

impl TypedMigration<CleverbotStateV2_5_0, CleverbotStateV3_0_0> for GroupRootMoods {
    fn migrate(&self, old: CleverbotStateV2_5_0) -> Result<CleverbotStateV3_0_0> {
        Ok(CleverbotStateV3_0_0 {
            key: old.key,
            continuation: old.continuation,
            timeout: old.timeout,
            moods: MoodsV3_0_0 {
                mood1: old.mood1,
                mood2: old.mood2,
                mood3: old.mood3,
            },
            conversations: old.conversations.map(|c| match c {
                ConversationsV2_5_0::Named(map) => ConversationsV3_0_0::Named(map),
                ConversationsV2_5_0::Unnamed(list) => ConversationsV3_0_0::Unnamed(list),
            }),
        })
    }
}

/// Backward across 3.0.0 for the root.
#[derive(Debug)]
pub struct FlattenRootMoods;

impl Migration for FlattenRootMoods {
    fn boundary(&self) -> Version {
        SCHEMA_V3_0_0
    }

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn description(&self) -> &str {
        "Flatten Cleverbot moods and untag the conversation container"
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, CleverbotStateV3_0_0, CleverbotStateV2_5_0>(self, payload)
    }
}

impl TypedMigration<CleverbotStateV3_0_0, CleverbotStateV2_5_0> for FlattenRootMoods {
    fn migrate(&self, new: CleverbotStateV3_0_0) -> Result<CleverbotStateV2_5_0> {
        Ok(CleverbotStateV2_5_0 {
            key: new.key,
            continuation: new.continuation,
            timeout: new.timeout,
            mood1: new.moods.mood1,
            mood2: new.moods.mood2,
            mood3: new.moods.mood3,
            conversations: new.conversations.map(|c| match c {
                ConversationsV3_0_0::Named(map) => ConversationsV2_5_0::Named(map),
                ConversationsV3_0_0::Unnamed(list) => ConversationsV2_5_0::Unnamed(list),
            }),
        })
    }
}
