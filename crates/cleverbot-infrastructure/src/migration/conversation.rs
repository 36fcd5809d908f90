//! Sub-conversation migrations.

use super::traits::{Direction, Migration, TypedMigration, apply_typed};
use crate::dto::{
    ConversationStateV2_5_0, ConversationStateV3_0_0, MoodsV3_0_0, OverridesV3_0_0, SCHEMA_V3_0_0,
};
use cleverbot_core::error::Result;
use semver::Version;
use serde_json::Value;

/// Forward across 3.0.0: flat overrides grouped under `overrides`.
#[derive(Debug)]
pub struct GroupOverrides;

impl Migration for GroupOverrides {
    fn boundary(&self) -> Version {
        SCHEMA_V3_0_0
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn description(&self) -> &str {
        "Group Conversation overrides"
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, ConversationStateV2_5_0, ConversationStateV3_0_0>(self, payload)
    }
}

impl TypedMigration<ConversationStateV2_5_0, ConversationStateV3_0_0> for GroupOverrides {
    fn migrate(&self, old: ConversationStateV2_5_0) -> Result<ConversationStateV3_0_0> {
        Ok(ConversationStateV3_0_0 {
            continuation: old.continuation,
            overrides: OverridesV3_0_0 {
                key: old.key,
                timeout: old.timeout,
                moods: MoodsV3_0_0 {
                    mood1: old.mood1,
                    mood2: old.mood2,
                    mood3: old.mood3,
                },
            },
        })
    }
}

/// Backward across 3.0.0.
#[derive(Debug)]
pub struct FlattenOverrides;

impl Migration for FlattenOverrides {
    fn boundary(&self) -> Version {
        SCHEMA_V3_0_0
    }

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn description(&self) -> &str {
        "Flatten Conversation overrides"
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        apply_typed::<_, ConversationStateV3_0_0, ConversationStateV2_5_0>(self, payload)
    }
}

impl TypedMigration<ConversationStateV3_0_0, ConversationStateV2_5_0> for FlattenOverrides {
    fn migrate(&self, new: ConversationStateV3_0_0) -> Result<ConversationStateV2_5_0> {
        let overrides = new.overrides;
        Ok(ConversationStateV2_5_0 {
            continuation: new.continuation,
            key: overrides.key,
            timeout: overrides.timeout,
            mood1: overrides.moods.mood1,
            mood2: overrides.moods.mood2,
            mood3: overrides.moods.mood3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_overrides() {
        let old = json!({"continuation": "cs", "key": "SUB", "mood3": 50.0});
        let new = GroupOverrides.apply(old.clone()).unwrap();
        assert_eq!(
            new,
            json!({"continuation": "cs", "overrides": {"key": "SUB", "moods": {"mood3": 50.0}}})
        );
        assert_eq!(FlattenOverrides.apply(new).unwrap(), old);
    }

    #[test]
    fn test_no_overrides() {
        let new = GroupOverrides.apply(json!({})).unwrap();
        assert_eq!(new, json!({"continuation": null}));
    }

    #[test]
    fn test_unknown_field_is_structural() {
        let err = GroupOverrides.apply(json!({"colour": "red"})).unwrap_err();
        assert!(err.is_structural());
    }
}
