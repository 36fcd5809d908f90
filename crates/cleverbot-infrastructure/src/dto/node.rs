use crate::migration::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tagged entity in a persisted document.
///
/// `version` is absent in documents written before nodes carried their own
/// tag; such nodes inherit the version of their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityNode<S> {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub state: S,
}

impl<S> EntityNode<S> {
    pub fn new(kind: EntityKind, version: &semver::Version, state: S) -> Self {
        Self {
            kind,
            version: Some(version.to_string()),
            state,
        }
    }

    pub fn untagged(kind: EntityKind, state: S) -> Self {
        Self {
            kind,
            version: None,
            state,
        }
    }
}

/// Whether a JSON object is an entity node: only `kind`, `state` and an
/// optional `version`, with `kind` naming a known entity.
pub fn is_entity_node(map: &Map<String, Value>) -> bool {
    let known_kind = map
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|tag| tag.parse::<EntityKind>().is_ok());

    known_kind
        && map.contains_key("state")
        && map
            .keys()
            .all(|key| matches!(key.as_str(), "kind" | "version" | "state"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_is_entity_node() {
        assert!(is_entity_node(&object(json!({"kind": "cleverbot", "state": {}}))));
        assert!(is_entity_node(&object(
            json!({"kind": "conversation", "version": "3.0.0", "state": {}})
        )));
        assert!(!is_entity_node(&object(json!({"kind": "cleverbot"}))));
        assert!(!is_entity_node(&object(json!({"kind": "persona", "state": {}}))));
        assert!(!is_entity_node(&object(
            json!({"kind": "cleverbot", "state": {}, "extra": 1})
        )));
        // A conversation map whose names collide with node fields
        assert!(!is_entity_node(&object(
            json!({"kind": {"kind": "conversation", "state": {}}, "state": {}})
        )));
    }

    #[test]
    fn test_version_is_optional() {
        let node: EntityNode<Value> =
            serde_json::from_value(json!({"kind": "cleverbot", "state": {"key": "k"}})).unwrap();
        assert_eq!(node.kind, EntityKind::Cleverbot);
        assert_eq!(node.version, None);

        let tagged = EntityNode::new(EntityKind::Conversation, &semver::Version::new(3, 0, 0), 1);
        assert_eq!(
            serde_json::to_value(&tagged).unwrap(),
            json!({"kind": "conversation", "version": "3.0.0", "state": 1})
        );
    }
}
