//! Positional schemas (2.1.1 through 2.4.0).
//!
//! A document is a two-element array: the root's settings, then the list of
//! its conversations. Conversations carry an optional `name`; a list mixing
//! named and nameless entries never existed on disk.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyRootV2_1_1 {
    pub key: String,
    pub continuation: Option<String>,
    pub timeout: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyConversationV2_1_1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub continuation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyStateV2_1_1(pub LegacyRootV2_1_1, pub Vec<LegacyConversationV2_1_1>);

/// Root settings from 2.2.0 on; the moods were added then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyRootV2_4_0 {
    pub key: String,
    pub continuation: Option<String>,
    pub timeout: Option<f64>,
    pub mood1: Option<f64>,
    pub mood2: Option<f64>,
    pub mood3: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyConversationV2_4_0 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyStateV2_4_0(pub LegacyRootV2_4_0, pub Vec<LegacyConversationV2_4_0>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_layout() {
        let state = LegacyStateV2_1_1(
            LegacyRootV2_1_1 {
                key: "API_KEY".to_string(),
                continuation: Some("cs".to_string()),
                timeout: None,
            },
            vec![LegacyConversationV2_1_1 {
                name: Some("alice".to_string()),
                continuation: None,
                key: None,
                timeout: Some(2.5),
            }],
        );

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!([
                {"key": "API_KEY", "continuation": "cs", "timeout": null},
                [{"name": "alice", "continuation": null, "timeout": 2.5}]
            ])
        );
    }

    #[test]
    fn test_root_rejects_fields_of_other_schemas() {
        let v2_4 = json!({
            "key": "k", "continuation": null, "timeout": null,
            "mood1": 1.0, "mood2": null, "mood3": null
        });
        assert!(serde_json::from_value::<LegacyRootV2_1_1>(v2_4.clone()).is_err());
        assert!(serde_json::from_value::<LegacyRootV2_4_0>(v2_4).is_ok());
    }
}
