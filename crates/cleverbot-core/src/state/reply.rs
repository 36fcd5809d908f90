//! Reply fields returned by the `getreply` endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum number of interaction pairs the API reports back.
const MAX_INTERACTIONS: usize = 100;

/// Data returned with the latest reply.
///
/// Every documented field is typed and accepts a JSON string or number, kept
/// as text. Anything else the server sends (the
/// `interaction_N` history, new keys) lands in `extra`, so unknown fields
/// never break decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyData {
    /// Continuation token ("cleverbot state")
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cs: Option<String>,
    /// The bot's reply
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<String>,
    /// The user input as the server saw it
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub input: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversation_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub interaction_count: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub errorline: Option<String>,
    /// Milliseconds the bot took to respond
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_taken: Option<String>,
    /// Approximate seconds since the conversation started
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_elapsed: Option<String>,
    /// Unrecognized server fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One user/bot exchange from the reply history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub user: String,
    /// Absent when the bot never answered that input
    pub bot: Option<String>,
}

impl ReplyData {
    /// Returns true when no reply field is stored.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Looks up an untyped server field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }

    /// Returns the reported interactions, oldest first.
    ///
    /// The server numbers them newest first (`interaction_1` is the last
    /// thing the user said) and stops at the first missing index.
    pub fn interactions(&self) -> Vec<Interaction> {
        let mut interactions = Vec::new();
        for index in 1..=MAX_INTERACTIONS {
            let Some(user) = self.string_field(&format!("interaction_{index}")) else {
                break;
            };
            if user.is_empty() {
                break;
            }
            let bot = self.string_field(&format!("interaction_{index}_other"));
            interactions.push(Interaction { user, bot });
        }
        interactions.reverse();
        interactions
    }

    fn string_field(&self, field: &str) -> Option<String> {
        match self.extra.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Accepts a JSON string or number and keeps it as a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_go_to_extra() {
        let data: ReplyData =
            serde_json::from_value(json!({"output": "test", "cs": "cs", "test": "test"})).unwrap();
        assert_eq!(data.output.as_deref(), Some("test"));
        assert_eq!(data.cs.as_deref(), Some("cs"));
        assert_eq!(data.get("test"), Some(&json!("test")));
    }

    #[test]
    fn test_numeric_fields_accept_numbers_and_strings() {
        let data: ReplyData = serde_json::from_value(json!({
            "interaction_count": 3,
            "time_taken": "120",
            "time_elapsed": null
        }))
        .unwrap();
        assert_eq!(data.interaction_count.as_deref(), Some("3"));
        assert_eq!(data.time_taken.as_deref(), Some("120"));
        assert_eq!(data.time_elapsed, None);
    }

    #[test]
    fn test_text_fields_accept_numbers() {
        let data: ReplyData = serde_json::from_value(json!({
            "conversation_id": 12345,
            "output": 42,
            "errorline": "",
            "cs": null
        }))
        .unwrap();
        assert_eq!(data.conversation_id.as_deref(), Some("12345"));
        assert_eq!(data.output.as_deref(), Some("42"));
        assert_eq!(data.errorline.as_deref(), Some(""));
        assert_eq!(data.cs, None);
    }

    #[test]
    fn test_interactions_are_oldest_first() {
        let data: ReplyData = serde_json::from_value(json!({
            "interaction_1": "how are you",
            "interaction_1_other": "fine",
            "interaction_2": "hello",
            "interaction_2_other": "hi",
            "interaction_3": "",
        }))
        .unwrap();

        let interactions = data.interactions();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].user, "hello");
        assert_eq!(interactions[0].bot.as_deref(), Some("hi"));
        assert_eq!(interactions[1].user, "how are you");
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ReplyData::default().is_empty());
        let data = ReplyData {
            cs: Some("x".to_string()),
            ..ReplyData::default()
        };
        assert!(!data.is_empty());
    }
}
