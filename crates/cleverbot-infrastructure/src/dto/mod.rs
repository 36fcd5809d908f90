//! Data Transfer Objects (DTOs) for persisted conversation state.
//!
//! These DTOs represent every schema the snapshot format has ever had. They
//! are private to the infrastructure layer; the domain types in
//! `cleverbot-core` never see a version number.
//!
//! ## Schema Version History
//! - **2.1.1**: Positional tuple `[root, [conversation, ...]]`; the root
//!   carries `key`, `continuation` and `timeout`
//! - **2.2.0**: Root and conversations gain `mood1`..`mood3`
//! - **2.4.0**: Same layout as 2.2.0 (last positional schema)
//! - **2.5.0**: Tagged entity nodes `{kind, state}`; nameless sessions are
//!   dropped when upgrading into this layout
//! - **3.0.0**: Moods grouped under `moods`, conversation overrides grouped
//!   under `overrides`, the conversation container is tagged `named`/`unnamed`

mod cleverbot;
mod conversation;
mod legacy;
mod node;

use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use std::time::Duration;

pub use cleverbot::{
    CleverbotDocument, CleverbotStateV2_5_0, CleverbotStateV3_0_0, ConversationsV2_5_0,
    ConversationsV3_0_0, MoodsV3_0_0,
};
pub use conversation::{ConversationStateV2_5_0, ConversationStateV3_0_0, OverridesV3_0_0};
pub use legacy::{
    LegacyConversationV2_1_1, LegacyConversationV2_4_0, LegacyRootV2_1_1, LegacyRootV2_4_0,
    LegacyStateV2_1_1, LegacyStateV2_4_0,
};
pub use node::{EntityNode, is_entity_node};

pub const SCHEMA_V2_1_1: Version = Version::new(2, 1, 1);
pub const SCHEMA_V2_2_0: Version = Version::new(2, 2, 0);
pub const SCHEMA_V2_4_0: Version = Version::new(2, 4, 0);
pub const SCHEMA_V2_5_0: Version = Version::new(2, 5, 0);
pub const SCHEMA_V3_0_0: Version = Version::new(3, 0, 0);

/// The schema every snapshot is written in.
pub const CURRENT_SCHEMA_VERSION: Version = SCHEMA_V3_0_0;

/// Parses a version tag found in a document.
pub fn parse_schema_version(tag: &str) -> Result<Version> {
    Version::parse(tag)
        .map_err(|e| CleverbotError::structural(format!("Invalid schema version {tag:?}: {e}")))
}

/// Timeouts are persisted as fractional seconds.
pub(crate) fn timeout_to_secs(timeout: Option<Duration>) -> Option<f64> {
    timeout.map(|t| t.as_secs_f64())
}

pub(crate) fn secs_to_timeout(secs: Option<f64>) -> Result<Option<Duration>> {
    secs.map(|s| {
        Duration::try_from_secs_f64(s)
            .map_err(|e| CleverbotError::structural(format!("Invalid timeout {s}: {e}")))
    })
    .transpose()
}
