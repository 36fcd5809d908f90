//! Entity kinds that carry their own migration chains.
//!
//! When adding a new kind:
//! 1. Add a variant to `EntityKind`
//! 2. Add it to `EntityKind::all()`
//! 3. Add a match arm to `EntityKind::name()`
//! 4. Declare it and register its migrations in `build_migration_manager`
//!
//! The serialized tag (`cleverbot`, `conversation`) is what entity nodes
//! carry in their `kind` field.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    /// A root conversation
    Cleverbot,
    /// A sub-conversation owned by a root
    Conversation,
}

impl EntityKind {
    /// Returns every kind; `validate()` on the manager checks each of them.
    pub const fn all() -> &'static [EntityKind] {
        &[EntityKind::Cleverbot, EntityKind::Conversation]
    }

    /// Human-readable name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            EntityKind::Cleverbot => "Cleverbot",
            EntityKind::Conversation => "Conversation",
        }
    }
}
