//! Schema migration framework for persisted conversation state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MigrationManager                         │
//! │  (Detects versions, runs the global and entity passes)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MigrationRegistry                                          │
//! │  - Global        (2.2.0 ← , 2.5.0 ⇄)                        │
//! │  - Cleverbot     (3.0.0 ⇄)                                  │
//! │  - Conversation  (3.0.0 ⇄)                                  │
//! │  LegacyShapes    (2.1.1, 2.4.0, 2.5.0 untagged layouts)     │
//! └─────────────────────────────────────────────────────────────┘
//!          │
//!          V
//!   planner::plan  →  MigrationExecutor (implicit | explicit)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cleverbot_infrastructure::migration;
//!
//! let manager = migration::build_migration_manager()?;
//! let current = manager.migrate_to_current(document)?;
//! ```
//!
//! # Adding a Schema Version
//!
//! 1. Add the DTOs and a `SCHEMA_V*` constant in `dto`
//! 2. Implement `Migration` + `TypedMigration` for each direction that
//!    exists, marking lossy steps with `is_lossy`
//! 3. Register them in `build_migration_manager()`
//! 4. Bump `CURRENT_SCHEMA_VERSION`

pub mod cleverbot;
pub mod conversation;
pub mod entity;
pub mod executor;
pub mod legacy;
pub mod manager;
pub mod planner;
pub mod registry;
pub mod traits;

pub use entity::EntityKind;
pub use executor::{Migrated, MigrationExecutor, MigrationMode, RegressionNotice};
pub use legacy::{Layout, LegacyShape, LegacyShapes};
pub use manager::{MigrationManager, MigrationManagerBuilder};
pub use planner::MigrationPlan;
pub use registry::{MigrationRegistry, Scope};
pub use traits::{Direction, FnMigration, Migration, TypedMigration};

use cleverbot_core::error::Result;
use std::sync::Arc;

/// Builds the migration manager with every known migration registered.
///
/// This is the single place where migrations are wired up.
pub fn build_migration_manager() -> Result<MigrationManager> {
    let mut registry = MigrationRegistry::new();
    for kind in EntityKind::all() {
        registry.declare(*kind);
    }

    registry.register(None, Arc::new(cleverbot::DropMoods))?;
    registry.register(None, Arc::new(cleverbot::PositionalToNode))?;
    registry.register(None, Arc::new(cleverbot::NodeToPositional))?;

    registry.register(Some(EntityKind::Cleverbot), Arc::new(cleverbot::GroupRootMoods))?;
    registry.register(Some(EntityKind::Cleverbot), Arc::new(cleverbot::FlattenRootMoods))?;

    registry.register(Some(EntityKind::Conversation), Arc::new(conversation::GroupOverrides))?;
    registry.register(Some(EntityKind::Conversation), Arc::new(conversation::FlattenOverrides))?;

    MigrationManager::builder().with_registry(registry).build()
}
