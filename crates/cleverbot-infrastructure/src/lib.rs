//! Persistence and schema migration for Cleverbot conversation state.
//!
//! - `dto`: every persisted schema, from the positional 2.1.1 layout to 3.0.0
//! - `migration`: registry, planner, executor and the document manager
//! - `storage`: snapshot encoding and atomic files
//! - `paths`: platform directories

pub mod dto;
pub mod migration;
pub mod paths;
pub mod storage;

pub use migration::{
    EntityKind, Migrated, MigrationManager, MigrationMode, RegressionNotice,
    build_migration_manager,
};
pub use paths::CleverbotPaths;
pub use storage::{AtomicFile, SnapshotStore};
