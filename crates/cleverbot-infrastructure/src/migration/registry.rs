//! Transformation registry keyed by scope, boundary and direction.
//!
//! Each scope (the global chain or one entity kind) owns a partition: an
//! ordered map from boundary version to at most one forward and one backward
//! migration. The registry is filled once by `build_migration_manager` and
//! only read afterwards.

use super::entity::EntityKind;
use super::traits::{Direction, FnMigration, Migration};
use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Which chain a migration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Whole-document transforms, used when planning without an entity kind
    Global,
    Entity(EntityKind),
}

impl From<Option<EntityKind>> for Scope {
    fn from(kind: Option<EntityKind>) -> Self {
        kind.map_or(Scope::Global, Scope::Entity)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Entity(kind) => f.write_str(kind.name()),
        }
    }
}

/// The migrations registered at one boundary.
#[derive(Debug, Default, Clone)]
pub struct Boundary {
    /// Upgrades a payload from below the boundary to the boundary version.
    pub forward: Option<Arc<dyn Migration>>,
    /// Downgrades a payload at the boundary to just below it.
    pub backward: Option<Arc<dyn Migration>>,
}

impl Boundary {
    /// Returns the migration for `direction`, if one is registered.
    pub fn get(&self, direction: Direction) -> Option<&Arc<dyn Migration>> {
        match direction {
            Direction::Forward => self.forward.as_ref(),
            Direction::Backward => self.backward.as_ref(),
        }
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<Arc<dyn Migration>> {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }
}

/// Boundaries of one scope, ordered by version.
pub type Partition = BTreeMap<Version, Boundary>;

/// Every registered migration, partitioned by scope.
///
/// # Example
///
/// ```ignore
/// let mut registry = MigrationRegistry::new();
/// registry.declare(EntityKind::Conversation);
/// registry.register(Some(EntityKind::Conversation), Arc::new(GroupOverrides))?;
/// registry.register(Some(EntityKind::Conversation), Arc::new(FlattenOverrides))?;
/// ```
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    /// Entity kinds that may own a partition.
    declared: HashSet<EntityKind>,
    /// Boundaries per scope; a scope without migrations has no entry.
    partitions: HashMap<Scope, Partition>,
}

impl MigrationRegistry {
    /// Creates an empty registry with no declared kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an entity kind as migratable.
    ///
    /// Declaring the same kind twice has no further effect.
    pub fn declare(&mut self, kind: EntityKind) {
        tracing::debug!("Declared migratable entity: {}", kind.name());
        self.declared.insert(kind);
    }

    /// Returns true if `kind` was declared.
    pub fn is_declared(&self, kind: EntityKind) -> bool {
        self.declared.contains(&kind)
    }

    /// Adds one migration under the global chain (`None`) or a kind's chain.
    ///
    /// # Arguments
    ///
    /// * `kind` - The entity kind whose chain receives the migration, or `None`
    ///   for the global chain
    /// * `migration` - Keyed by its own `boundary()` and `direction()`
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the kind was never declared, or if a migration
    /// is already registered for the same scope, boundary and direction.
    pub fn register(&mut self, kind: Option<EntityKind>, migration: Arc<dyn Migration>) -> Result<()> {
        if let Some(kind) = kind
            && !self.is_declared(kind)
        {
            return Err(CleverbotError::configuration(format!(
                "Entity kind {} was not declared as migratable",
                kind.name()
            )));
        }

        let scope = Scope::from(kind);
        let boundary = migration.boundary();
        let direction = migration.direction();
        let slot = self
            .partitions
            .entry(scope)
            .or_default()
            .entry(boundary.clone())
            .or_default()
            .slot(direction);

        if let Some(existing) = slot {
            return Err(CleverbotError::configuration(format!(
                "Duplicate {direction} migration at {boundary} for {scope}: '{}' already registered",
                existing.description()
            )));
        }

        tracing::debug!(
            "Registered {} migration at {} for {}: {}",
            direction,
            boundary,
            scope,
            migration.description()
        );
        *slot = Some(migration);
        Ok(())
    }

    /// Adds a closure-backed migration.
    ///
    /// # Arguments
    ///
    /// * `boundary` - The version the migration upgrades to or downgrades from
    /// * `kind` - The entity kind, or `None` for the global chain
    /// * `direction` - Forward or backward across the boundary
    /// * `lossy` - Whether the step discards data (refused in implicit mode)
    /// * `description` - Shown in regression errors and notices
    /// * `f` - Transforms one payload
    ///
    /// # Errors
    ///
    /// Same as [`MigrationRegistry::register`].
    pub fn register_fn<F>(
        &mut self,
        boundary: Version,
        kind: Option<EntityKind>,
        direction: Direction,
        lossy: bool,
        description: impl Into<String>,
        f: F,
    ) -> Result<()>
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        let migration = FnMigration::new(boundary, direction, description, f);
        let migration = if lossy { migration.lossy() } else { migration };
        self.register(kind, Arc::new(migration))
    }

    /// Returns the boundaries of `scope`, or `None` if nothing was registered
    /// there.
    pub fn partition(&self, scope: Scope) -> Option<&Partition> {
        self.partitions.get(&scope)
    }

    /// Number of registered migrations in a scope.
    pub fn len(&self, scope: Scope) -> usize {
        self.partition(scope).map_or(0, |partition| {
            partition
                .values()
                .map(|b| usize::from(b.forward.is_some()) + usize::from(b.backward.is_some()))
                .sum()
        })
    }

    /// Returns true if no migrations are registered in any scope.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(payload: Value) -> Result<Value> {
        Ok(payload)
    }

    #[test]
    fn test_empty_registry() {
        let registry = MigrationRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(Scope::Global), 0);
        assert!(registry.partition(Scope::Entity(EntityKind::Cleverbot)).is_none());
    }

    #[test]
    fn test_forward_and_backward_are_independent() {
        let mut registry = MigrationRegistry::new();
        registry
            .register_fn(Version::new(1, 0, 0), None, Direction::Forward, false, "up", identity)
            .unwrap();
        registry
            .register_fn(Version::new(1, 0, 0), None, Direction::Backward, true, "down", identity)
            .unwrap();

        assert_eq!(registry.len(Scope::Global), 2);
        let boundary = &registry.partition(Scope::Global).unwrap()[&Version::new(1, 0, 0)];
        assert_eq!(boundary.get(Direction::Forward).unwrap().description(), "up");
        assert!(boundary.get(Direction::Backward).unwrap().is_lossy());
    }

    #[test]
    fn test_undeclared_kind_is_configuration_error() {
        let mut registry = MigrationRegistry::new();
        let err = registry
            .register_fn(
                Version::new(1, 0, 0),
                Some(EntityKind::Conversation),
                Direction::Forward,
                false,
                "up",
                identity,
            )
            .unwrap_err();
        assert!(err.is_configuration());

        registry.declare(EntityKind::Conversation);
        registry
            .register_fn(
                Version::new(1, 0, 0),
                Some(EntityKind::Conversation),
                Direction::Forward,
                false,
                "up",
                identity,
            )
            .unwrap();
        assert_eq!(registry.len(Scope::Entity(EntityKind::Conversation)), 1);
        assert_eq!(registry.len(Scope::Global), 0);
    }

    #[test]
    fn test_duplicate_registration_is_configuration_error() {
        let mut registry = MigrationRegistry::new();
        registry
            .register_fn(Version::new(1, 0, 0), None, Direction::Forward, false, "first", identity)
            .unwrap();
        let err = registry
            .register_fn(Version::new(1, 0, 0), None, Direction::Forward, false, "second", identity)
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("first"));
    }
}
