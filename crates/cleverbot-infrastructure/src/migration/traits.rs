//! Core traits for the migration framework.
//!
//! A migration sits at a version boundary and moves a payload across it in
//! one direction. Payloads travel as `serde_json::Value` so that steps for
//! different schemas can be chained; typed steps deserialize into their
//! source DTO, transform, and serialize the target DTO.

use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Which way a migration crosses its boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the version just below the boundary up to the boundary
    Forward,
    /// From the boundary down to the version just below it
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// Base trait for all migrations.
pub trait Migration: Send + Sync + fmt::Debug {
    /// The version this migration transitions to (forward) or from (backward).
    fn boundary(&self) -> Version;

    fn direction(&self) -> Direction;

    /// Human-readable description, used for logging and regression notices.
    fn description(&self) -> &str;

    /// Whether running this step discards information.
    fn is_lossy(&self) -> bool {
        false
    }

    /// Transforms one payload.
    ///
    /// # Errors
    ///
    /// Returns `Structural` when the payload does not have the shape this
    /// step expects.
    fn apply(&self, payload: Value) -> Result<Value>;
}

/// Typed migration that transforms one DTO into another.
pub trait TypedMigration<From, To>: Migration {
    fn migrate(&self, from: From) -> Result<To>;
}

/// Runs a typed migration on an untyped payload.
///
/// `Migration::apply` of a typed step is usually just this call.
pub fn apply_typed<M, F, T>(migration: &M, payload: Value) -> Result<Value>
where
    M: TypedMigration<F, T> + ?Sized,
    F: DeserializeOwned,
    T: Serialize,
{
    let from: F = serde_json::from_value(payload).map_err(|e| {
        CleverbotError::structural(format!(
            "Unexpected shape for '{}' ({} at {}): {}",
            migration.description(),
            migration.direction(),
            migration.boundary(),
            e
        ))
    })?;
    let to = migration.migrate(from)?;
    Ok(serde_json::to_value(to)?)
}

type TransformFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// A migration backed by a closure.
pub struct FnMigration {
    boundary: Version,
    direction: Direction,
    lossy: bool,
    description: String,
    transform: Box<TransformFn>,
}

impl FnMigration {
    pub fn new<F>(boundary: Version, direction: Direction, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            boundary,
            direction,
            lossy: false,
            description: description.into(),
            transform: Box::new(f),
        }
    }

    pub fn lossy(mut self) -> Self {
        self.lossy = true;
        self
    }
}

impl fmt::Debug for FnMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMigration")
            .field("boundary", &self.boundary)
            .field("direction", &self.direction)
            .field("lossy", &self.lossy)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Migration for FnMigration {
    fn boundary(&self) -> Version {
        self.boundary.clone()
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_lossy(&self) -> bool {
        self.lossy
    }

    fn apply(&self, payload: Value) -> Result<Value> {
        (self.transform)(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Before {
        name: String,
    }

    #[derive(Debug, Serialize)]
    struct After {
        title: String,
    }

    #[derive(Debug)]
    struct RenameMigration;

    impl Migration for RenameMigration {
        fn boundary(&self) -> Version {
            Version::new(1, 1, 0)
        }

        fn direction(&self) -> Direction {
            Direction::Forward
        }

        fn description(&self) -> &str {
            "Rename name to title"
        }

        fn apply(&self, payload: Value) -> Result<Value> {
            apply_typed(self, payload)
        }
    }

    impl TypedMigration<Before, After> for RenameMigration {
        fn migrate(&self, from: Before) -> Result<After> {
            Ok(After { title: from.name })
        }
    }

    #[test]
    fn test_typed_migration() {
        let migrated = RenameMigration.apply(json!({"name": "x"})).unwrap();
        assert_eq!(migrated, json!({"title": "x"}));
        assert!(!RenameMigration.is_lossy());
    }

    #[test]
    fn test_typed_migration_wrong_shape() {
        let err = RenameMigration.apply(json!([1, 2])).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("Rename name to title"));
    }

    #[test]
    fn test_fn_migration() {
        let migration = FnMigration::new(Version::new(2, 0, 0), Direction::Backward, "Drop everything", |_| {
            Ok(Value::Null)
        })
        .lossy();

        assert!(migration.is_lossy());
        assert_eq!(migration.direction(), Direction::Backward);
        assert_eq!(migration.apply(json!({"a": 1})).unwrap(), Value::Null);
    }
}
