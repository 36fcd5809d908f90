//! Plan execution and the lossy-step policy.

use super::planner::MigrationPlan;
use super::traits::Direction;
use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use serde_json::Value;

/// How a migration was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationMode {
    /// Part of a normal load; lossy steps are refused.
    #[default]
    Implicit,
    /// Requested by the user; lossy steps run and are reported.
    Explicit,
}

/// A lossy step that ran during an explicit migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegressionNotice {
    pub boundary: Version,
    pub direction: Direction,
    pub description: String,
}

/// The result of a migration with any regression notices it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated<T> {
    pub value: T,
    pub notices: Vec<RegressionNotice>,
}

impl<T> Migrated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Migrated<U> {
        Migrated {
            value: f(self.value),
            notices: self.notices,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationExecutor {
    mode: MigrationMode,
}

impl MigrationExecutor {
    pub fn new(mode: MigrationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MigrationMode {
        self.mode
    }

    /// Runs every step of `plan` on `payload`, left to right.
    ///
    /// # Errors
    ///
    /// - `Regression` in implicit mode when the plan has a lossy step; no
    ///   step runs in that case
    /// - whatever a step returns (typically `Structural`)
    pub fn apply(&self, payload: Value, plan: &MigrationPlan) -> Result<Migrated<Value>> {
        if self.mode == MigrationMode::Implicit
            && let Some(step) = plan.lossy_steps().next()
        {
            return Err(CleverbotError::regression(step.description()));
        }

        if plan.is_empty() {
            return Ok(Migrated::new(payload));
        }

        tracing::info!(
            "Starting migration from {} to {} ({} steps)",
            plan.from,
            plan.to,
            plan.len()
        );

        let mut value = payload;
        let mut notices = Vec::new();
        for (i, step) in plan.steps.iter().enumerate() {
            tracing::info!(
                "Migration step {}/{}: {} at {} ({})",
                i + 1,
                plan.len(),
                step.direction(),
                step.boundary(),
                step.description()
            );

            if step.is_lossy() {
                tracing::warn!("Regression: {}", step.description());
                notices.push(RegressionNotice {
                    boundary: step.boundary(),
                    direction: step.direction(),
                    description: step.description().to_string(),
                });
            }

            value = step.apply(value)?;
        }

        tracing::info!("Migration completed: {} -> {}", plan.from, plan.to);
        Ok(Migrated { value, notices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::planner::plan;
    use crate::migration::registry::MigrationRegistry;
    use serde_json::json;

    fn registry() -> MigrationRegistry {
        let mut registry = MigrationRegistry::new();
        registry
            .register_fn(Version::new(1, 0, 0), None, Direction::Forward, false, "add b", |mut v| {
                v["b"] = json!(2);
                Ok(v)
            })
            .unwrap();
        registry
            .register_fn(Version::new(2, 0, 0), None, Direction::Forward, false, "add c", |mut v| {
                v["c"] = json!(3);
                Ok(v)
            })
            .unwrap();
        registry
            .register_fn(Version::new(2, 0, 0), None, Direction::Backward, true, "Drops c", |mut v| {
                if let Some(map) = v.as_object_mut() {
                    map.remove("c");
                }
                Ok(v)
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_steps_run_in_order() {
        let registry = registry();
        let steps = plan(&registry, None, &Version::new(0, 1, 0), &Version::new(2, 0, 0));
        let migrated = MigrationExecutor::new(MigrationMode::Implicit)
            .apply(json!({"a": 1}), &steps)
            .unwrap();
        assert_eq!(migrated.value, json!({"a": 1, "b": 2, "c": 3}));
        assert!(migrated.notices.is_empty());
    }

    #[test]
    fn test_implicit_refuses_lossy_step() {
        let registry = registry();
        let steps = plan(&registry, None, &Version::new(2, 0, 0), &Version::new(1, 0, 0));
        let err = MigrationExecutor::new(MigrationMode::Implicit)
            .apply(json!({"c": 3}), &steps)
            .unwrap_err();
        assert_eq!(err, CleverbotError::regression("Drops c"));
    }

    #[test]
    fn test_explicit_runs_lossy_step_with_notice() {
        let registry = registry();
        let steps = plan(&registry, None, &Version::new(2, 0, 0), &Version::new(1, 0, 0));
        let migrated = MigrationExecutor::new(MigrationMode::Explicit)
            .apply(json!({"c": 3}), &steps)
            .unwrap();
        assert_eq!(migrated.value, json!({}));
        assert_eq!(
            migrated.notices,
            vec![RegressionNotice {
                boundary: Version::new(2, 0, 0),
                direction: Direction::Backward,
                description: "Drops c".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let registry = registry();
        let steps = plan(&registry, None, &Version::new(2, 0, 0), &Version::new(2, 0, 0));
        let payload = json!({"anything": [1, 2, 3]});
        let migrated = MigrationExecutor::default().apply(payload.clone(), &steps).unwrap();
        assert_eq!(migrated.value, payload);
    }
}
