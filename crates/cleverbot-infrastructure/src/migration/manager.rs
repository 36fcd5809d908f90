//! Migration manager for coordinating document migrations.

use super::entity::EntityKind;
use super::executor::{Migrated, MigrationExecutor, MigrationMode, RegressionNotice};
use super::legacy::LegacyShapes;
use super::planner::{self, MigrationPlan};
use super::registry::{MigrationRegistry, Scope};
use crate::dto::{CURRENT_SCHEMA_VERSION, EntityNode, is_entity_node, parse_schema_version};
use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use serde_json::{Map, Value};

/// Plans and runs migrations over whole documents.
///
/// A document is migrated in two passes: the global chain reshapes its
/// layout, and each entity node found inside is run through its own kind's
/// chain. Upgrades run the global pass first (older layouts may not contain
/// nodes yet); downgrades run it last.
#[derive(Debug)]
pub struct MigrationManager {
    registry: MigrationRegistry,
    legacy: LegacyShapes,
    current_version: Version,
}

impl MigrationManager {
    pub fn builder() -> MigrationManagerBuilder {
        MigrationManagerBuilder::new()
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn current_version(&self) -> &Version {
        &self.current_version
    }

    pub fn plan(&self, kind: Option<EntityKind>, from: &Version, to: &Version) -> MigrationPlan {
        planner::plan(&self.registry, kind, from, to)
    }

    /// Returns the version a document was written in.
    ///
    /// # Errors
    ///
    /// Returns `Structural` if the document has neither a valid version tag
    /// nor a known legacy shape.
    pub fn detect_version(&self, document: &Value) -> Result<Version> {
        if let Value::Object(map) = document
            && is_entity_node(map)
            && let Some(tag) = map.get("version")
        {
            let tag = tag
                .as_str()
                .ok_or_else(|| CleverbotError::structural("Version tag must be a string"))?;
            return parse_schema_version(tag);
        }
        self.legacy.sniff(document)
    }

    /// Migrates a document to `target`.
    ///
    /// Nothing is returned on failure, so a refused or broken migration
    /// never yields a half-migrated document.
    pub fn migrate_document(
        &self,
        document: Value,
        target: &Version,
        mode: MigrationMode,
    ) -> Result<Migrated<Value>> {
        let from = self.detect_version(&document)?;
        if from > self.current_version {
            tracing::warn!(
                "Document version ({}) is newer than the latest supported version ({})",
                from,
                self.current_version
            );
        }

        let executor = MigrationExecutor::new(mode);
        let global = self.plan(None, &from, target);
        let mut notices = Vec::new();

        tracing::debug!("Migrating document: {} -> {} ({:?})", from, target, mode);
        let value = if target >= &from {
            let migrated = executor.apply(document, &global)?;
            notices.extend(migrated.notices);
            self.migrate_entities(migrated.value, &from, target, &executor, &mut notices)?
        } else {
            let value = self.migrate_entities(document, &from, target, &executor, &mut notices)?;
            let migrated = executor.apply(value, &global)?;
            notices.extend(migrated.notices);
            migrated.value
        };

        Ok(Migrated { value, notices })
    }

    /// Migrates to the current schema in implicit mode.
    pub fn migrate_to_current(&self, document: Value) -> Result<Value> {
        self.migrate_document(document, &self.current_version, MigrationMode::Implicit)
            .map(|migrated| migrated.value)
    }

    fn migrate_entities(
        &self,
        value: Value,
        inherited: &Version,
        target: &Version,
        executor: &MigrationExecutor,
        notices: &mut Vec<RegressionNotice>,
    ) -> Result<Value> {
        match value {
            Value::Object(map) if is_entity_node(&map) => {
                let mut node: EntityNode<Value> = serde_json::from_value(Value::Object(map))
                    .map_err(|e| CleverbotError::structural(format!("Malformed entity node: {e}")))?;
                let from = match node.version.as_deref() {
                    Some(tag) => parse_schema_version(tag)?,
                    None => inherited.clone(),
                };

                let plan = self.plan(Some(node.kind), &from, target);
                let migrated = executor.apply(node.state, &plan)?;
                notices.extend(migrated.notices);

                node.state = self.migrate_entities(migrated.value, &from, target, executor, notices)?;
                node.version = Some(target.to_string());
                Ok(serde_json::to_value(node)?)
            }
            Value::Object(map) => {
                let mut migrated = Map::with_capacity(map.len());
                for (key, child) in map {
                    let child = self.migrate_entities(child, inherited, target, executor, notices)?;
                    migrated.insert(key, child);
                }
                Ok(Value::Object(migrated))
            }
            Value::Array(items) => {
                let mut migrated = Vec::with_capacity(items.len());
                for child in items {
                    migrated.push(self.migrate_entities(child, inherited, target, executor, notices)?);
                }
                Ok(Value::Array(migrated))
            }
            other => Ok(other),
        }
    }

    /// Validates that every entity kind has a migration chain.
    ///
    /// This is called automatically by the builder.
    pub fn validate(&self) -> Result<()> {
        for kind in EntityKind::all() {
            if !self.registry.is_declared(*kind) {
                tracing::warn!("{} is not declared as migratable", kind.name());
                continue;
            }
            let count = self.registry.len(Scope::Entity(*kind));
            if count == 0 {
                tracing::warn!("{} migration registry is empty", kind.name());
            } else {
                tracing::debug!("{} registry: {} migrations registered", kind.name(), count);
            }
        }
        tracing::debug!(
            "Global registry: {} migrations registered",
            self.registry.len(Scope::Global)
        );
        Ok(())
    }
}

pub struct MigrationManagerBuilder {
    registry: Option<MigrationRegistry>,
    legacy: LegacyShapes,
    current_version: Version,
}

impl MigrationManagerBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            legacy: LegacyShapes::default(),
            current_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn with_registry(mut self, registry: MigrationRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_legacy_shapes(mut self, legacy: LegacyShapes) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn with_current_version(mut self, version: Version) -> Self {
        self.current_version = version;
        self
    }

    /// # Errors
    ///
    /// Returns `Configuration` if no registry was provided.
    pub fn build(self) -> Result<MigrationManager> {
        let registry = self
            .registry
            .ok_or_else(|| CleverbotError::configuration("Migration registry not set"))?;

        let manager = MigrationManager {
            registry,
            legacy: self.legacy,
            current_version: self.current_version,
        };

        manager.validate()?;

        Ok(manager)
    }
}

impl Default for MigrationManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
