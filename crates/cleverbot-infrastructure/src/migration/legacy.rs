//! Version detection for documents written without a version tag.
//!
//! Untagged documents are recognised by the exact set of field names at a
//! known position, never by looser guessing. Anything that matches no shape
//! is rejected.

use crate::dto::{SCHEMA_V2_1_1, SCHEMA_V2_4_0, SCHEMA_V2_5_0};
use cleverbot_core::error::{CleverbotError, Result};
use semver::Version;
use serde_json::Value;
use std::collections::BTreeSet;

/// Where the sniffed field names live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `[ {fields...}, [...] ]`: the first element's keys are matched
    Positional,
    /// `{fields...}`: the object's own keys are matched
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyShape {
    pub layout: Layout,
    pub fields: BTreeSet<String>,
    pub version: Version,
}

impl LegacyShape {
    pub fn new(layout: Layout, fields: &[&str], version: Version) -> Self {
        Self {
            layout,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            version,
        }
    }
}

/// The table of known untagged shapes.
#[derive(Debug, Clone)]
pub struct LegacyShapes {
    shapes: Vec<LegacyShape>,
}

impl Default for LegacyShapes {
    fn default() -> Self {
        Self {
            shapes: vec![
                LegacyShape::new(
                    Layout::Positional,
                    &["key", "continuation", "timeout"],
                    SCHEMA_V2_1_1,
                ),
                LegacyShape::new(
                    Layout::Positional,
                    &["key", "continuation", "timeout", "mood1", "mood2", "mood3"],
                    SCHEMA_V2_4_0,
                ),
                LegacyShape::new(Layout::Object, &["kind", "state"], SCHEMA_V2_5_0),
            ],
        }
    }
}

impl LegacyShapes {
    /// A table with no shapes at all.
    pub fn empty() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Adds a shape.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if a shape with the same layout and fields is
    /// already known.
    pub fn register(&mut self, shape: LegacyShape) -> Result<()> {
        if let Some(existing) = self
            .shapes
            .iter()
            .find(|s| s.layout == shape.layout && s.fields == shape.fields)
        {
            return Err(CleverbotError::configuration(format!(
                "Legacy shape {:?} is already mapped to {}",
                shape.fields, existing.version
            )));
        }
        self.shapes.push(shape);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Infers the version of an untagged document.
    ///
    /// # Errors
    ///
    /// Returns `Structural` when the document matches no known shape.
    pub fn sniff(&self, document: &Value) -> Result<Version> {
        let (layout, fields) = fields_of(document).ok_or_else(|| {
            CleverbotError::structural("Unversioned document is neither an object nor a positional pair")
        })?;

        let shape = self
            .shapes
            .iter()
            .find(|s| s.layout == layout && s.fields == fields)
            .ok_or_else(|| {
                CleverbotError::structural(format!(
                    "Unversioned document with fields {:?} matches no known schema",
                    fields
                ))
            })?;

        tracing::debug!("Detected legacy schema {} from fields {:?}", shape.version, fields);
        Ok(shape.version.clone())
    }
}

fn fields_of(document: &Value) -> Option<(Layout, BTreeSet<String>)> {
    match document {
        Value::Array(items) => match items.as_slice() {
            [Value::Object(root), Value::Array(_)] => {
                Some((Layout::Positional, root.keys().cloned().collect()))
            }
            _ => None,
        },
        Value::Object(map) => Some((Layout::Object, map.keys().cloned().collect())),
        _ => None,
    }
}
