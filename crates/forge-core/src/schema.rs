//! Entity schemas and the schema registry

use crate::compiler::{CompiledQuery, NavigationCompiler};
use crate::error::{Error, Result};
use crate::limits::validate_identifier;
use crate::path::PathExpression;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Schema of one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub required_fields: BTreeSet<String>,
    pub indexed_fields: BTreeSet<String>,
    pub navigation: BTreeMap<String, PathExpression>,
}

impl SchemaEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_fields: BTreeSet::new(),
            indexed_fields: BTreeSet::new(),
            navigation: BTreeMap::new(),
        }
    }

    pub fn with_required(mut self, field: impl Into<String>) -> Self {
        self.required_fields.insert(field.into());
        self
    }

    pub fn with_indexed(mut self, field: impl Into<String>) -> Self {
        self.indexed_fields.insert(field.into());
        self
    }

    pub fn with_navigation(mut self, name: impl Into<String>, path: PathExpression) -> Self {
        self.navigation.insert(name.into(), path);
        self
    }

    pub fn navigation(&self, name: &str) -> Option<&PathExpression> {
        self.navigation.get(name)
    }

    pub fn is_indexed(&self, field: &str) -> bool {
        self.indexed_fields.contains(field)
    }
}

/// Entity definition as written in a schema file
#[derive(Debug, Deserialize)]
struct EntityDef {
    #[serde(default, alias = "required_fields", alias = "reqs")]
    required: Vec<String>,
    #[serde(default)]
    indexed: Vec<String>,
    #[serde(default, alias = "nav", alias = "navigation_properties")]
    navigation: BTreeMap<String, PathExpression>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    entity: BTreeMap<String, EntityDef>,
}

/// Immutable collection of entity schemas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry while building the registry
    pub fn with_entry(mut self, entry: SchemaEntry) -> Self {
        self.entries.insert(entry.name.clone(), entry);
        self
    }

    /// Load a registry from schema TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: SchemaFile =
            toml::from_str(text).map_err(|e| Error::Schema(e.to_string()))?;

        let mut registry = Self::new();
        for (name, def) in file.entity {
            validate_identifier(&name).map_err(|e| Error::Schema(e.to_string()))?;
            let entry = SchemaEntry {
                name: name.clone(),
                required_fields: def.required.into_iter().collect(),
                indexed_fields: def.indexed.into_iter().collect(),
                navigation: def.navigation,
            };
            registry.entries.insert(name, entry);
        }
        tracing::info!("Loaded schema with {} entities", registry.entries.len());
        Ok(registry)
    }

    /// Load a registry from a schema TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Schema(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn get(&self, entity: &str) -> Option<&SchemaEntry> {
        self.entries.get(entity)
    }

    /// Look up an entity, failing if it is not registered
    pub fn entry(&self, entity: &str) -> Result<&SchemaEntry> {
        self.get(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entries.contains_key(entity)
    }

    /// Navigation path declared on an entity
    pub fn navigation(&self, entity: &str, name: &str) -> Result<&PathExpression> {
        self.entry(entity)?
            .navigation(name)
            .ok_or_else(|| Error::UnknownNavigation {
                entity: entity.to_string(),
                navigation: name.to_string(),
            })
    }

    pub fn entities(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile every declared navigation, failing on the first bad path
    pub fn check(&self) -> Result<Vec<(String, String, CompiledQuery)>> {
        let mut compiled = Vec::new();
        for entry in self.entries.values() {
            for (name, path) in &entry.navigation {
                let query = NavigationCompiler::compile(path, None).map_err(|e| {
                    Error::Schema(format!("{}.{}: {}", entry.name, name, e))
                })?;
                if let Some(endpoint) = path.endpoint() {
                    if !self.contains(endpoint) {
                        tracing::warn!(
                            "Navigation {}.{} ends on unregistered entity '{}'; results stay raw",
                            entry.name,
                            name,
                            endpoint
                        );
                    }
                }
                compiled.push((entry.name.clone(), name.clone(), query));
            }
        }
        Ok(compiled)
    }
}
