//! Resource catalogs
//!
//! A catalog maps kind names to descriptors and names the root kind that
//! addresses the API base URL. Catalogs are declared in YAML; a built-in
//! catalog of common admin resources is embedded in the binary.

use super::kind::ResourceKind;
use super::node::starts_uppercase;
use crate::error::{Error, Result};
use crate::types::Verb;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Built-in catalog YAML
pub const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

#[derive(Debug, Deserialize)]
struct CatalogDef {
    root: String,
    resources: Vec<ResourceKind>,
}

/// Validated set of resource kinds
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    root: String,
    kinds: HashMap<String, Arc<ResourceKind>>,
}

impl ResourceCatalog {
    /// Build a catalog from kinds, validating every child reference
    pub fn new(root: impl Into<String>, kinds: Vec<ResourceKind>) -> Result<Self> {
        let root = root.into();
        let mut map = HashMap::with_capacity(kinds.len());
        for kind in kinds {
            if kind.key.trim().is_empty() {
                return Err(Error::config(format!(
                    "Resource '{}' has an empty key",
                    kind.name
                )));
            }
            let name = kind.name.clone();
            if map.insert(name.clone(), Arc::new(kind)).is_some() {
                return Err(Error::config(format!("Duplicate resource '{name}'")));
            }
        }

        let catalog = Self { root, kinds: map };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The embedded catalog of common admin resources
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let def: CatalogDef = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse resource catalog: {e}")))?;
        Self::new(def.root, def.resources)
    }

    /// Load a catalog file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read resource catalog '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if !self.kinds.contains_key(&self.root) {
            return Err(Error::config(format!(
                "Root resource '{}' is not defined",
                self.root
            )));
        }

        for kind in self.kinds.values() {
            for child in &kind.children {
                if !self.kinds.contains_key(&child.kind) {
                    return Err(Error::config(format!(
                        "Resource '{}' references undefined child '{}'",
                        kind.name, child.kind
                    )));
                }
                // navigation only reaches children through capitalized names
                if !starts_uppercase(child.exposed_name()) {
                    return Err(Error::config(format!(
                        "Resource '{}' exposes child '{}' without a capitalized name",
                        kind.name,
                        child.exposed_name()
                    )));
                }
            }

            for verb in Verb::ACTION_SCAN_ORDER {
                for action in kind.actions.for_verb(verb) {
                    if starts_uppercase(&action.name) {
                        return Err(Error::config(format!(
                            "Resource '{}' declares {} action '{}' with a capitalized name",
                            kind.name, verb, action.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Kind by type name
    pub fn kind(&self, name: &str) -> Option<Arc<ResourceKind>> {
        self.kinds.get(name).cloned()
    }

    /// The root kind
    pub fn root(&self) -> Result<Arc<ResourceKind>> {
        self.kind(&self.root)
            .ok_or_else(|| Error::config(format!("Root resource '{}' is not defined", self.root)))
    }

    /// All kind names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
