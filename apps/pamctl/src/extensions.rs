//! Extension scripts supplied by an external loader
//!
//! The core never fetches or packages scripts. It only consumes what an
//! [`ExtensionSource`] lists and builds a catalog from it, classes first.

use crate::error::CliResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Capability type of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExtensionKind {
    Class,
    Function,
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKind::Class => write!(f, "Class"),
            ExtensionKind::Function => write!(f, "Function"),
        }
    }
}

/// One script as described by its loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtensionScript {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ExtensionKind,
    pub source_locator: String,
    #[serde(default)]
    pub content: String,
}

/// Anything that can list extension scripts
pub trait ExtensionSource {
    /// Human-readable origin, used in warnings
    fn describe(&self) -> String;

    fn list(&self) -> CliResult<Vec<ExtensionScript>>;
}

/// Loaded scripts by name
#[derive(Debug, Default)]
pub struct ExtensionCatalog {
    scripts: BTreeMap<String, ExtensionScript>,
    /// Script name -> locator of the script that kept the name
    conflicts: BTreeMap<String, String>,
}

impl ExtensionCatalog {
    /// Load every source; classes are registered before functions and the
    /// first script to claim a name keeps it.
    pub fn load(sources: &[&dyn ExtensionSource]) -> Self {
        let mut listed = Vec::new();
        for source in sources {
            match source.list() {
                Ok(scripts) => listed.extend(scripts),
                Err(e) => {
                    tracing::warn!(source = %source.describe(), error = %e, "failed to list extensions")
                }
            }
        }
        // stable: keeps source order within a kind
        listed.sort_by_key(|script| script.kind);

        let mut catalog = Self::default();
        for script in listed {
            if let Some(existing) = catalog.scripts.get(&script.name) {
                tracing::debug!(name = %script.name, "extension name already taken");
                catalog
                    .conflicts
                    .insert(script.name.clone(), existing.source_locator.clone());
            } else {
                catalog.scripts.insert(script.name.clone(), script);
            }
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionScript> {
        self.scripts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn by_kind(&self, kind: ExtensionKind) -> impl Iterator<Item = &ExtensionScript> {
        self.scripts.values().filter(move |s| s.kind == kind)
    }

    pub fn has_conflict(&self, name: &str) -> bool {
        self.conflicts.contains_key(name)
    }

    pub fn conflicts(&self) -> &BTreeMap<String, String> {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
