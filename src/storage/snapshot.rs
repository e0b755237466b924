//! JSON snapshot of a project index
//!
//! The platform's indexer exports what the resolver needs into one file; the
//! CLI and the integration tests load it into a `MemoryIndex`.

use super::MemoryIndex;
use crate::error::{ErrorContext, IndexError, IndexResult};
use crate::index::{ClassInfo, ParameterDefinition, Route, ServiceDefinition, TemplateFile};
use crate::symbol::Declaration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Version of the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// A class-level element plus its literal value, if it has one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementEntry {
    pub declaration: Declaration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
    /// In merge order: later entries override earlier ones
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    #[serde(default)]
    pub templates: Vec<TemplateFile>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub translations: Vec<Declaration>,
    #[serde(default)]
    pub domain_files: Vec<Declaration>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Default for IndexSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            elements: Vec::new(),
            services: Vec::new(),
            parameters: Vec::new(),
            classes: Vec::new(),
            templates: Vec::new(),
            routes: Vec::new(),
            translations: Vec::new(),
            domain_files: Vec::new(),
        }
    }
}

impl IndexSnapshot {
    pub fn from_json(json: &str, origin: &Path) -> IndexResult<Self> {
        let snapshot: Self = serde_json::from_str(json).with_path(origin)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(IndexError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Load a snapshot from file
    pub fn load(path: &Path) -> IndexResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| IndexError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json, path)
    }

    /// Save the snapshot to file
    pub fn save(&self, path: &Path) -> IndexResult<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IndexError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, json).map_err(|e| IndexError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn into_index(self) -> MemoryIndex {
        let index = MemoryIndex::new();

        for entry in self.elements {
            index.insert_element(entry.declaration, entry.literal);
        }
        for service in self.services {
            index.insert_service(service);
        }
        for parameter in self.parameters {
            index.insert_parameter(parameter);
        }
        for class in self.classes {
            index.insert_class(class);
        }
        for template in self.templates {
            index.insert_template(template);
        }
        for route in self.routes {
            index.insert_route(route);
        }
        for entry in self.translations {
            if !index.insert_translation(entry) {
                warn!("snapshot translations may only hold translation entries");
            }
        }
        for file in self.domain_files {
            if !index.insert_domain_file(file) {
                warn!("snapshot domain_files may only hold translation domains");
            }
        }

        debug!("loaded snapshot: {:?}", index.stats());
        index
    }
}

impl MemoryIndex {
    /// Load a snapshot file straight into an index
    pub fn load(path: &Path) -> IndexResult<Self> {
        IndexSnapshot::load(path).map(IndexSnapshot::into_index)
    }
}
