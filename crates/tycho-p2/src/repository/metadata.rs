use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{P2Error, Result};
use crate::metadata::InstallableUnit;

/// File read when a repository location is a directory
pub const CONTENT_FILE: &str = "content.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RepositoryContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    units: Vec<InstallableUnit>,
}

#[derive(Serialize)]
struct RepositoryContentRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    units: Vec<&'a InstallableUnit>,
}

/// A read-only set of units loaded from a JSON content listing
#[derive(Debug, Clone)]
pub struct MetadataRepository {
    id: String,
    name: Option<String>,
    location: Option<PathBuf>,
    units: Vec<Arc<InstallableUnit>>,
}

impl MetadataRepository {
    pub fn from_units(id: impl Into<String>, units: Vec<Arc<InstallableUnit>>) -> Self {
        Self {
            id: id.into(),
            name: None,
            location: None,
            units,
        }
    }

    /// Load `{"units": [...]}` from a file or from `content.json` in a
    /// directory
    pub fn load(id: impl Into<String>, location: impl AsRef<Path>) -> Result<Self> {
        let id = id.into();
        let location = location.as_ref();
        let file = if location.is_dir() {
            location.join(CONTENT_FILE)
        } else {
            location.to_path_buf()
        };

        let contents = fs::read_to_string(&file).map_err(|e| {
            P2Error::Config(format!("Failed to read repository {} at {}: {}", id, file.display(), e))
        })?;
        let content: RepositoryContent = serde_json::from_str(&contents)?;

        let units: Vec<Arc<InstallableUnit>> = content
            .units
            .into_iter()
            .map(|unit| Arc::new(unit.with_self_capability()))
            .collect();
        log::debug!("Loaded {} units from repository {} ({})", units.len(), id, file.display());

        Ok(Self {
            id,
            name: content.name,
            location: Some(location.to_path_buf()),
            units,
        })
    }

    /// Write the repository as a JSON content listing
    pub fn save(&self, file: impl AsRef<Path>) -> Result<()> {
        let content = RepositoryContentRef {
            name: self.name.as_deref(),
            units: self.units.iter().map(|u| u.as_ref()).collect(),
        };
        let json = serde_json::to_string_pretty(&content)?;
        fs::write(file, json)?;
        Ok(())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn units(&self) -> &[Arc<InstallableUnit>] {
        &self.units
    }

    /// All versions of a unit, in repository order
    pub fn query(&self, id: &str) -> impl Iterator<Item = &Arc<InstallableUnit>> + '_ {
        let id = id.to_string();
        self.units.iter().filter(move |u| u.id() == id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
