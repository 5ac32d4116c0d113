use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{P2Error, Result};
use crate::metadata::{InstallableUnit, UnitKey};

/// Build outputs of a reactor project, keyed by classifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactorArtifacts {
    main: Option<PathBuf>,
    secondary: IndexMap<String, PathBuf>,
}

impl ReactorArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main(&self) -> Option<&Path> {
        self.main.as_deref()
    }

    pub fn set_main(&mut self, location: impl Into<PathBuf>) {
        self.main = Some(location.into());
    }

    pub fn secondary(&self, classifier: &str) -> Option<&Path> {
        self.secondary.get(classifier).map(PathBuf::as_path)
    }

    pub fn classifiers(&self) -> impl Iterator<Item = &str> {
        self.secondary.keys().map(String::as_str)
    }
}

/// A project of the current build together with what it publishes
#[derive(Debug, Clone)]
pub struct ReactorProject {
    id: String,
    /// Units the project publishes into the target platform
    seed_units: Vec<Arc<InstallableUnit>>,
    /// Units whose requirements describe the project's own dependencies
    resolve_units: Vec<Arc<InstallableUnit>>,
    artifacts: ReactorArtifacts,
}

impl ReactorProject {
    /// `id` is the `groupId:artifactId` of the project
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            seed_units: Vec::new(),
            resolve_units: Vec::new(),
            artifacts: ReactorArtifacts::new(),
        }
    }

    /// Publish units; they are also the units the project resolves
    pub fn with_units(mut self, units: Vec<Arc<InstallableUnit>>) -> Self {
        self.resolve_units = units.clone();
        self.seed_units = units;
        self
    }

    pub fn with_seed_units(mut self, units: Vec<Arc<InstallableUnit>>) -> Self {
        self.seed_units = units;
        self
    }

    pub fn with_resolve_units(mut self, units: Vec<Arc<InstallableUnit>>) -> Self {
        self.resolve_units = units;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seed_units(&self) -> &[Arc<InstallableUnit>] {
        &self.seed_units
    }

    pub fn resolve_units(&self) -> &[Arc<InstallableUnit>] {
        &self.resolve_units
    }

    pub fn artifacts(&self) -> &ReactorArtifacts {
        &self.artifacts
    }

    pub fn publishes(&self, key: &UnitKey) -> bool {
        self.seed_units.iter().any(|u| &u.key() == key)
    }

    pub fn set_main_artifact(&mut self, location: impl Into<PathBuf>) {
        self.artifacts.set_main(location);
    }

    /// Attach an additional build output.
    ///
    /// Without a classifier the artifact becomes the main artifact, which
    /// fails when the project already has one.
    pub fn add_secondary_artifact(
        &mut self,
        classifier: Option<&str>,
        location: impl Into<PathBuf>,
    ) -> Result<()> {
        let location = location.into();
        match classifier.filter(|c| !c.is_empty()) {
            Some(classifier) => {
                if let Some(previous) = self.artifacts.secondary.insert(classifier.to_string(), location) {
                    log::warn!(
                        "Replacing artifact {} with classifier {} in project {}",
                        previous.display(),
                        classifier,
                        self.id
                    );
                }
                Ok(())
            }
            None if self.artifacts.main.is_some() => Err(P2Error::AmbiguousMainArtifact {
                project: self.id.clone(),
                detail: format!(
                    "artifact {} has no classifier but the project already has a main artifact",
                    location.display()
                ),
            }),
            None => {
                self.artifacts.main = Some(location);
                Ok(())
            }
        }
    }
}
