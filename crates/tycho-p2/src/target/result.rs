use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::metadata::{ArtifactKey, InstallableUnit};

use super::environment::TargetEnvironment;

/// An artifact of a resolved unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    pub key: ArtifactKey,
    /// Build output of the reactor project publishing the unit; `None`
    /// when the artifact has to be fetched from a repository
    pub location: Option<PathBuf>,
}

/// Outcome of resolving one project for one environment
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    pub environment: TargetEnvironment,
    /// Selected units in resolution order
    pub units: Vec<Arc<InstallableUnit>>,
    /// Selected units not published by a reactor project
    pub non_reactor_units: Vec<Arc<InstallableUnit>>,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ResolutionResult {
    pub fn contains(&self, id: &str) -> bool {
        self.units.iter().any(|u| u.id() == id)
    }

    pub fn unit_ids(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.id()).collect()
    }
}
