use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::metadata::{InstallableUnit, UnitKey};

/// Which inputs a target platform is assembled from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetPlatformStage {
    /// External repositories, reactor seeds and execution environment units
    #[default]
    Preliminary,
    /// Additionally the units of pom dependencies
    Final,
}

/// The universe of units resolutions run against
#[derive(Debug, Clone)]
pub struct TargetPlatform {
    stage: TargetPlatformStage,
    units: IndexMap<UnitKey, Arc<InstallableUnit>>,
    /// Unit key -> id of the reactor project publishing it
    reactor_units: HashMap<UnitKey, String>,
}

impl TargetPlatform {
    pub(crate) fn new(stage: TargetPlatformStage) -> Self {
        Self {
            stage,
            units: IndexMap::new(),
            reactor_units: HashMap::new(),
        }
    }

    /// Add an external unit; the first unit for a key wins
    pub(crate) fn add_external(&mut self, unit: Arc<InstallableUnit>) {
        self.units.entry(unit.key()).or_insert(unit);
    }

    /// Add a reactor unit, shadowing an external unit with the same key
    pub(crate) fn add_reactor(&mut self, project: &str, unit: Arc<InstallableUnit>) {
        let key = unit.key();
        if self.units.contains_key(&key) && !self.reactor_units.contains_key(&key) {
            log::debug!("Reactor unit {} shadows a repository unit", key);
        }
        self.reactor_units.insert(key.clone(), project.to_string());
        self.units.insert(key, unit);
    }

    pub fn stage(&self) -> TargetPlatformStage {
        self.stage
    }

    pub fn units(&self) -> Vec<Arc<InstallableUnit>> {
        self.units.values().cloned().collect()
    }

    pub fn find(&self, key: &UnitKey) -> Option<&Arc<InstallableUnit>> {
        self.units.get(key)
    }

    pub fn is_reactor_unit(&self, key: &UnitKey) -> bool {
        self.reactor_units.contains_key(key)
    }

    /// The reactor project publishing a unit
    pub fn reactor_project_of(&self, key: &UnitKey) -> Option<&str> {
        self.reactor_units.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
