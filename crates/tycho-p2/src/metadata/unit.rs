use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tycho_version::{Version, VersionRange};

use super::artifact_key::ArtifactKey;
use super::capability::Capability;
use super::context::SelectionContext;
use super::filter::Filter;
use super::namespace;
use super::requirement::Requirement;

/// Identity of a unit within one resolution universe
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub id: String,
    pub version: Version,
}

impl UnitKey {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// An installable unit: the unit of p2 provisioning metadata.
///
/// Units are built once through [`InstallableUnitBuilder`] and shared as
/// `Arc<InstallableUnit>`; resolution only ever selects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallableUnit {
    id: String,
    version: Version,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    requirements: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    touchpoint_data: IndexMap<String, String>,
    #[serde(default)]
    singleton: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<ArtifactKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    host_requirements: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_range: Option<VersionRange>,
}

impl InstallableUnit {
    pub fn builder(id: impl Into<String>, version: Version) -> InstallableUnitBuilder {
        InstallableUnitBuilder::new(id, version)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn key(&self) -> UnitKey {
        UnitKey::new(self.id.clone(), self.version.clone())
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn touchpoint_data(&self) -> &IndexMap<String, String> {
        &self.touchpoint_data
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn artifacts(&self) -> &[ArtifactKey] {
        &self.artifacts
    }

    pub fn host_requirements(&self) -> &[Requirement] {
        &self.host_requirements
    }

    pub fn update_range(&self) -> Option<&VersionRange> {
        self.update_range.as_ref()
    }

    /// Fragments attach to a host unit
    pub fn is_fragment(&self) -> bool {
        !self.host_requirements.is_empty()
    }

    /// Check if the unit provides a capability with this namespace and name
    pub fn provides(&self, namespace: &str, name: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.namespace() == namespace && c.name() == name)
    }

    /// Capabilities in one namespace
    pub fn capabilities_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a Capability> + 'a {
        self.capabilities
            .iter()
            .filter(move |c| c.namespace() == namespace)
    }

    /// Check if any capability satisfies the requirement
    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        self.capabilities.iter().any(|c| requirement.matches(c))
    }

    /// Check if the unit's filter accepts the context
    pub fn is_applicable(&self, context: &SelectionContext) -> bool {
        self.filter
            .as_ref()
            .map(|f| f.matches(context))
            .unwrap_or(true)
    }

    /// Requirements in effect for this unit: its own plus host requirements
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().chain(
            self.host_requirements
                .iter()
                .filter(move |h| !self.requirements.contains(h)),
        )
    }

    /// Copy of this unit that is guaranteed to provide its own identity
    pub fn with_self_capability(self) -> InstallableUnit {
        if self.provides(namespace::IU, &self.id) {
            return self;
        }
        let mut unit = self;
        let cap = Capability::new(namespace::IU, unit.id.clone(), unit.version.clone());
        unit.capabilities.insert(0, cap);
        unit
    }
}

impl fmt::Display for InstallableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Builder for [`InstallableUnit`].
///
/// The unit's self capability is added up front; capabilities keep
/// insertion order and are never duplicated.
#[derive(Debug, Clone)]
pub struct InstallableUnitBuilder {
    unit: InstallableUnit,
}

impl InstallableUnitBuilder {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        let id = id.into();
        let self_capability = Capability::new(namespace::IU, id.clone(), version.clone());
        Self {
            unit: InstallableUnit {
                id,
                version,
                requirements: Vec::new(),
                capabilities: vec![self_capability],
                filter: None,
                properties: IndexMap::new(),
                touchpoint_data: IndexMap::new(),
                singleton: false,
                artifacts: Vec::new(),
                host_requirements: Vec::new(),
                update_range: None,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.unit.id
    }

    pub fn version(&self) -> &Version {
        &self.unit.version
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.unit.properties
    }

    pub fn add_requirement(&mut self, requirement: Requirement) -> &mut Self {
        self.unit.requirements.push(requirement);
        self
    }

    pub fn add_requirements(&mut self, requirements: impl IntoIterator<Item = Requirement>) -> &mut Self {
        for requirement in requirements {
            self.add_requirement(requirement);
        }
        self
    }

    pub fn add_capability(&mut self, capability: Capability) -> &mut Self {
        if !self.unit.capabilities.contains(&capability) {
            self.unit.capabilities.push(capability);
        }
        self
    }

    pub fn add_capabilities(&mut self, capabilities: impl IntoIterator<Item = Capability>) -> &mut Self {
        for capability in capabilities {
            self.add_capability(capability);
        }
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.unit.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_touchpoint(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.unit.touchpoint_data.insert(key.into(), value.into());
        self
    }

    pub fn set_filter(&mut self, filter: Option<Filter>) -> &mut Self {
        self.unit.filter = filter;
        self
    }

    pub fn set_singleton(&mut self, singleton: bool) -> &mut Self {
        self.unit.singleton = singleton;
        self
    }

    pub fn add_artifact(&mut self, key: ArtifactKey) -> &mut Self {
        if !self.unit.artifacts.contains(&key) {
            self.unit.artifacts.push(key);
        }
        self
    }

    /// Attach the unit as a fragment of hosts matching `requirement`
    pub fn add_host_requirement(&mut self, requirement: Requirement) -> &mut Self {
        self.unit.host_requirements.push(requirement);
        self
    }

    pub fn set_update_range(&mut self, range: VersionRange) -> &mut Self {
        self.unit.update_range = Some(range);
        self
    }

    pub fn build(self) -> Arc<InstallableUnit> {
        Arc::new(self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_adds_self_capability_once() {
        let mut builder = InstallableUnit::builder("a", Version::new(1, 0, 0));
        builder.add_capability(Capability::new(namespace::IU, "a", Version::new(1, 0, 0)));
        builder.add_capability(Capability::new(namespace::OSGI_BUNDLE, "a", Version::new(1, 0, 0)));
        let unit = builder.build();

        assert_eq!(unit.capabilities().len(), 2);
        assert!(unit.provides(namespace::IU, "a"));
        assert_eq!(unit.key(), UnitKey::new("a", Version::new(1, 0, 0)));
    }

    #[test]
    fn test_structural_equality() {
        let mut a = InstallableUnit::builder("x", Version::new(1, 0, 0));
        a.set_property("p", "1");
        let mut b = InstallableUnit::builder("x", Version::new(1, 0, 0));
        b.set_property("p", "2");

        let (a, b) = (a.build(), b.build());
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
    }

    #[test]
    fn test_applicability() {
        let mut builder = InstallableUnit::builder("frag", Version::new(1, 0, 0));
        builder.set_filter(Some(Filter::parse("(osgi.os=linux)").unwrap()));
        let unit = builder.build();

        assert!(unit.is_applicable(&SelectionContext::new().with("osgi.os", "linux")));
        assert!(!unit.is_applicable(&SelectionContext::new().with("osgi.os", "macosx")));
    }

    #[test]
    fn test_json_roundtrip_adds_self_capability() {
        let unit: InstallableUnit = serde_json::from_str(
            r#"{"id":"b","version":"2.0.0","requirements":[{"namespace":"osgi.bundle","name":"a"}]}"#,
        )
        .unwrap();
        let unit = unit.with_self_capability();

        assert!(unit.provides(namespace::IU, "b"));
        assert_eq!(unit.requirements().len(), 1);
        assert!(unit.requirements()[0].range().unwrap().is_any());
    }
}
