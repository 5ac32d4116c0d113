use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tycho_version::Version;

use super::filter::FilterProperties;

/// A versioned fact provided by a unit.
///
/// Generic capabilities carry free-form attributes that expression
/// requirements can filter on. The capability name is exposed under the
/// namespace key and the version under `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    namespace: String,
    name: String,
    version: Version,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<String, String>,
}

impl Capability {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, version: Version) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

impl FilterProperties for Capability {
    fn property(&self, key: &str) -> Option<Cow<'_, str>> {
        if let Some(value) = self.attribute(key) {
            return Some(Cow::Borrowed(value));
        }
        if key.eq_ignore_ascii_case(&self.namespace) {
            Some(Cow::Borrowed(&self.name))
        } else if key.eq_ignore_ascii_case("version") {
            Some(Cow::Owned(self.version.to_string()))
        } else {
            None
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {} {}", self.namespace, self.name, self.version)
    }
}
