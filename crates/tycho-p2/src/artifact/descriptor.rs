use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::metadata::ArtifactKey;

pub const PROP_SHA256: &str = "download.checksum.sha-256";
pub const PROP_SIZE: &str = "download.size";

/// On-disk representation of an artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactFormat {
    #[default]
    Canonical,
    Packed,
    Other(String),
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactFormat::Canonical => f.write_str("canonical"),
            ArtifactFormat::Packed => f.write_str("packed"),
            ArtifactFormat::Other(name) => f.write_str(name),
        }
    }
}

/// One stored representation of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    pub key: ArtifactKey,
    #[serde(default)]
    pub format: ArtifactFormat,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

impl ArtifactDescriptor {
    pub fn new(key: ArtifactKey) -> Self {
        Self {
            key,
            format: ArtifactFormat::Canonical,
            properties: IndexMap::new(),
        }
    }

    pub fn with_format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Record size and checksum of the given content
    pub fn with_content_of(self, bytes: &[u8]) -> Self {
        self.with_property(PROP_SIZE, bytes.len().to_string())
            .with_property(PROP_SHA256, sha256_hex(bytes))
    }

    pub fn sha256(&self) -> Option<&str> {
        self.properties.get(PROP_SHA256).map(String::as_str)
    }

    /// Check content against the recorded checksum; passes without one
    pub fn verify(&self, bytes: &[u8]) -> bool {
        match self.sha256() {
            Some(expected) => sha256_hex(bytes).eq_ignore_ascii_case(expected),
            None => true,
        }
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.format)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
