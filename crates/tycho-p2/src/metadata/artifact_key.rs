use std::fmt;

use serde::{Deserialize, Serialize};
use tycho_version::Version;

/// Identifies an artifact by classifier, id and version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub classifier: String,
    pub id: String,
    pub version: Version,
}

impl ArtifactKey {
    pub fn new(classifier: impl Into<String>, id: impl Into<String>, version: Version) -> Self {
        Self {
            classifier: classifier.into(),
            id: id.into(),
            version,
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.classifier, self.id, self.version)
    }
}
