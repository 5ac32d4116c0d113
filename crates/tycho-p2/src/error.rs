use std::fmt;

use thiserror::Error;
use tycho_version::VersionError;

use crate::metadata::{ArtifactKey, UnitKey};
use crate::status::Status;

/// A unit published by more than one reactor project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateUnit {
    pub key: UnitKey,
    pub projects: Vec<String>,
}

impl fmt::Display for DuplicateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (projects: {})", self.key, self.projects.join(", "))
    }
}

fn describe_duplicates(duplicates: &[DuplicateUnit]) -> String {
    duplicates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum P2Error {
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("Invalid filter \"{filter}\": {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to translate {origin}: {reason}")]
    Translation { origin: String, reason: String },

    #[error("{0}")]
    Unsatisfiable(Status),

    #[error("Duplicate reactor units: {}", describe_duplicates(.0))]
    DuplicateReactorUnits(Vec<DuplicateUnit>),

    #[error("Ambiguous main artifact in project {project}: {detail}")]
    AmbiguousMainArtifact { project: String, detail: String },

    #[error("Resolution failed for environment {environment}: {reason}")]
    EnvironmentResolution { environment: String, reason: String },

    #[error("Artifact {key} could not be obtained: {status}")]
    ArtifactNotFound { key: ArtifactKey, status: Status },

    #[error("Operation canceled")]
    Canceled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl P2Error {
    /// Create a translation error attributed to a source
    pub fn translation(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        P2Error::Translation {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// The diagnostic status carried by this error, if any
    pub fn status(&self) -> Option<&Status> {
        match self {
            P2Error::Unsatisfiable(status) | P2Error::ArtifactNotFound { status, .. } => {
                Some(status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, P2Error>;
