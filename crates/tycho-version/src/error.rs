use thiserror::Error;

/// Error type for version and range parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Invalid version range \"{range}\": {reason}")]
    InvalidRange { range: String, reason: String },
    #[error("Unknown match rule \"{0}\"")]
    UnknownMatchRule(String),
}
