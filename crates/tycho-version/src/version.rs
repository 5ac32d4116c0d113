//! OSGi version type

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::VersionError;

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(
        r"^(\d+)(?:\.(\d+)(?:\.(\d+)(?:\.([A-Za-z0-9_-]+))?)?)?$"
    ).unwrap();
}

/// Qualifier literal that build tooling replaces with a timestamp
pub(crate) const QUALIFIER_PLACEHOLDER: &str = "qualifier";

/// An OSGi version: `major.minor.micro.qualifier`.
///
/// Versions are totally ordered: numeric segments first, then the qualifier
/// compared lexically. The empty qualifier sorts before any other qualifier,
/// so `1.0.0 < 1.0.0.v2024`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    major: u32,
    minor: u32,
    micro: u32,
    qualifier: String,
}

impl Version {
    /// The empty version `0.0.0`
    pub const ZERO: Version = Version {
        major: 0,
        minor: 0,
        micro: 0,
        qualifier: String::new(),
    };

    /// Create a version without qualifier
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Version {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// Create a version with a qualifier
    pub fn with_qualifier(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Version {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }

    /// Parse an OSGi version string.
    ///
    /// Missing segments default to zero, so `"1.2"` parses as `1.2.0`.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let trimmed = version.trim();
        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| VersionError::InvalidVersion(version.to_string()))?;

        let segment = |idx: usize| -> Result<u32, VersionError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| VersionError::InvalidVersion(version.to_string())),
                None => Ok(0),
            }
        };

        Ok(Version {
            major: segment(1)?,
            minor: segment(2)?,
            micro: segment(3)?,
            qualifier: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn micro(&self) -> u32 {
        self.micro
    }

    /// The qualifier, if any
    pub fn qualifier(&self) -> Option<&str> {
        if self.qualifier.is_empty() {
            None
        } else {
            Some(&self.qualifier)
        }
    }

    /// Check if this is `0.0.0`
    pub fn is_zero(&self) -> bool {
        *self == Version::ZERO
    }

    /// Check if the qualifier is the unexpanded `qualifier` literal
    pub fn has_qualifier_placeholder(&self) -> bool {
        self.qualifier == QUALIFIER_PLACEHOLDER
    }

    /// The same version with the qualifier dropped
    pub fn without_qualifier(&self) -> Version {
        Version::new(self.major, self.minor, self.micro)
    }

    /// `major.minor.(micro+1)`
    pub fn next_micro(&self) -> Version {
        Version::new(self.major, self.minor, self.micro.saturating_add(1))
    }

    /// `major.(minor+1).0`
    pub fn next_minor(&self) -> Version {
        Version::new(self.major, self.minor.saturating_add(1), 0)
    }

    /// `(major+1).0.0`
    pub fn next_major(&self) -> Version {
        Version::new(self.major.saturating_add(1), 0, 0)
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::ZERO
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}
