//! Version ranges in OSGi interval notation

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Version, VersionError};

/// A version interval such as `[1.0.0,2.0.0)`.
///
/// A missing upper bound means the range is unbounded above. The bare
/// notation `1.0.0` is the unbounded range starting at `1.0.0`, and
/// `0.0.0` therefore accepts every version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Version,
    include_min: bool,
    max: Option<Version>,
    include_max: bool,
}

impl VersionRange {
    /// Create a bounded range
    pub fn new(min: Version, include_min: bool, max: Version, include_max: bool) -> Self {
        VersionRange {
            min,
            include_min,
            max: Some(max),
            include_max,
        }
    }

    /// The range accepting every version
    pub fn any() -> Self {
        Self::at_least(Version::ZERO)
    }

    /// `[min, ∞)`
    pub fn at_least(min: Version) -> Self {
        VersionRange {
            min,
            include_min: true,
            max: None,
            include_max: false,
        }
    }

    /// `[version, version]`
    pub fn exact(version: Version) -> Self {
        Self::new(version.clone(), true, version, true)
    }

    /// The range that includes no version at all
    pub fn empty() -> Self {
        Self::new(Version::ZERO, false, Version::ZERO, false)
    }

    /// Range used when one unit references another by version.
    ///
    /// `0.0.0` references any version, an unexpanded `.qualifier` references
    /// every build of that `major.minor.micro`, anything else is exact.
    pub fn for_reference(version: &Version) -> Self {
        if version.is_zero() {
            Self::any()
        } else if version.has_qualifier_placeholder() {
            let base = version.without_qualifier();
            let upper = base.next_micro();
            Self::new(base, true, upper, false)
        } else {
            Self::exact(version.clone())
        }
    }

    /// Parse OSGi range notation
    pub fn parse(range: &str) -> Result<Self, VersionError> {
        let trimmed = range.trim();
        if trimmed.is_empty() {
            return Ok(Self::any());
        }

        let first = trimmed.chars().next().unwrap_or(' ');
        if first != '[' && first != '(' {
            let min = Version::parse(trimmed).map_err(|_| VersionError::InvalidRange {
                range: range.to_string(),
                reason: "invalid version".to_string(),
            })?;
            return Ok(Self::at_least(min));
        }

        let invalid = |reason: &str| VersionError::InvalidRange {
            range: range.to_string(),
            reason: reason.to_string(),
        };

        let last = trimmed.chars().last().unwrap_or(' ');
        if last != ']' && last != ')' {
            return Err(invalid("missing closing bracket"));
        }

        let inner = &trimmed[1..trimmed.len() - 1];
        let (left, right) = inner
            .split_once(',')
            .ok_or_else(|| invalid("expected two comma separated versions"))?;

        let min = Version::parse(left).map_err(|_| invalid("invalid lower bound"))?;
        let max = Version::parse(right).map_err(|_| invalid("invalid upper bound"))?;

        Ok(Self::new(min, first == '[', max, last == ']'))
    }

    pub fn min(&self) -> &Version {
        &self.min
    }

    pub fn max(&self) -> Option<&Version> {
        self.max.as_ref()
    }

    pub fn includes_min(&self) -> bool {
        self.include_min
    }

    pub fn includes_max(&self) -> bool {
        self.include_max
    }

    /// Check if a version lies within this range
    pub fn includes(&self, version: &Version) -> bool {
        match version.cmp(&self.min) {
            Ordering::Less => return false,
            Ordering::Equal if !self.include_min => return false,
            _ => {}
        }

        match &self.max {
            None => true,
            Some(max) => match version.cmp(max) {
                Ordering::Less => true,
                Ordering::Equal => self.include_max,
                Ordering::Greater => false,
            },
        }
    }

    /// Check if no version can satisfy this range
    pub fn is_empty(&self) -> bool {
        match &self.max {
            None => false,
            Some(max) => match self.min.cmp(max) {
                Ordering::Greater => true,
                Ordering::Equal => !(self.include_min && self.include_max),
                Ordering::Less => false,
            },
        }
    }

    /// Check if the range accepts every version
    pub fn is_any(&self) -> bool {
        self.min.is_zero() && self.include_min && self.max.is_none()
    }

    /// The single version this range accepts, if it is exact
    pub fn as_exact(&self) -> Option<&Version> {
        match &self.max {
            Some(max) if *max == self.min && self.include_min && self.include_max => Some(max),
            _ => None,
        }
    }

    /// Intersection of two ranges (possibly empty)
    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        let (min, include_min) = match self.min.cmp(&other.min) {
            Ordering::Greater => (self.min.clone(), self.include_min),
            Ordering::Less => (other.min.clone(), other.include_min),
            Ordering::Equal => (self.min.clone(), self.include_min && other.include_min),
        };

        let (max, include_max) = match (&self.max, &other.max) {
            (None, None) => (None, false),
            (Some(a), None) => (Some(a.clone()), self.include_max),
            (None, Some(b)) => (Some(b.clone()), other.include_max),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Less => (Some(a.clone()), self.include_max),
                Ordering::Greater => (Some(b.clone()), other.include_max),
                Ordering::Equal => (Some(a.clone()), self.include_max && other.include_max),
            },
        };

        VersionRange {
            min,
            include_min,
            max,
            include_max,
        }
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.max {
            None if self.include_min => write!(f, "{}", self.min),
            None => write!(f, "({},MAX)", self.min),
            Some(max) => write!(
                f,
                "{}{},{}{}",
                if self.include_min { '[' } else { '(' },
                self.min,
                max,
                if self.include_max { ']' } else { ')' }
            ),
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        VersionRange::parse(&s).map_err(serde::de::Error::custom)
    }
}
