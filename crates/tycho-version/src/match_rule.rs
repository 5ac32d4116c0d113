//! Feature `match` rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Version, VersionError, VersionRange};

/// How a feature import constrains the version of what it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchRule {
    /// Exactly the given version
    Perfect,
    /// Same major and minor, micro and qualifier may grow
    Equivalent,
    /// Same major, anything at or above the given version
    Compatible,
    /// The given version or anything newer
    GreaterOrEqual,
}

impl MatchRule {
    /// Parse the attribute value used in feature descriptors
    pub fn parse(rule: &str) -> Result<Self, VersionError> {
        match rule.trim() {
            "perfect" => Ok(MatchRule::Perfect),
            "equivalent" => Ok(MatchRule::Equivalent),
            "compatible" => Ok(MatchRule::Compatible),
            "greaterOrEqual" => Ok(MatchRule::GreaterOrEqual),
            other => Err(VersionError::UnknownMatchRule(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRule::Perfect => "perfect",
            MatchRule::Equivalent => "equivalent",
            MatchRule::Compatible => "compatible",
            MatchRule::GreaterOrEqual => "greaterOrEqual",
        }
    }

    /// The range of versions this rule accepts for a referenced version
    pub fn range_for(&self, version: &Version) -> VersionRange {
        match self {
            MatchRule::Perfect => VersionRange::exact(version.clone()),
            MatchRule::Equivalent => {
                VersionRange::new(version.clone(), true, version.next_minor(), false)
            }
            MatchRule::Compatible => {
                VersionRange::new(version.clone(), true, version.next_major(), false)
            }
            MatchRule::GreaterOrEqual => VersionRange::at_least(version.clone()),
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchRule {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchRule::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_compatible() {
        let range = MatchRule::Compatible.range_for(&v("2.3.0"));
        assert!(range.includes(&v("2.3.0")));
        assert!(range.includes(&v("2.99.1.x")));
        assert!(!range.includes(&v("3.0.0")));
        assert!(!range.includes(&v("2.2.9")));
    }

    #[test]
    fn test_equivalent() {
        let range = MatchRule::Equivalent.range_for(&v("1.4.2"));
        assert!(range.includes(&v("1.4.9")));
        assert!(!range.includes(&v("1.5.0")));
        assert_eq!(range.to_string(), "[1.4.2,1.5.0)");
    }

    #[test]
    fn test_perfect_and_greater_or_equal() {
        let perfect = MatchRule::Perfect.range_for(&v("1.0.0.v1"));
        assert!(perfect.includes(&v("1.0.0.v1")));
        assert!(!perfect.includes(&v("1.0.0.v2")));

        let open = MatchRule::GreaterOrEqual.range_for(&v("1.0.0"));
        assert!(open.includes(&v("42.0.0")));
        assert!(!open.includes(&v("0.9.0")));
    }

    #[test]
    fn test_parse() {
        assert_eq!(MatchRule::parse("greaterOrEqual").unwrap(), MatchRule::GreaterOrEqual);
        assert_eq!("perfect".parse::<MatchRule>().unwrap(), MatchRule::Perfect);
        assert!(MatchRule::parse("sometimes").is_err());
    }
}
