use std::fmt;

use serde::{Deserialize, Serialize};
use tycho_version::VersionRange;

use super::capability::Capability;
use super::context::SelectionContext;
use super::filter::Filter;

/// What a requirement matches: a named capability in a version range, or
/// any capability of the namespace accepted by a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementMatch {
    Named {
        name: String,
        #[serde(default)]
        range: VersionRange,
    },
    Expression {
        #[serde(rename = "match")]
        filter: Filter,
    },
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn is_one(value: &u32) -> bool {
    *value == 1
}

fn is_true(value: &bool) -> bool {
    *value
}

/// A constraint a unit needs satisfied by some capability.
///
/// Occurrence bounds give the kind: `(0,1)` optional, `(1,1)` required,
/// `(1,n)` required multiple and `max == 0` a negative requirement whose
/// match must be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    namespace: String,
    #[serde(flatten)]
    matcher: RequirementMatch,
    #[serde(default = "default_one", skip_serializing_if = "is_one")]
    min: u32,
    #[serde(default = "default_one", skip_serializing_if = "is_one")]
    max: u32,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    greedy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Requirement {
    /// A required, greedy requirement on a named capability
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            namespace: namespace.into(),
            matcher: RequirementMatch::Named {
                name: name.into(),
                range,
            },
            min: 1,
            max: 1,
            greedy: true,
            filter: None,
            description: None,
        }
    }

    /// A required, greedy requirement on any capability accepted by `filter`
    pub fn expression(namespace: impl Into<String>, filter: Filter) -> Self {
        Self {
            namespace: namespace.into(),
            matcher: RequirementMatch::Expression { filter },
            min: 1,
            max: 1,
            greedy: true,
            filter: None,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.min = 0;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.max = u32::MAX;
        self
    }

    /// Turn this into a negative requirement
    pub fn negated(mut self) -> Self {
        self.min = 0;
        self.max = 0;
        self
    }

    pub fn with_occurrence(mut self, min: u32, max: u32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn with_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn matcher(&self) -> &RequirementMatch {
        &self.matcher
    }

    /// The capability name for named requirements
    pub fn name(&self) -> Option<&str> {
        match &self.matcher {
            RequirementMatch::Named { name, .. } => Some(name),
            RequirementMatch::Expression { .. } => None,
        }
    }

    /// The version range for named requirements
    pub fn range(&self) -> Option<&VersionRange> {
        match &self.matcher {
            RequirementMatch::Named { range, .. } => Some(range),
            RequirementMatch::Expression { .. } => None,
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.min == 0 && self.max > 0
    }

    pub fn is_negative(&self) -> bool {
        self.max == 0
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    /// Check if a capability satisfies this requirement's match
    pub fn matches(&self, capability: &Capability) -> bool {
        if capability.namespace() != self.namespace {
            return false;
        }
        match &self.matcher {
            RequirementMatch::Named { name, range } => {
                capability.name() == name && range.includes(capability.version())
            }
            RequirementMatch::Expression { filter } => filter.matches(capability),
        }
    }

    /// Check if this requirement applies in the given context
    pub fn is_applicable(&self, context: &SelectionContext) -> bool {
        self.filter
            .as_ref()
            .map(|f| f.matches(context))
            .unwrap_or(true)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            RequirementMatch::Named { name, range } => {
                write!(f, "{}; {} {}", self.namespace, name, range)
            }
            RequirementMatch::Expression { filter } => write!(f, "{}; {}", self.namespace, filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tycho_version::Version;

    fn range(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_named_match() {
        let req = Requirement::new("osgi.bundle", "org.foo", range("[1.0.0,2.0.0)"));
        assert!(req.matches(&Capability::new("osgi.bundle", "org.foo", Version::new(1, 5, 0))));
        assert!(!req.matches(&Capability::new("osgi.bundle", "org.foo", Version::new(2, 0, 0))));
        assert!(!req.matches(&Capability::new("java.package", "org.foo", Version::new(1, 0, 0))));
        assert_eq!(req.to_string(), "osgi.bundle; org.foo [1.0.0,2.0.0)");
    }

    #[test]
    fn test_expression_match() {
        let req = Requirement::expression(
            "osgi.ee",
            Filter::parse("(&(osgi.ee=JavaSE)(version>=11))").unwrap(),
        );
        assert!(req.matches(&Capability::new("osgi.ee", "JavaSE", Version::new(17, 0, 0))));
        assert!(!req.matches(&Capability::new("osgi.ee", "JavaSE", Version::new(1, 8, 0))));
    }

    #[test]
    fn test_occurrence_kinds() {
        let req = Requirement::new("java.package", "foo.bar", VersionRange::any());
        assert!(req.is_required());
        assert!(!req.is_optional());

        let optional = req.clone().optional().with_greedy(false);
        assert!(optional.is_optional());
        assert!(!optional.is_greedy());

        let negative = req.negated();
        assert!(negative.is_negative());
        assert!(!negative.is_optional());
    }

    #[test]
    fn test_applicability() {
        let req = Requirement::new("osgi.bundle", "a", VersionRange::any())
            .with_filter(Some(Filter::parse("(osgi.os=linux)").unwrap()));
        assert!(req.is_applicable(&SelectionContext::new().with("osgi.os", "linux")));
        assert!(!req.is_applicable(&SelectionContext::new().with("osgi.os", "win32")));
    }

    #[test]
    fn test_json_forms() {
        let named: Requirement =
            serde_json::from_str(r#"{"namespace":"osgi.bundle","name":"a","range":"[1.0.0,2.0.0)","min":0}"#)
                .unwrap();
        assert_eq!(named.name(), Some("a"));
        assert!(named.is_optional());
        assert!(named.is_greedy());

        let expr: Requirement =
            serde_json::from_str(r#"{"namespace":"osgi.ee","match":"(osgi.ee=JavaSE)"}"#).unwrap();
        assert!(expr.name().is_none());
        assert!(expr.is_required());
    }
}
