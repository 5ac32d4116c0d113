use std::fmt;
use std::hash::{Hash, Hasher};

use super::pool::UnitId;

/// A literal in SAT terms - positive means "select", negative means "don't select"
pub type Literal = i32;

/// Types of rules generated during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// Additional requirement of the resolution request
    RootRequire,
    /// Root unit that must be selected
    Fixed,
    /// Unit requirement: if A is selected, then B|C|D must be selected
    Requires,
    /// Negative requirement: A and B cannot both be selected
    Conflict,
    /// Singleton versions of one unit id: at most one can be selected
    Singleton,
}

impl RuleType {
    /// Get the priority of this rule type (lower = higher priority)
    pub fn priority(&self) -> u8 {
        match self {
            RuleType::RootRequire | RuleType::Fixed => 1,
            RuleType::Requires | RuleType::Conflict | RuleType::Singleton => 0,
        }
    }

    /// Check if this rule type means "at most one of"
    pub fn is_multi_conflict(&self) -> bool {
        matches!(self, RuleType::Singleton)
    }

    fn as_str(&self) -> &'static str {
        match self {
            RuleType::RootRequire => "root-require",
            RuleType::Fixed => "fixed",
            RuleType::Requires => "requires",
            RuleType::Conflict => "conflict",
            RuleType::Singleton => "singleton",
        }
    }
}

/// A SAT rule (clause) representing a resolution constraint.
///
/// Rules are disjunctions (OR) of literals. A rule is satisfied when
/// at least one of its literals is true. Singleton rules are the exception:
/// they hold when at most one of their units is selected.
///
/// # Examples
///
/// - `[A]` - A must be selected (assertion)
/// - `[-A]` - A must not be selected (e.g. a requirement of A has no provider)
/// - `[-A, B, C]` - If A is selected, then B or C must be selected
/// - `[-A, -B]` - A and B cannot both be selected
/// - `[]` - unsatisfiable (a root requirement nothing provides)
#[derive(Clone)]
pub struct Rule {
    literals: Vec<Literal>,
    rule_type: RuleType,
    /// Rule ID (assigned by RuleSet)
    id: u32,
    /// Unit that owns the requirement (for error messages)
    source_unit: Option<UnitId>,
    /// Requirement text (for error messages)
    target: Option<String>,
    /// Filter or range of the requirement (for error messages)
    constraint: Option<String>,
}

impl Rule {
    pub fn new(literals: Vec<Literal>, rule_type: RuleType) -> Self {
        Self {
            literals,
            rule_type,
            id: 0,
            source_unit: None,
            target: None,
            constraint: None,
        }
    }

    /// Create an assertion rule (single literal that must be true)
    pub fn assertion(literal: Literal, rule_type: RuleType) -> Self {
        Self::new(vec![literal], rule_type)
    }

    /// Create a requirement rule: if source is selected, one of targets must be
    pub fn requires(source: UnitId, targets: Vec<UnitId>) -> Self {
        let mut literals = vec![-source];
        literals.extend(targets);
        Self::new(literals, RuleType::Requires).with_source(source)
    }

    /// Create a conflict rule: these units cannot all be selected together
    pub fn conflict(units: Vec<UnitId>) -> Self {
        let literals: Vec<_> = units.into_iter().map(|p| -p).collect();
        Self::new(literals, RuleType::Conflict)
    }

    /// Create a singleton rule: at most one of these units can be selected
    pub fn singleton(units: Vec<UnitId>) -> Self {
        let literals: Vec<_> = units.into_iter().map(|p| -p).collect();
        Self::new(literals, RuleType::Singleton)
    }

    /// Create a root requirement rule
    pub fn root_require(targets: Vec<UnitId>) -> Self {
        Self::new(targets, RuleType::RootRequire)
    }

    /// Create a fixed unit rule
    pub fn fixed(unit: UnitId) -> Self {
        Self::assertion(unit, RuleType::Fixed).with_source(unit)
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Set source unit for error messages
    pub fn with_source(mut self, unit: UnitId) -> Self {
        self.source_unit = Some(unit);
        self
    }

    /// Set target text for error messages
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set constraint text for error messages
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn source_unit(&self) -> Option<UnitId> {
        self.source_unit
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    pub fn is_multi_conflict(&self) -> bool {
        self.rule_type.is_multi_conflict()
    }

    /// Check if this is an assertion (single literal)
    pub fn is_assertion(&self) -> bool {
        self.literals.len() == 1
    }

    /// A requirement rule whose requirement has no provider at all
    pub fn is_missing_provider(&self) -> bool {
        self.rule_type == RuleType::Requires && self.literals.len() == 1
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Get a hash of this rule's literals for deduplication
    pub fn literal_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();

        let mut sorted = self.literals.clone();
        sorted.sort();
        sorted.hash(&mut hasher);
        self.rule_type.is_multi_conflict().hash(&mut hasher);

        hasher.finish()
    }

    /// Check if two rules have the same meaning (literal order ignored)
    pub fn equals_literals(&self, other: &Rule) -> bool {
        if self.literals.len() != other.literals.len()
            || self.is_multi_conflict() != other.is_multi_conflict()
        {
            return false;
        }

        let mut a = self.literals.clone();
        let mut b = other.literals.clone();
        a.sort();
        b.sort();
        a == b
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:?}, {:?})", self.rule_type, self.literals)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals: Vec<String> = self
            .literals
            .iter()
            .map(|&l| if l > 0 { format!("+{}", l) } else { l.to_string() })
            .collect();

        write!(f, "({}) [{}]", self.rule_type.as_str(), literals.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_requires() {
        let rule = Rule::requires(1, vec![2, 3, 4]);
        assert_eq!(rule.literals(), &[-1, 2, 3, 4]);
        assert_eq!(rule.rule_type(), RuleType::Requires);
        assert_eq!(rule.source_unit(), Some(1));
        assert!(!rule.is_missing_provider());
    }

    #[test]
    fn test_missing_provider() {
        let rule = Rule::requires(7, vec![]);
        assert_eq!(rule.literals(), &[-7]);
        assert!(rule.is_missing_provider());
    }

    #[test]
    fn test_rule_literal_hash() {
        let rule1 = Rule::new(vec![1, 2, 3], RuleType::Requires);
        let rule2 = Rule::new(vec![3, 1, 2], RuleType::Requires);
        let rule3 = Rule::new(vec![1, 2, 4], RuleType::Requires);

        assert_eq!(rule1.literal_hash(), rule2.literal_hash());
        assert_ne!(rule1.literal_hash(), rule3.literal_hash());
    }

    #[test]
    fn test_singleton_differs_from_conflict() {
        let conflict = Rule::conflict(vec![1, 2, 3]);
        let singleton = Rule::singleton(vec![1, 2, 3]);
        assert!(!conflict.equals_literals(&singleton));
        assert!(singleton.is_multi_conflict());
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::requires(1, vec![2, 3]);
        assert_eq!(rule.to_string(), "(requires) [-1 | +2 | +3]");
    }
}
