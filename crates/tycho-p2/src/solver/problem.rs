use std::fmt;

use crate::status::Status;

use super::pool::{Pool, UnitId};
use super::rule::{Rule, RuleType};

/// A problem encountered during resolution.
///
/// Problems explain why a solution cannot be found.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    /// Rules involved in this problem
    pub rules: Vec<ProblemRule>,
    /// Human-readable explanation
    pub message: Option<String>,
}

/// A rule that contributes to a problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemRule {
    pub rule_id: u32,
    pub rule_type: RuleType,
    /// Unit owning the requirement, resolved when the problem is created
    pub source: Option<String>,
    /// Requirement text
    pub target: Option<String>,
    /// Units named by the rule literals
    pub units: Vec<String>,
    /// The rule had no literal at all, or only the negated source
    pub missing: bool,
}

impl ProblemRule {
    fn from_rule(rule: &Rule, pool: &Pool) -> Self {
        let name = |id: UnitId| {
            pool.unit(id)
                .map(|u| u.to_string())
                .unwrap_or_else(|| format!("#{}", id))
        };

        Self {
            rule_id: rule.id(),
            rule_type: rule.rule_type(),
            source: rule.source_unit().map(name),
            target: rule.target().map(String::from),
            units: rule.literals().iter().map(|l| name(l.abs())).collect(),
            missing: rule.is_empty() || rule.is_missing_provider(),
        }
    }

    /// Describe this rule in human-readable form
    pub fn describe(&self) -> String {
        let source = self.source.as_deref().unwrap_or("unknown");
        let target = self.target.as_deref().unwrap_or("unknown");

        match self.rule_type {
            RuleType::RootRequire if self.missing => {
                format!("Missing requirement: the resolution requires '{}' but it could not be found", target)
            }
            RuleType::RootRequire => format!("The resolution requires '{}'", target),
            RuleType::Fixed if self.missing => {
                format!("Root unit {} is not available in the target platform", target)
            }
            RuleType::Fixed => format!("{} is a root of the resolution", source),
            RuleType::Requires if self.missing => format!(
                "Missing requirement: {} requires '{}' but it could not be found",
                source, target
            ),
            RuleType::Requires => format!("{} requires '{}'", source, target),
            RuleType::Conflict => match self.source.as_deref() {
                Some(source) => format!("{} conflicts with '{}'", source, target),
                None => format!("The resolution excludes '{}'", target),
            },
            RuleType::Singleton => format!(
                "Only one of the following can be installed at once: {}",
                self.units.join(", ")
            ),
        }
    }
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to this problem, resolving unit names from the pool
    pub fn add_rule(&mut self, rule: &Rule, pool: &Pool) {
        if self.rules.iter().any(|r| r.rule_id == rule.id()) {
            return;
        }
        self.rules.push(ProblemRule::from_rule(rule, pool));
    }

    /// Set a custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Generate a human-readable description of this problem
    pub fn describe(&self) -> String {
        let lines: Vec<String> = self
            .rules
            .iter()
            .map(|rule| format!("  - {}", rule.describe()))
            .collect();

        match &self.message {
            Some(msg) if lines.is_empty() => msg.clone(),
            Some(msg) => format!("{}\n{}", msg, lines.join("\n")),
            None => lines.join("\n"),
        }
    }

    /// Check if any rule of this problem is a missing requirement
    pub fn has_missing(&self) -> bool {
        self.rules.iter().any(|r| r.missing)
    }
}

/// A collection of problems
#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    pub problems: Vec<Problem>,
}

impl ProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// All distinct rule descriptions, missing requirements first
    pub fn explanations(&self) -> Vec<String> {
        let mut missing = Vec::new();
        let mut others = Vec::new();
        for problem in &self.problems {
            if let Some(message) = &problem.message {
                if problem.rules.is_empty() && !others.contains(message) {
                    others.push(message.clone());
                }
            }
            for rule in &problem.rules {
                let line = rule.describe();
                let bucket = if rule.missing { &mut missing } else { &mut others };
                if !bucket.contains(&line) {
                    bucket.push(line);
                }
            }
        }
        missing.extend(others);
        missing
    }

    /// Convert into a multi-status with one error child per explanation
    pub fn to_status(&self) -> Status {
        let children = self
            .explanations()
            .into_iter()
            .map(Status::error)
            .collect();
        Status::multi("Cannot complete the resolution", children)
    }
}

impl fmt::Display for ProblemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Problem {}", i + 1)?;
            write!(f, "{}", problem.describe())?;
        }
        Ok(())
    }
}
