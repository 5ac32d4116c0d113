use std::collections::HashMap;

use super::rule::{Rule, RuleType};

/// Collection of SAT rules.
///
/// The RuleSet manages rules with:
/// - Deduplication based on literal content and requirement text
/// - Sequential ID assignment in generation order
#[derive(Debug, Default)]
pub struct RuleSet {
    /// All rules indexed by ID
    rules: Vec<Rule>,

    /// Rules by type for iteration
    rules_by_type: HashMap<RuleType, Vec<u32>>,

    /// Hash map for deduplication
    rule_hashes: HashMap<u64, Vec<u32>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to the set, returning its ID.
    /// Returns existing rule's ID if a duplicate exists.
    pub fn add(&mut self, mut rule: Rule) -> u32 {
        let hash = rule.literal_hash();
        if let Some(ids) = self.rule_hashes.get(&hash) {
            for &existing_id in ids {
                if let Some(existing) = self.get(existing_id) {
                    if existing.equals_literals(&rule) && existing.target() == rule.target() {
                        return existing_id;
                    }
                }
            }
        }

        let id = self.rules.len() as u32;
        rule.set_id(id);

        self.rules_by_type
            .entry(rule.rule_type())
            .or_default()
            .push(id);
        self.rule_hashes.entry(hash).or_default().push(id);
        self.rules.push(rule);

        id
    }

    pub fn get(&self, id: u32) -> Option<&Rule> {
        self.rules.get(id as usize)
    }

    /// Get all rules of a specific type
    pub fn rules_of_type(&self, rule_type: RuleType) -> impl Iterator<Item = &Rule> {
        self.rules_by_type
            .get(&rule_type)
            .into_iter()
            .flatten()
            .filter_map(move |&id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Get assertion rules (single literal rules)
    pub fn assertions(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .filter(|r| r.is_assertion() && !r.is_multi_conflict())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Count rules by type
    pub fn count_by_type(&self, rule_type: RuleType) -> usize {
        self.rules_by_type
            .get(&rule_type)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// Get statistics about the rule set
    pub fn stats(&self) -> RuleSetStats {
        RuleSetStats {
            total: self.len(),
            root_require: self.count_by_type(RuleType::RootRequire),
            fixed: self.count_by_type(RuleType::Fixed),
            requires: self.count_by_type(RuleType::Requires),
            conflict: self.count_by_type(RuleType::Conflict),
            singleton: self.count_by_type(RuleType::Singleton),
        }
    }
}

/// Statistics about a rule set
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleSetStats {
    pub total: usize,
    pub root_require: usize,
    pub fixed: usize,
    pub requires: usize,
    pub conflict: usize,
    pub singleton: usize,
}
