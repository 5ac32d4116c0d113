use std::mem;

use super::decisions::Decisions;
use super::rule::{Literal, Rule};
use super::rule_set::RuleSet;

/// Two-watched literals graph for unit propagation.
///
/// Each clause with two or more literals watches two of them. A clause can
/// only become unit or conflicting once a watched literal turns false, so
/// only the clauses watching that literal are visited. Watches never need
/// to be restored on backtracking.
///
/// Singleton rules watch every literal: selecting any of their units
/// excludes all the others.
#[derive(Debug, Default)]
pub struct WatchGraph {
    /// literal index -> ids of rules watching that literal
    watches: Vec<Vec<u32>>,

    /// rule id -> currently watched pair
    watched: Vec<[Literal; 2]>,
}

impl WatchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert literal to index (handles positive and negative literals)
    fn literal_to_index(literal: Literal) -> usize {
        let abs = literal.unsigned_abs() as usize;
        if literal > 0 {
            abs * 2
        } else {
            abs * 2 + 1
        }
    }

    fn watches_mut(&mut self, literal: Literal) -> &mut Vec<u32> {
        let idx = Self::literal_to_index(literal);
        if idx >= self.watches.len() {
            self.watches.resize(idx + 1, Vec::new());
        }
        &mut self.watches[idx]
    }

    /// Build the watch graph from a rule set
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut graph = Self::new();
        graph.watched = vec![[0, 0]; rules.len()];
        for rule in rules.iter() {
            graph.add_rule(rule);
        }
        graph
    }

    /// Add a rule to the watch graph
    pub fn add_rule(&mut self, rule: &Rule) {
        let literals = rule.literals();
        if literals.len() < 2 {
            return;
        }

        let rule_id = rule.id();
        if rule_id as usize >= self.watched.len() {
            self.watched.resize(rule_id as usize + 1, [0, 0]);
        }

        if rule.is_multi_conflict() {
            for &literal in literals {
                self.watches_mut(literal).push(rule_id);
            }
            return;
        }

        let pair = [literals[0], literals[1]];
        self.watched[rule_id as usize] = pair;
        self.watches_mut(pair[0]).push(rule_id);
        self.watches_mut(pair[1]).push(rule_id);
    }

    /// Get rules watching a specific literal
    pub fn watching(&self, literal: Literal) -> &[u32] {
        self.watches
            .get(Self::literal_to_index(literal))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Propagate a literal that just became true.
    ///
    /// Forced literals are decided at the current level with the forcing
    /// rule as reason; the caller is responsible for propagating them in
    /// turn. Returns the id of a conflicting rule, if any.
    pub fn propagate(
        &mut self,
        literal: Literal,
        rules: &RuleSet,
        decisions: &mut Decisions,
    ) -> Result<(), u32> {
        let false_literal = -literal;
        let idx = Self::literal_to_index(false_literal);
        if idx >= self.watches.len() {
            return Ok(());
        }

        let watching = mem::take(&mut self.watches[idx]);
        let mut kept = Vec::with_capacity(watching.len());
        let mut result = Ok(());

        let mut iter = watching.into_iter();
        for rule_id in iter.by_ref() {
            let Some(rule) = rules.get(rule_id) else {
                continue;
            };

            if rule.is_multi_conflict() {
                kept.push(rule_id);
                if let Err(conflict) = Self::propagate_multi(rule, false_literal, decisions) {
                    result = Err(conflict);
                    break;
                }
                continue;
            }

            let pair = self.watched[rule_id as usize];
            let other = if pair[0] == false_literal { pair[1] } else { pair[0] };

            if decisions.satisfied(other) {
                kept.push(rule_id);
                continue;
            }

            let replacement = rule
                .literals()
                .iter()
                .copied()
                .find(|&l| l != false_literal && l != other && !decisions.conflict(l));

            if let Some(replacement) = replacement {
                self.watched[rule_id as usize] = [other, replacement];
                self.watches_mut(replacement).push(rule_id);
                continue;
            }

            kept.push(rule_id);
            if decisions.conflict(other) {
                result = Err(rule_id);
                break;
            }
            decisions.decide(other, Some(rule_id));
        }

        kept.extend(iter);
        let slot = &mut self.watches[idx];
        kept.append(slot);
        *slot = kept;

        result
    }

    /// At most one unit of a singleton rule may be selected
    fn propagate_multi(
        rule: &Rule,
        false_literal: Literal,
        decisions: &mut Decisions,
    ) -> Result<(), u32> {
        for &other in rule.literals() {
            if other == false_literal {
                continue;
            }
            if decisions.conflict(other) {
                return Err(rule.id());
            }
            if !decisions.satisfied(other) {
                decisions.decide(other, Some(rule.id()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::rule::Rule;

    #[test]
    fn test_unit_propagation() {
        let mut rules = RuleSet::new();
        rules.add(Rule::requires(1, vec![2, 3]));
        let mut graph = WatchGraph::from_rules(&rules);
        let mut decisions = Decisions::new();

        decisions.decide(1, None);
        assert!(graph.propagate(1, &rules, &mut decisions).is_ok());
        assert!(decisions.undecided(2));

        decisions.decide(-2, None);
        assert!(graph.propagate(-2, &rules, &mut decisions).is_ok());
        assert!(decisions.decided_install(3));
        assert_eq!(decisions.decision_rule(3), Some(0));
    }

    #[test]
    fn test_conflict_detected() {
        let mut rules = RuleSet::new();
        let id = rules.add(Rule::conflict(vec![1, 2]));
        let mut graph = WatchGraph::from_rules(&rules);
        let mut decisions = Decisions::new();

        decisions.decide(2, None);
        decisions.decide(1, None);
        assert_eq!(graph.propagate(1, &rules, &mut decisions), Err(id));
    }

    #[test]
    fn test_singleton_excludes_others() {
        let mut rules = RuleSet::new();
        rules.add(Rule::singleton(vec![1, 2, 3]));
        let mut graph = WatchGraph::from_rules(&rules);
        let mut decisions = Decisions::new();

        decisions.decide(2, None);
        assert!(graph.propagate(2, &rules, &mut decisions).is_ok());
        assert!(decisions.satisfied(-1));
        assert!(decisions.satisfied(-3));
        assert_eq!(graph.watching(-1).len(), 1);
    }
}
