use super::pool::UnitId;
use super::rule::Literal;

/// Tracks decisions made during SAT solving.
///
/// Each decision records:
/// - Whether a unit is selected (+) or excluded (-)
/// - At what decision level it was decided
/// - Which rule forced it (none for branch decisions)
///
/// The decision map is a flat Vec indexed by UnitId:
/// 0 = undecided, >0 = selected at level N-1, <0 = excluded at level N-1.
#[derive(Debug, Default)]
pub struct Decisions {
    decision_map: Vec<i32>,

    /// Rule that forced each decision, indexed by UnitId
    reasons: Vec<Option<u32>>,

    /// Decisions in the order they were made
    trail: Vec<Literal>,

    level: u32,
}

impl Decisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decisions tracker for units `1..=max_unit_id`
    pub fn with_capacity(max_unit_id: usize) -> Self {
        Self {
            decision_map: vec![0; max_unit_id + 1],
            reasons: vec![None; max_unit_id + 1],
            trail: Vec::with_capacity(max_unit_id),
            level: 0,
        }
    }

    #[inline]
    fn ensure_capacity(&mut self, unit: UnitId) {
        let id = unit as usize;
        if id >= self.decision_map.len() {
            self.decision_map.resize(id + 1, 0);
            self.reasons.resize(id + 1, None);
        }
    }

    #[inline]
    fn value(&self, literal: Literal) -> i32 {
        self.decision_map
            .get(literal.unsigned_abs() as usize)
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn increment_level(&mut self) {
        self.level += 1;
    }

    /// Make a decision at the current level
    ///
    /// Returns false if this conflicts with an existing decision
    pub fn decide(&mut self, literal: Literal, rule_id: Option<u32>) -> bool {
        let unit = literal.abs();
        self.ensure_capacity(unit);

        let existing = self.decision_map[unit as usize];
        if existing != 0 {
            return (existing > 0) == (literal > 0);
        }

        // level+1 so that level 0 is distinguishable from undecided
        let level_value = (self.level + 1) as i32;
        self.decision_map[unit as usize] = if literal > 0 { level_value } else { -level_value };
        self.reasons[unit as usize] = rule_id;
        self.trail.push(literal);

        true
    }

    /// Check if a literal is satisfied by current decisions
    #[inline]
    pub fn satisfied(&self, literal: Literal) -> bool {
        let value = self.value(literal);
        value != 0 && (value > 0) == (literal > 0)
    }

    /// Check if a literal conflicts with current decisions
    #[inline]
    pub fn conflict(&self, literal: Literal) -> bool {
        let value = self.value(literal);
        value != 0 && (value > 0) != (literal > 0)
    }

    #[inline]
    pub fn decided(&self, unit: UnitId) -> bool {
        self.value(unit) != 0
    }

    #[inline]
    pub fn undecided(&self, unit: UnitId) -> bool {
        !self.decided(unit)
    }

    #[inline]
    pub fn decided_install(&self, unit: UnitId) -> bool {
        self.value(unit) > 0
    }

    /// Get the decision level of a literal's unit
    pub fn decision_level(&self, literal: Literal) -> Option<u32> {
        match self.value(literal) {
            0 => None,
            value => Some(value.unsigned_abs() - 1),
        }
    }

    /// Get the rule that forced a decision
    pub fn decision_rule(&self, literal: Literal) -> Option<u32> {
        self.reasons
            .get(literal.unsigned_abs() as usize)
            .copied()
            .flatten()
    }

    /// Revert all decisions at levels > target_level
    pub fn revert_to_level(&mut self, target_level: u32) {
        let target = (target_level + 1) as i32;

        while let Some(&literal) = self.trail.last() {
            let id = literal.unsigned_abs() as usize;
            if self.decision_map[id].abs() <= target {
                break;
            }
            self.decision_map[id] = 0;
            self.reasons[id] = None;
            self.trail.pop();
        }

        self.level = target_level;
    }

    /// Units decided to be selected, ascending id
    pub fn installed_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.decision_map
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .map(|(id, _)| id as UnitId)
    }

    /// Decisions in the order they were made
    pub fn trail(&self) -> &[Literal] {
        &self.trail
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decisions_decide() {
        let mut decisions = Decisions::new();

        assert!(decisions.decide(1, Some(0)));
        assert!(decisions.satisfied(1));
        assert!(!decisions.satisfied(-1));
        assert!(decisions.decided_install(1));

        assert!(decisions.decide(-2, Some(1)));
        assert!(decisions.satisfied(-2));
        assert!(!decisions.decided_install(2));
        assert_eq!(decisions.decision_rule(-2), Some(1));
    }

    #[test]
    fn test_decisions_conflict() {
        let mut decisions = Decisions::new();
        decisions.decide(1, None);

        assert!(!decisions.decide(-1, None));
        assert!(decisions.conflict(-1));
        assert!(!decisions.conflict(1));
        assert!(!decisions.conflict(5));
    }

    #[test]
    fn test_decisions_revert() {
        let mut decisions = Decisions::with_capacity(3);

        decisions.increment_level();
        decisions.decide(1, None);
        decisions.increment_level();
        decisions.decide(2, None);
        decisions.increment_level();
        decisions.decide(-3, Some(4));

        decisions.revert_to_level(1);

        assert!(decisions.decided(1));
        assert!(decisions.undecided(2));
        assert!(decisions.undecided(3));
        assert_eq!(decisions.decision_rule(3), None);
        assert_eq!(decisions.level(), 1);
        assert_eq!(decisions.trail(), &[1]);
    }

    #[test]
    fn test_installed_units() {
        let mut decisions = Decisions::new();
        decisions.decide(3, None);
        decisions.decide(-2, None);
        decisions.decide(1, None);

        let installed: Vec<_> = decisions.installed_units().collect();
        assert_eq!(installed, vec![1, 3]);
    }
}
