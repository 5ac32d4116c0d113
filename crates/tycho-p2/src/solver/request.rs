use std::collections::HashSet;

use crate::metadata::{Requirement, SelectionContext, UnitKey};

/// A request specifies what needs to be resolved.
///
/// Root units are fixed: they must be part of the solution. Additional
/// requirements behave like requirements of an invisible root. Promoted
/// requirements are optional requirements of a unit that are to be
/// treated as required for this solve.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Units that must be selected, in request order
    pub fixed: Vec<UnitKey>,

    /// Requirements of the resolution itself
    pub requirements: Vec<Requirement>,

    /// (unit, index into its requirements) of promoted optional requirements
    pub promoted: HashSet<(UnitKey, usize)>,

    /// Properties requirement filters are evaluated against
    pub context: SelectionContext,
}

impl Request {
    pub fn new(context: SelectionContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Add a unit that must be selected
    pub fn fix(&mut self, key: UnitKey) -> &mut Self {
        if !self.fixed.contains(&key) {
            self.fixed.push(key);
        }
        self
    }

    /// Add a requirement of the resolution itself
    pub fn require(&mut self, requirement: Requirement) -> &mut Self {
        self.requirements.push(requirement);
        self
    }

    /// Treat an optional requirement of a unit as required
    pub fn promote(&mut self, unit: UnitKey, index: usize) -> &mut Self {
        self.promoted.insert((unit, index));
        self
    }

    pub fn is_promoted(&self, unit: &UnitKey, index: usize) -> bool {
        self.promoted.contains(&(unit.clone(), index))
    }
}
