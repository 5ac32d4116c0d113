use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::metadata::InstallableUnit;

use super::decisions::Decisions;
use super::policy::Policy;
use super::pool::{Pool, UnitId};
use super::problem::{Problem, ProblemSet};
use super::request::Request;
use super::rule::{Literal, RuleType};
use super::rule_generator::RuleGenerator;
use super::rule_set::RuleSet;
use super::watch_graph::WatchGraph;

/// Upper bound on branch attempts before the solver gives up
const MAX_ATTEMPTS: u32 = 100_000;

/// The SAT solver for unit resolution.
///
/// Unit propagation runs over a two-watched-literal graph. When propagation
/// reaches a fixed point, the first unsatisfied requirement whose source is
/// selected opens a branch point over its undecided providers in policy
/// order. A conflict reverts to the most recent branch point and tries its
/// next provider.
pub struct Solver<'a> {
    pool: &'a Pool,
    policy: &'a Policy,
}

/// State of a single solve
struct SolverState {
    rules: RuleSet,
    watches: WatchGraph,
    decisions: Decisions,
    /// Trail position up to which literals have been propagated
    propagated: usize,
    branches: Vec<Branch>,
    /// Rules that took part in conflicts, generation order
    conflict_rules: BTreeSet<u32>,
}

/// A branch point: the level it was opened at and the untried providers
struct Branch {
    level: u32,
    alternatives: Vec<Literal>,
}

impl SolverState {
    fn new(rules: RuleSet, unit_count: usize) -> Self {
        let watches = WatchGraph::from_rules(&rules);
        Self {
            rules,
            watches,
            decisions: Decisions::with_capacity(unit_count),
            propagated: 0,
            branches: Vec::new(),
            conflict_rules: BTreeSet::new(),
        }
    }
}

impl<'a> Solver<'a> {
    pub fn new(pool: &'a Pool, policy: &'a Policy) -> Self {
        Self { pool, policy }
    }

    /// Solve the resolution problem.
    ///
    /// Returns the selected units in pool order, or a ProblemSet explaining
    /// the failure.
    pub fn solve(&self, request: &Request) -> Result<Vec<Arc<InstallableUnit>>, ProblemSet> {
        let start = Instant::now();

        let rules = RuleGenerator::new(self.pool).generate(request);
        log::debug!("Rule generation: {:?}, {:?}", start.elapsed(), rules.stats());

        let mut state = SolverState::new(rules, self.pool.len());
        let sat_start = Instant::now();

        match self.run_sat(&mut state) {
            Ok(()) => {
                log::debug!("SAT solving: {:?}", sat_start.elapsed());
                let units: Vec<_> = state
                    .decisions
                    .installed_units()
                    .filter_map(|id| self.pool.unit(id).cloned())
                    .collect();
                log::info!(
                    "Resolved {} of {} units in {:?}",
                    units.len(),
                    self.pool.len(),
                    start.elapsed()
                );
                Ok(units)
            }
            Err(problems) => {
                log::debug!("SAT solving (failed): {:?}", sat_start.elapsed());
                Err(problems)
            }
        }
    }

    /// Main SAT solving loop
    fn run_sat(&self, state: &mut SolverState) -> Result<(), ProblemSet> {
        let empty: Vec<u32> = state
            .rules
            .iter()
            .filter(|r| r.is_empty())
            .map(|r| r.id())
            .collect();
        if !empty.is_empty() {
            state.conflict_rules.extend(empty);
            return Err(self.unsolvable(state));
        }

        self.process_assertions(state)?;

        if let Err(conflict) = self.propagate(state) {
            self.record_conflict(state, conflict);
            return Err(self.unsolvable(state));
        }

        let mut attempts = 0u32;
        loop {
            let Some(candidates) = self.select_branch(state) else {
                return Ok(());
            };

            let mut alternatives = self.policy.select_preferred(self.pool, &candidates);
            alternatives.reverse();
            let Some(first) = alternatives.pop() else {
                return Ok(());
            };

            state.decisions.increment_level();
            let level = state.decisions.level();
            state.branches.push(Branch {
                level,
                alternatives,
            });
            state.decisions.decide(first, None);

            while let Err(conflict) = self.propagate(state) {
                attempts += 1;
                if attempts > MAX_ATTEMPTS {
                    let mut problems = self.unsolvable(state);
                    problems.add(
                        Problem::new().with_message("Resolution exceeded the maximum number of attempts"),
                    );
                    return Err(problems);
                }

                self.record_conflict(state, conflict);
                if !self.backtrack(state) {
                    return Err(self.unsolvable(state));
                }
            }
        }
    }

    /// Decide all single-literal rules at level 0.
    ///
    /// Every conflicting assertion is recorded before failing, so that each
    /// missing requirement of a root shows up in the report.
    fn process_assertions(&self, state: &mut SolverState) -> Result<(), ProblemSet> {
        let assertions: Vec<(Literal, u32)> = state
            .rules
            .assertions()
            .map(|r| (r.literals()[0], r.id()))
            .collect();

        let mut failed = false;
        for (literal, rule_id) in assertions {
            if !state.decisions.decide(literal, Some(rule_id)) {
                self.record_conflict(state, rule_id);
                failed = true;
            }
        }

        if failed {
            Err(self.unsolvable(state))
        } else {
            Ok(())
        }
    }

    /// Propagate all pending decisions
    fn propagate(&self, state: &mut SolverState) -> Result<(), u32> {
        while state.propagated < state.decisions.len() {
            let literal = state.decisions.trail()[state.propagated];
            state.propagated += 1;
            state
                .watches
                .propagate(literal, &state.rules, &mut state.decisions)?;
        }
        Ok(())
    }

    /// Revert to the most recent branch point with an untried alternative
    /// and decide that alternative. Returns false when none is left.
    fn backtrack(&self, state: &mut SolverState) -> bool {
        while let Some(branch) = state.branches.last_mut() {
            let level = branch.level;
            let next = branch.alternatives.pop();

            state.decisions.revert_to_level(level - 1);
            state.propagated = state.propagated.min(state.decisions.len());

            match next {
                Some(literal) => {
                    state.decisions.increment_level();
                    state.decisions.decide(literal, None);
                    return true;
                }
                None => {
                    state.branches.pop();
                }
            }
        }
        false
    }

    /// First requirement that is not yet satisfied although its source is
    /// selected; returns its undecided providers
    fn select_branch(&self, state: &SolverState) -> Option<Vec<UnitId>> {
        for rule in state.rules.iter() {
            if !matches!(rule.rule_type(), RuleType::Requires | RuleType::RootRequire) {
                continue;
            }

            let literals = rule.literals();
            if literals.iter().any(|&l| state.decisions.satisfied(l)) {
                continue;
            }
            if literals
                .iter()
                .any(|&l| l < 0 && !state.decisions.conflict(l))
            {
                continue;
            }

            let candidates: Vec<UnitId> = literals
                .iter()
                .copied()
                .filter(|&l| l > 0 && state.decisions.undecided(l))
                .collect();
            if !candidates.is_empty() {
                return Some(candidates);
            }
        }
        None
    }

    /// Remember the conflicting rule and every rule that forced one of its
    /// literals, transitively
    fn record_conflict(&self, state: &mut SolverState, conflict: u32) {
        let mut pending = vec![conflict];
        let mut seen = HashSet::new();

        while let Some(rule_id) = pending.pop() {
            if !seen.insert(rule_id) {
                continue;
            }
            state.conflict_rules.insert(rule_id);

            let Some(rule) = state.rules.get(rule_id) else {
                continue;
            };
            for &literal in rule.literals() {
                if let Some(reason) = state.decisions.decision_rule(literal) {
                    pending.push(reason);
                }
            }
        }
    }

    /// Build the failure report.
    ///
    /// Besides the rules involved in conflicts, every requirement without
    /// provider of a unit that cannot be avoided (roots and their single
    /// provider requirements, transitively) is reported.
    fn unsolvable(&self, state: &SolverState) -> ProblemSet {
        let mut rule_ids = state.conflict_rules.clone();
        rule_ids.extend(self.unavoidable_missing(state));

        let mut problem = Problem::new();
        for id in rule_ids {
            if let Some(rule) = state.rules.get(id) {
                problem.add_rule(rule, self.pool);
            }
        }

        let mut problems = ProblemSet::new();
        problems.add(problem);
        problems
    }

    fn unavoidable_missing(&self, state: &SolverState) -> Vec<u32> {
        let mut forced: HashSet<UnitId> = state
            .rules
            .rules_of_type(RuleType::Fixed)
            .filter(|r| r.is_assertion())
            .map(|r| r.literals()[0])
            .collect();
        forced.extend(
            state
                .rules
                .rules_of_type(RuleType::RootRequire)
                .filter(|r| r.is_assertion())
                .map(|r| r.literals()[0]),
        );

        let mut changed = true;
        while changed {
            changed = false;
            for rule in state.rules.rules_of_type(RuleType::Requires) {
                let literals = rule.literals();
                if literals.len() == 2 && forced.contains(&-literals[0]) && forced.insert(literals[1]) {
                    changed = true;
                }
            }
        }

        state
            .rules
            .iter()
            .filter(|r| r.is_missing_provider())
            .filter(|r| forced.contains(&-r.literals()[0]))
            .map(|r| r.id())
            .collect()
    }
}
