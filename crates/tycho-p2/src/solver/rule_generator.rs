use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::metadata::Requirement;

use super::pool::{Pool, UnitId};
use super::request::Request;
use super::rule::{Rule, RuleType};
use super::rule_set::RuleSet;

/// Generates SAT rules from the unit graph.
///
/// Only units reachable from the request get rules; every other unit in the
/// pool stays unselected. The clauses are:
/// - Fixed roots: `[root]`, or an empty rule when the root is not in the pool
/// - Root requirements: at least one provider (empty when there is none)
/// - Unit requirements: `[-unit, p1, p2, ...]`, or `[-unit]` without providers
/// - Negative requirements: `[-unit, -p]` for every matching provider
/// - Singletons: at most one version of a singleton unit id
pub struct RuleGenerator<'a> {
    pool: &'a Pool,
    rules: RuleSet,
    /// Units whose rules have been generated
    added: HashSet<UnitId>,
    queue: VecDeque<UnitId>,
}

impl<'a> RuleGenerator<'a> {
    pub fn new(pool: &'a Pool) -> Self {
        Self {
            pool,
            rules: RuleSet::new(),
            added: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    /// Generate all rules for a request
    pub fn generate(mut self, request: &Request) -> RuleSet {
        for key in &request.fixed {
            match self.pool.find(key) {
                Some(id) => {
                    self.rules.add(Rule::fixed(id));
                    self.enqueue(id);
                }
                None => {
                    log::warn!("Root unit {} is not part of the resolution pool", key);
                    self.rules.add(
                        Rule::new(Vec::new(), RuleType::Fixed).with_target(key.to_string()),
                    );
                }
            }
        }

        for requirement in &request.requirements {
            self.add_root_requirement(requirement, request);
        }

        while let Some(id) = self.queue.pop_front() {
            self.add_unit_rules(id, request);
        }

        self.add_singleton_rules();

        log::debug!(
            "Generated {} rules for {} reachable units",
            self.rules.len(),
            self.added.len()
        );

        self.rules
    }

    fn enqueue(&mut self, id: UnitId) {
        if self.added.insert(id) {
            self.queue.push_back(id);
        }
    }

    fn add_root_requirement(&mut self, requirement: &Requirement, request: &Request) {
        if !requirement.is_applicable(&request.context) {
            return;
        }

        let providers = self.pool.what_provides(requirement);

        if requirement.is_negative() {
            for provider in providers {
                self.rules.add(
                    Rule::assertion(-provider, RuleType::Conflict)
                        .with_target(requirement.to_string()),
                );
            }
            return;
        }

        if !requirement.is_required() {
            return;
        }

        if providers.is_empty() {
            log::warn!("Nothing provides root requirement {}", requirement);
        }

        self.rules.add(
            Rule::root_require(providers.clone())
                .with_target(requirement.to_string())
                .with_constraint(describe_constraint(requirement)),
        );
        for provider in providers {
            self.enqueue(provider);
        }
    }

    fn add_unit_rules(&mut self, id: UnitId, request: &Request) {
        let Some(unit) = self.pool.unit(id).cloned() else {
            return;
        };
        let key = unit.key();

        let own = unit
            .requirements()
            .iter()
            .enumerate()
            .map(|(index, requirement)| (requirement, request.is_promoted(&key, index)));
        let host = unit
            .host_requirements()
            .iter()
            .filter(|h| !unit.requirements().contains(h))
            .map(|requirement| (requirement, true));

        for (requirement, promoted) in own.chain(host) {
            if !requirement.is_applicable(&request.context) {
                continue;
            }

            let providers: Vec<UnitId> = self
                .pool
                .what_provides(requirement)
                .into_iter()
                .filter(|&p| p != id)
                .collect();

            if requirement.is_negative() {
                for provider in providers {
                    self.rules.add(
                        Rule::conflict(vec![id, provider])
                            .with_source(id)
                            .with_target(requirement.to_string()),
                    );
                }
                continue;
            }

            // requirements the unit satisfies itself never constrain anything
            if unit.satisfies(requirement) {
                continue;
            }

            if !requirement.is_required() && !promoted {
                continue;
            }

            self.rules.add(
                Rule::requires(id, providers.clone())
                    .with_target(requirement.to_string())
                    .with_constraint(describe_constraint(requirement)),
            );
            for provider in providers {
                self.enqueue(provider);
            }
        }
    }

    fn add_singleton_rules(&mut self) {
        let mut by_id: BTreeMap<&str, Vec<UnitId>> = BTreeMap::new();
        let mut added: Vec<UnitId> = self.added.iter().copied().collect();
        added.sort_unstable();

        for id in added {
            let Some(unit) = self.pool.unit(id) else {
                continue;
            };
            if unit.is_singleton() {
                by_id.entry(unit.id()).or_default().push(id);
            }
        }

        for (unit_id, ids) in by_id {
            if ids.len() > 1 {
                self.rules
                    .add(Rule::singleton(ids).with_target(unit_id.to_string()));
            }
        }
    }
}

fn describe_constraint(requirement: &Requirement) -> String {
    match requirement.range() {
        Some(range) => range.to_string(),
        None => requirement
            .filter()
            .map(|f| f.to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{namespace, InstallableUnit, SelectionContext};
    use tycho_version::{Version, VersionRange};

    fn requires(id: &str) -> Requirement {
        Requirement::new(namespace::IU, id, VersionRange::any())
    }

    #[test]
    fn test_unreachable_units_get_no_rules() {
        let mut pool = Pool::new();
        let mut root = InstallableUnit::builder("root", Version::new(1, 0, 0));
        root.add_requirement(requires("a"));
        pool.add_unit(root.build());
        pool.add_unit(InstallableUnit::builder("a", Version::new(1, 0, 0)).build());
        let mut lonely = InstallableUnit::builder("lonely", Version::new(1, 0, 0));
        lonely.add_requirement(requires("missing"));
        pool.add_unit(lonely.build());

        let mut request = Request::new(SelectionContext::new());
        request.fix(pool.unit(1).unwrap().key());
        let rules = RuleGenerator::new(&pool).generate(&request);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.count_by_type(RuleType::Requires), 1);
    }

    #[test]
    fn test_missing_provider_excludes_unit() {
        let mut pool = Pool::new();
        let mut root = InstallableUnit::builder("root", Version::new(1, 0, 0));
        root.add_requirement(requires("missing"));
        pool.add_unit(root.build());

        let mut request = Request::new(SelectionContext::new());
        request.fix(pool.unit(1).unwrap().key());
        let rules = RuleGenerator::new(&pool).generate(&request);

        let missing: Vec<_> = rules.iter().filter(|r| r.is_missing_provider()).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].literals(), &[-1]);
    }

    #[test]
    fn test_optional_skipped_unless_promoted() {
        let mut pool = Pool::new();
        let mut root = InstallableUnit::builder("root", Version::new(1, 0, 0));
        root.add_requirement(requires("a").optional());
        pool.add_unit(root.build());
        pool.add_unit(InstallableUnit::builder("a", Version::new(1, 0, 0)).build());
        let key = pool.unit(1).unwrap().key();

        let mut request = Request::new(SelectionContext::new());
        request.fix(key.clone());
        assert_eq!(RuleGenerator::new(&pool).generate(&request).len(), 1);

        request.promote(key, 0);
        assert_eq!(RuleGenerator::new(&pool).generate(&request).len(), 2);
    }
}
