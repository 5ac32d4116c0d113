use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use tycho_version::{Version, VersionRange};

use crate::error::{P2Error, Result};
use crate::metadata::{namespace, InstallableUnit, Requirement, SelectionContext, UnitKey};
use crate::solver::Pool;
use crate::status::Status;

/// Id of the synthetic unit standing for the whole request
const ROOT_ID: &str = "tycho.dependency.collector.root";

/// Collects every unit reachable from the roots without choosing between
/// alternatives.
///
/// All providers of a followed requirement are collected. Failures name
/// each unsatisfied requirement together with the unit requiring it.
#[derive(Debug, Clone, Default)]
pub struct DependencyCollector {
    context: Option<SelectionContext>,
}

impl DependencyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate filters against a context; without one every filter passes
    pub fn with_context(mut self, context: Option<SelectionContext>) -> Self {
        self.context = context;
        self
    }

    pub fn resolve(
        &self,
        roots: &[Arc<InstallableUnit>],
        additional: &[Requirement],
        available: &[Arc<InstallableUnit>],
    ) -> Result<Vec<Arc<InstallableUnit>>> {
        let root = Self::synthetic_root(roots, additional);

        let mut pool = Pool::new();
        for unit in roots.iter().chain(available.iter()) {
            if self.applicable_unit(unit) {
                pool.add_unit(Arc::clone(unit));
            }
        }

        let mut collected: IndexMap<UnitKey, Arc<InstallableUnit>> = IndexMap::new();
        let mut visited: HashSet<UnitKey> = HashSet::new();
        let mut queue = VecDeque::from([Arc::clone(&root)]);
        let mut problems = Vec::new();

        while let Some(unit) = queue.pop_front() {
            if !visited.insert(unit.key()) {
                continue;
            }
            if unit.id() != ROOT_ID {
                collected.insert(unit.key(), Arc::clone(&unit));
            }

            for requirement in unit.all_requirements() {
                if requirement.is_negative() || !self.applicable_requirement(requirement) {
                    continue;
                }
                if requirement.is_optional() && !requirement.is_greedy() {
                    continue;
                }
                if unit.satisfies(requirement) {
                    continue;
                }

                let providers = pool.what_provides(requirement);
                if providers.is_empty() {
                    if requirement.is_required() {
                        problems.push(Self::describe_missing(&unit, requirement));
                    }
                    continue;
                }

                for id in providers {
                    if let Some(provider) = pool.unit(id) {
                        if !visited.contains(&provider.key()) {
                            queue.push_back(Arc::clone(provider));
                        }
                    }
                }
            }
        }

        if !problems.is_empty() {
            let status = Status::multi("Missing requirements", problems);
            log::debug!("Dependency collection failed:\n{}", status);
            return Err(P2Error::Unsatisfiable(status));
        }

        log::debug!("Collected {} units", collected.len());
        Ok(collected.into_values().collect())
    }

    /// A unit requiring every root exactly plus the additional requirements
    fn synthetic_root(roots: &[Arc<InstallableUnit>], additional: &[Requirement]) -> Arc<InstallableUnit> {
        let mut builder = InstallableUnit::builder(ROOT_ID, Version::ZERO);
        for root in roots {
            builder.add_requirement(Requirement::new(
                namespace::IU,
                root.id(),
                VersionRange::exact(root.version().clone()),
            ));
        }
        builder.add_requirements(additional.iter().cloned());
        builder.build()
    }

    fn describe_missing(unit: &InstallableUnit, requirement: &Requirement) -> Status {
        if unit.id() == ROOT_ID {
            Status::error(format!("Missing requirement: '{}' could not be found", requirement))
        } else {
            Status::error(format!(
                "Missing requirement: {} requires '{}' but it could not be found",
                unit, requirement
            ))
        }
    }

    fn applicable_unit(&self, unit: &InstallableUnit) -> bool {
        self.context
            .as_ref()
            .map(|c| unit.is_applicable(c))
            .unwrap_or(true)
    }

    fn applicable_requirement(&self, requirement: &Requirement) -> bool {
        self.context
            .as_ref()
            .map(|c| requirement.is_applicable(c))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Capability;

    fn bundle(id: &str, requirements: Vec<Requirement>) -> Arc<InstallableUnit> {
        let mut builder = InstallableUnit::builder(id, Version::new(1, 0, 0));
        builder.add_capability(Capability::new(namespace::OSGI_BUNDLE, id, Version::new(1, 0, 0)));
        builder.add_requirements(requirements);
        builder.build()
    }

    fn req(name: &str) -> Requirement {
        Requirement::new(namespace::OSGI_BUNDLE, name, VersionRange::any())
    }

    #[test]
    fn test_collects_transitive_closure() {
        let root = bundle("root", vec![req("a")]);
        let available = vec![bundle("a", vec![req("b")]), bundle("b", vec![]), bundle("c", vec![])];

        let collected = DependencyCollector::new()
            .resolve(&[root], &[], &available)
            .unwrap();
        let ids: Vec<_> = collected.iter().map(|u| u.id()).collect();
        assert_eq!(ids, vec!["root", "a", "b"]);
    }

    #[test]
    fn test_every_missing_requirement_reported() {
        let root = bundle("root", vec![req("a"), req("gone.one")]);
        let available = vec![bundle("a", vec![req("gone.two")])];

        let err = DependencyCollector::new()
            .resolve(&[root], &[], &available)
            .unwrap_err();
        let status = err.status().unwrap();

        assert_eq!(status.children().len(), 2);
        assert!(status.mentions("root 1.0.0 requires 'osgi.bundle; gone.one 0.0.0'"));
        assert!(status.mentions("a 1.0.0 requires 'osgi.bundle; gone.two 0.0.0'"));
    }

    #[test]
    fn test_optional_edges() {
        let root = bundle(
            "root",
            vec![
                req("greedy").optional(),
                req("lazy").optional().with_greedy(false),
                req("absent").optional(),
            ],
        );
        let available = vec![bundle("greedy", vec![]), bundle("lazy", vec![])];

        let collected = DependencyCollector::new()
            .resolve(&[root], &[], &available)
            .unwrap();
        let ids: Vec<_> = collected.iter().map(|u| u.id()).collect();
        assert_eq!(ids, vec!["root", "greedy"]);
    }

    #[test]
    fn test_additional_requirement_missing() {
        let err = DependencyCollector::new()
            .resolve(&[], &[req("nowhere")], &[])
            .unwrap_err();
        assert!(err.status().unwrap().mentions("nowhere"));
    }
}
