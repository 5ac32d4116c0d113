use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{P2Error, Result};
use crate::metadata::{InstallableUnit, Requirement, SelectionContext, UnitKey};
use crate::solver::{Policy, Pool, Request, Solver};

use super::swt;

/// Resolution strategy selecting a consistent closure with the SAT solver.
///
/// One call resolves for one selection context. Greedy optional
/// requirements are honoured when they can be satisfied, optional
/// non-greedy ones are never followed.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    additional_requirements: Vec<Requirement>,
    policy: Policy,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requirements the resolution has to satisfy besides the roots
    pub fn with_additional_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.additional_requirements = requirements;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve the roots against the available units.
    ///
    /// Returns the selected units, roots first, then in the order of
    /// `available`.
    pub fn resolve(
        &self,
        available: &[Arc<InstallableUnit>],
        roots: &[Arc<InstallableUnit>],
        context: &SelectionContext,
    ) -> Result<Vec<Arc<InstallableUnit>>> {
        let start = Instant::now();

        let applicable: Vec<Arc<InstallableUnit>> = available
            .iter()
            .filter(|u| u.is_applicable(context))
            .cloned()
            .collect();

        let mut pool = Pool::new();
        let mut request = Request::new(context.clone());
        for root in roots {
            if !root.is_applicable(context) {
                log::debug!("Skipping root {} not applicable for {}", root, context);
                continue;
            }
            pool.add_unit(Arc::clone(root));
            request.fix(root.key());
        }
        for unit in &applicable {
            pool.add_unit(Arc::clone(unit));
        }
        for requirement in &self.additional_requirements {
            request.require(requirement.clone());
        }

        log::debug!(
            "Resolving {} roots against {} units for {}",
            request.fixed.len(),
            pool.len(),
            context
        );

        let solver = Solver::new(&pool, &self.policy);
        let mut selected = solver
            .solve(&request)
            .map_err(|problems| P2Error::Unsatisfiable(problems.to_status()))?;

        selected = self.add_greedy_optionals(&pool, &mut request, selected);

        swt::fix_swt(&mut selected, roots, &applicable, context)?;

        log::info!(
            "Selected {} units for {} in {:?}",
            selected.len(),
            context,
            start.elapsed()
        );
        Ok(selected)
    }

    /// Promote greedy optional requirements of selected units, one at a
    /// time, keeping each one the solver can still satisfy. Repeats until
    /// no requirement is left to try.
    fn add_greedy_optionals(
        &self,
        pool: &Pool,
        request: &mut Request,
        mut selected: Vec<Arc<InstallableUnit>>,
    ) -> Vec<Arc<InstallableUnit>> {
        let solver = Solver::new(pool, &self.policy);
        let mut tried: HashSet<(UnitKey, usize)> = HashSet::new();

        'scan: loop {
            for unit in selected.clone() {
                let key = unit.key();
                for (index, requirement) in unit.requirements().iter().enumerate() {
                    if !requirement.is_optional()
                        || !requirement.is_greedy()
                        || !requirement.is_applicable(&request.context)
                        || unit.satisfies(requirement)
                    {
                        continue;
                    }
                    if !tried.insert((key.clone(), index)) {
                        continue;
                    }
                    if pool.what_provides(requirement).is_empty() {
                        continue;
                    }

                    request.promote(key.clone(), index);
                    if selected.iter().any(|s| s.satisfies(requirement)) {
                        continue;
                    }

                    match solver.solve(request) {
                        Ok(next) => {
                            log::debug!("Following greedy requirement {} of {}", requirement, unit);
                            selected = next;
                            continue 'scan;
                        }
                        Err(_) => {
                            log::debug!("Dropping unsatisfiable optional requirement {} of {}", requirement, unit);
                            request.promoted.remove(&(key.clone(), index));
                        }
                    }
                }
            }
            break;
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{namespace, Capability};
    use tycho_version::{Version, VersionRange};

    fn bundle(id: &str) -> InstallableUnit {
        let mut builder = InstallableUnit::builder(id, Version::new(1, 0, 0));
        builder.add_capability(Capability::new(namespace::OSGI_BUNDLE, id, Version::new(1, 0, 0)));
        Arc::try_unwrap(builder.build()).unwrap()
    }

    fn with_requirements(id: &str, requirements: Vec<Requirement>) -> Arc<InstallableUnit> {
        let mut builder = InstallableUnit::builder(id, Version::new(1, 0, 0));
        builder.add_capability(Capability::new(namespace::OSGI_BUNDLE, id, Version::new(1, 0, 0)));
        builder.add_requirements(requirements);
        builder.build()
    }

    fn req(name: &str) -> Requirement {
        Requirement::new(namespace::OSGI_BUNDLE, name, VersionRange::any())
    }

    fn ids(units: &[Arc<InstallableUnit>]) -> Vec<&str> {
        units.iter().map(|u| u.id()).collect()
    }

    #[test]
    fn test_greedy_optional_is_followed() {
        let root = with_requirements("root", vec![req("greedy.opt").optional()]);
        let available = vec![Arc::new(bundle("greedy.opt"))];

        let selected = Projector::new()
            .resolve(&available, &[root], &SelectionContext::new())
            .unwrap();
        assert_eq!(ids(&selected), vec!["root", "greedy.opt"]);
    }

    #[test]
    fn test_non_greedy_optional_is_not_followed() {
        let root = with_requirements("root", vec![req("lazy.opt").optional().with_greedy(false)]);
        let available = vec![Arc::new(bundle("lazy.opt"))];

        let selected = Projector::new()
            .resolve(&available, &[root], &SelectionContext::new())
            .unwrap();
        assert_eq!(ids(&selected), vec!["root"]);
    }

    #[test]
    fn test_unsatisfiable_greedy_optional_is_dropped() {
        let root = with_requirements("root", vec![req("broken").optional()]);
        let broken = with_requirements("broken", vec![req("missing")]);

        let selected = Projector::new()
            .resolve(&[broken], &[root], &SelectionContext::new())
            .unwrap();
        assert_eq!(ids(&selected), vec!["root"]);
    }

    #[test]
    fn test_failure_is_unsatisfiable_status() {
        let root = with_requirements("root", vec![req("missing.one"), req("missing.two")]);

        let err = Projector::new()
            .resolve(&[], &[root], &SelectionContext::new())
            .unwrap_err();
        let status = err.status().unwrap();
        assert!(status.mentions("missing.one"));
        assert!(status.mentions("missing.two"));
    }

    #[test]
    fn test_additional_requirements() {
        let root = with_requirements("root", vec![]);
        let available = vec![Arc::new(bundle("extra"))];

        let selected = Projector::new()
            .with_additional_requirements(vec![req("extra")])
            .resolve(&available, &[root], &SelectionContext::new())
            .unwrap();
        assert_eq!(ids(&selected), vec!["root", "extra"]);
    }
}
