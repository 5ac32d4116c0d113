use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::{InstallableUnit, Requirement, RequirementMatch, UnitKey};

/// Unit identifier in the pool (1-based, 0 is reserved)
pub type UnitId = i32;

/// Registry of all units taking part in one solve.
///
/// Units keep their insertion order, which is the final tie breaker of the
/// selection policy and the order of the solver result.
#[derive(Debug, Default)]
pub struct Pool {
    /// Units indexed by `id - 1`
    units: Vec<Arc<InstallableUnit>>,

    /// Unit key -> id
    by_key: HashMap<UnitKey, UnitId>,

    /// (namespace, capability name) -> providing units, pool order
    providers: HashMap<(String, String), Vec<UnitId>>,

    /// namespace -> units providing anything in it, pool order
    by_namespace: HashMap<String, Vec<UnitId>>,

    /// unit id (IU id) -> all versions in the pool
    by_unit_id: HashMap<String, Vec<UnitId>>,
}

impl Pool {
    /// Create a new empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from units, skipping duplicate keys
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a Arc<InstallableUnit>>) -> Self {
        let mut pool = Self::new();
        for unit in units {
            pool.add_unit(Arc::clone(unit));
        }
        pool
    }

    /// Add a unit, returning its id.
    ///
    /// A unit whose key is already present is not added again; the id of
    /// the first one is returned.
    pub fn add_unit(&mut self, unit: Arc<InstallableUnit>) -> UnitId {
        let key = unit.key();
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }

        let id = (self.units.len() + 1) as UnitId;

        for capability in unit.capabilities() {
            let slot = self
                .providers
                .entry((capability.namespace().to_string(), capability.name().to_string()))
                .or_default();
            if slot.last() != Some(&id) {
                slot.push(id);
            }

            let slot = self
                .by_namespace
                .entry(capability.namespace().to_string())
                .or_default();
            if slot.last() != Some(&id) {
                slot.push(id);
            }
        }

        self.by_unit_id
            .entry(unit.id().to_string())
            .or_default()
            .push(id);
        self.by_key.insert(key, id);
        self.units.push(unit);

        id
    }

    /// Get a unit by id
    pub fn unit(&self, id: UnitId) -> Option<&Arc<InstallableUnit>> {
        if id <= 0 {
            return None;
        }
        self.units.get((id - 1) as usize)
    }

    /// Find the id of a unit by key
    pub fn find(&self, key: &UnitKey) -> Option<UnitId> {
        self.by_key.get(key).copied()
    }

    /// All versions of a unit id, pool order
    pub fn versions_of(&self, unit_id: &str) -> &[UnitId] {
        self.by_unit_id
            .get(unit_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over all unit ids grouped by IU id
    pub fn unit_groups(&self) -> impl Iterator<Item = (&str, &[UnitId])> {
        self.by_unit_id
            .iter()
            .map(|(id, ids)| (id.as_str(), ids.as_slice()))
    }

    /// Units providing a capability that matches the requirement, in pool order
    pub fn what_provides(&self, requirement: &Requirement) -> Vec<UnitId> {
        let candidates = match requirement.matcher() {
            RequirementMatch::Named { name, .. } => self
                .providers
                .get(&(requirement.namespace().to_string(), name.clone())),
            RequirementMatch::Expression { .. } => self.by_namespace.get(requirement.namespace()),
        };

        candidates
            .into_iter()
            .flatten()
            .copied()
            .filter(|&id| {
                self.unit(id)
                    .map(|unit| unit.satisfies(requirement))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Iterate over all units with their ids
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Arc<InstallableUnit>)> {
        self.units
            .iter()
            .enumerate()
            .map(|(idx, unit)| ((idx + 1) as UnitId, unit))
    }

    /// Number of units in the pool
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{namespace, Capability, Filter};
    use tycho_version::{Version, VersionRange};

    fn bundle(id: &str, version: &str) -> Arc<InstallableUnit> {
        let version = Version::parse(version).unwrap();
        let mut builder = InstallableUnit::builder(id, version.clone());
        builder.add_capability(Capability::new(namespace::OSGI_BUNDLE, id, version));
        builder.build()
    }

    #[test]
    fn test_ids_are_one_based_and_keys_deduplicated() {
        let mut pool = Pool::new();
        let a = pool.add_unit(bundle("a", "1.0.0"));
        let b = pool.add_unit(bundle("b", "1.0.0"));
        let again = pool.add_unit(bundle("a", "1.0.0"));

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(again, 1);
        assert_eq!(pool.len(), 2);
        assert!(pool.unit(0).is_none());
    }

    #[test]
    fn test_what_provides_respects_range() {
        let mut pool = Pool::new();
        pool.add_unit(bundle("a", "1.0.0"));
        pool.add_unit(bundle("a", "2.0.0"));

        let req = Requirement::new(
            namespace::OSGI_BUNDLE,
            "a",
            VersionRange::parse("[1.5.0,3.0.0)").unwrap(),
        );
        assert_eq!(pool.what_provides(&req), vec![2]);
        assert_eq!(pool.versions_of("a"), &[1, 2]);
    }

    #[test]
    fn test_what_provides_expression() {
        let mut pool = Pool::new();
        let mut builder = InstallableUnit::builder("jre", Version::new(17, 0, 0));
        builder.add_capability(
            Capability::new(namespace::OSGI_EE, "JavaSE", Version::new(17, 0, 0))
                .with_attribute("osgi.ee", "JavaSE"),
        );
        pool.add_unit(builder.build());
        pool.add_unit(bundle("other", "1.0.0"));

        let req = Requirement::expression(
            namespace::OSGI_EE,
            Filter::parse("(&(osgi.ee=JavaSE)(version>=11))").unwrap(),
        );
        assert_eq!(pool.what_provides(&req), vec![1]);
    }
}
