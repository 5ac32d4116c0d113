use std::cmp::Ordering;

use super::pool::{Pool, UnitId};

/// Policy for selecting between candidate units.
///
/// When multiple units can satisfy a requirement, the policy determines
/// which one to try first: highest version, then unit id, then pool order.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Prefer lowest versions (for testing)
    pub prefer_lowest: bool,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set preference for lowest versions
    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Returns the candidates sorted by preference (best first)
    pub fn select_preferred(&self, pool: &Pool, candidates: &[UnitId]) -> Vec<UnitId> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|&a, &b| self.compare(pool, a, b));
        sorted.dedup();
        sorted
    }

    /// Best candidate according to this policy
    pub fn select_best(&self, pool: &Pool, candidates: &[UnitId]) -> Option<UnitId> {
        self.select_preferred(pool, candidates).into_iter().next()
    }

    fn compare(&self, pool: &Pool, a: UnitId, b: UnitId) -> Ordering {
        let (Some(unit_a), Some(unit_b)) = (pool.unit(a), pool.unit(b)) else {
            return a.cmp(&b);
        };

        let by_version = if self.prefer_lowest {
            unit_a.version().cmp(unit_b.version())
        } else {
            unit_b.version().cmp(unit_a.version())
        };

        by_version
            .then_with(|| unit_a.id().cmp(unit_b.id()))
            .then_with(|| a.cmp(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::InstallableUnit;
    use tycho_version::Version;

    fn pool() -> Pool {
        let mut pool = Pool::new();
        pool.add_unit(InstallableUnit::builder("a", Version::new(1, 0, 0)).build());
        pool.add_unit(InstallableUnit::builder("a", Version::new(3, 0, 0)).build());
        pool.add_unit(InstallableUnit::builder("a", Version::new(2, 0, 0)).build());
        pool.add_unit(InstallableUnit::builder("b", Version::new(3, 0, 0)).build());
        pool
    }

    #[test]
    fn test_policy_prefer_highest() {
        let pool = pool();
        let policy = Policy::new();
        assert_eq!(policy.select_preferred(&pool, &[1, 2, 3]), vec![2, 3, 1]);
    }

    #[test]
    fn test_policy_prefer_lowest() {
        let pool = pool();
        let policy = Policy::new().prefer_lowest(true);
        assert_eq!(policy.select_best(&pool, &[2, 3, 1]), Some(1));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let pool = pool();
        assert_eq!(Policy::new().select_preferred(&pool, &[4, 2]), vec![2, 4]);
    }
}
