//! Publishing advice: adjustments applied to translated units.
//!
//! Each advice is a pure function from the unit being published to an
//! optional patch. Patches are applied in the fixed order of
//! [`AdviceKind`], then in registration order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tycho_version::Version;

use crate::metadata::{Capability, InstallableUnitBuilder, Requirement};

/// Touchpoint instruction phases
pub const CONFIGURE: &str = "configure";
pub const UNCONFIGURE: &str = "unconfigure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdviceKind {
    Capability,
    Property,
    Touchpoint,
    ArtifactProperty,
}

/// What advice gets to see about the unit being published
#[derive(Debug, Clone, Copy)]
pub struct AdviceContext<'a> {
    pub id: &'a str,
    pub version: &'a Version,
}

impl<'a> AdviceContext<'a> {
    pub fn new(id: &'a str, version: &'a Version) -> Self {
        Self { id, version }
    }
}

/// Additions contributed by advice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvicePatch {
    pub capabilities: Vec<Capability>,
    pub requirements: Vec<Requirement>,
    pub properties: IndexMap<String, String>,
    /// Touchpoint instructions by phase
    pub touchpoint: IndexMap<String, String>,
    pub artifact_properties: IndexMap<String, String>,
}

impl AdvicePatch {
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
            && self.requirements.is_empty()
            && self.properties.is_empty()
            && self.touchpoint.is_empty()
            && self.artifact_properties.is_empty()
    }

    /// Merge a later patch into this one; instructions for one phase concatenate
    pub fn merge(&mut self, other: AdvicePatch) {
        self.capabilities.extend(other.capabilities);
        self.requirements.extend(other.requirements);
        self.properties.extend(other.properties);
        for (phase, instructions) in other.touchpoint {
            self.touchpoint
                .entry(phase)
                .and_modify(|existing| existing.push_str(&instructions))
                .or_insert(instructions);
        }
        self.artifact_properties.extend(other.artifact_properties);
    }

    /// Add capabilities, requirements and properties to a unit.
    ///
    /// Touchpoint instructions and artifact properties are placed by the
    /// translator.
    pub fn apply_to(&self, builder: &mut InstallableUnitBuilder) {
        builder.add_capabilities(self.capabilities.iter().cloned());
        builder.add_requirements(self.requirements.iter().cloned());
        for (key, value) in &self.properties {
            builder.set_property(key.clone(), value.clone());
        }
    }
}

type AdviceFn = dyn Fn(&AdviceContext<'_>) -> Option<AdvicePatch> + Send + Sync;

/// One piece of advice
#[derive(Clone)]
pub struct Advice {
    kind: AdviceKind,
    apply: Arc<AdviceFn>,
}

impl Advice {
    pub fn new<F>(kind: AdviceKind, apply: F) -> Self
    where
        F: Fn(&AdviceContext<'_>) -> Option<AdvicePatch> + Send + Sync + 'static,
    {
        Self {
            kind,
            apply: Arc::new(apply),
        }
    }

    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    pub fn apply(&self, context: &AdviceContext<'_>) -> Option<AdvicePatch> {
        (self.apply)(context)
    }

    /// Set a property on the unit with the given id
    pub fn property(id: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (id, key, value) = (id.into(), key.into(), value.into());
        Self::new(AdviceKind::Property, move |ctx| {
            (ctx.id == id).then(|| AdvicePatch {
                properties: IndexMap::from([(key.clone(), value.clone())]),
                ..AdvicePatch::default()
            })
        })
    }

    /// Provide an additional capability from the unit with the given id
    pub fn capability(id: impl Into<String>, capability: Capability) -> Self {
        let id = id.into();
        Self::new(AdviceKind::Capability, move |ctx| {
            (ctx.id == id).then(|| AdvicePatch {
                capabilities: vec![capability.clone()],
                ..AdvicePatch::default()
            })
        })
    }

    /// Set an artifact property for the unit with the given id
    pub fn artifact_property(
        id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let (id, key, value) = (id.into(), key.into(), value.into());
        Self::new(AdviceKind::ArtifactProperty, move |ctx| {
            (ctx.id == id).then(|| AdvicePatch {
                artifact_properties: IndexMap::from([(key.clone(), value.clone())]),
                ..AdvicePatch::default()
            })
        })
    }

    /// Start level and auto start configuration of a bundle
    pub fn start_level(id: impl Into<String>, level: Option<i32>, started: bool) -> Self {
        let id = id.into();
        Self::new(AdviceKind::Touchpoint, move |ctx| {
            if ctx.id != id {
                return None;
            }

            let mut configure = String::new();
            let mut unconfigure = String::new();
            if let Some(level) = level {
                configure.push_str(&format!("setStartLevel(startLevel:{});", level));
                unconfigure.push_str("setStartLevel(startLevel:-1);");
            }
            if started {
                configure.push_str("markStarted(started:true);");
                unconfigure.push_str("markStarted(started:false);");
            }
            if configure.is_empty() {
                return None;
            }

            Some(AdvicePatch {
                touchpoint: IndexMap::from([
                    (CONFIGURE.to_string(), configure),
                    (UNCONFIGURE.to_string(), unconfigure),
                ]),
                ..AdvicePatch::default()
            })
        })
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advice").field("kind", &self.kind).finish()
    }
}

/// The advice registered for one publishing run
#[derive(Debug, Clone, Default)]
pub struct AdviceSet {
    advice: Vec<Advice>,
}

impl AdviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, advice: Advice) -> &mut Self {
        self.advice.push(advice);
        self
    }

    pub fn len(&self) -> usize {
        self.advice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advice.is_empty()
    }

    /// Collect the combined patch for a unit
    pub fn patch_for(&self, context: &AdviceContext<'_>) -> AdvicePatch {
        let mut ordered: Vec<&Advice> = self.advice.iter().collect();
        ordered.sort_by_key(|a| a.kind());

        let mut patch = AdvicePatch::default();
        for advice in ordered {
            if let Some(next) = advice.apply(context) {
                patch.merge(next);
            }
        }
        patch
    }
}

impl FromIterator<Advice> for AdviceSet {
    fn from_iter<T: IntoIterator<Item = Advice>>(iter: T) -> Self {
        Self {
            advice: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advice_only_applies_to_its_unit() {
        let set: AdviceSet = [Advice::property("a", "k", "v")].into_iter().collect();
        let version = Version::new(1, 0, 0);

        assert_eq!(set.patch_for(&AdviceContext::new("a", &version)).properties["k"], "v");
        assert!(set.patch_for(&AdviceContext::new("b", &version)).is_empty());
    }

    #[test]
    fn test_kinds_apply_in_fixed_order() {
        let mut set = AdviceSet::new();
        set.add(Advice::property("a", "k", "from-property"));
        set.add(Advice::new(AdviceKind::Capability, |_| {
            Some(AdvicePatch {
                properties: IndexMap::from([("k".to_string(), "from-capability".to_string())]),
                ..AdvicePatch::default()
            })
        }));

        let version = Version::new(1, 0, 0);
        let patch = set.patch_for(&AdviceContext::new("a", &version));
        assert_eq!(patch.properties["k"], "from-property");
    }

    #[test]
    fn test_start_level_instructions() {
        let set: AdviceSet = [Advice::start_level("a", Some(4), true)].into_iter().collect();
        let version = Version::new(1, 0, 0);
        let patch = set.patch_for(&AdviceContext::new("a", &version));

        assert_eq!(
            patch.touchpoint[CONFIGURE],
            "setStartLevel(startLevel:4);markStarted(started:true);"
        );
        assert_eq!(
            patch.touchpoint[UNCONFIGURE],
            "setStartLevel(startLevel:-1);markStarted(started:false);"
        );
    }
}
