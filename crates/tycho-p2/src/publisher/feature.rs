//! Translation of feature descriptors into group and jar units.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tycho_version::{MatchRule, Version, VersionRange};

use crate::error::{P2Error, Result};
use crate::metadata::namespace::*;
use crate::metadata::{ArtifactKey, Capability, Filter, InstallableUnit, Requirement};

use super::advice::{AdviceContext, AdviceSet};
use super::bundle::{update_range, TranslationResult};

pub const GROUP_SUFFIX: &str = ".feature.group";
pub const JAR_SUFFIX: &str = ".feature.jar";

/// A plugin or feature included by a feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureEntry {
    pub id: String,
    pub version: Option<String>,
    pub optional: bool,
    /// Comma separated values of each environment dimension
    pub os: Option<String>,
    pub ws: Option<String>,
    pub arch: Option<String>,
    pub nl: Option<String>,
    pub filter: Option<String>,
}

impl FeatureEntry {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: Some(version.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    #[default]
    Plugin,
    Feature,
}

/// A `requires` entry of a feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureImport {
    pub kind: ImportKind,
    pub id: String,
    pub version: Option<String>,
    #[serde(rename = "match")]
    pub match_rule: Option<String>,
    pub filter: Option<String>,
}

/// The parts of a feature descriptor the translator reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureDescriptor {
    pub id: String,
    pub version: String,
    pub label: Option<String>,
    pub provider: Option<String>,
    pub plugins: Vec<FeatureEntry>,
    pub included_features: Vec<FeatureEntry>,
    pub imports: Vec<FeatureImport>,
}

/// Translates feature descriptors
#[derive(Debug, Clone, Default)]
pub struct FeatureTranslator {
    advice: AdviceSet,
}

impl FeatureTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advice(mut self, advice: AdviceSet) -> Self {
        self.advice = advice;
        self
    }

    pub fn translate(&self, feature: &FeatureDescriptor) -> Result<TranslationResult> {
        if feature.id.is_empty() {
            return Err(P2Error::translation("feature", "missing feature id"));
        }
        let origin = &feature.id;
        let version = parse_version(origin, Some(&feature.version))?;
        log::debug!("Translating feature {} {}", feature.id, version);

        let jar = self.jar_unit(feature, &version);

        let group_id = format!("{}{}", feature.id, GROUP_SUFFIX);
        let mut group = InstallableUnit::builder(group_id.clone(), version.clone());
        group.set_property(PROP_TYPE_GROUP, "true");
        if let Some(label) = &feature.label {
            group.set_property(PROP_NAME, label.clone());
        }
        if let Some(provider) = &feature.provider {
            group.set_property(PROP_PROVIDER, provider.clone());
        }
        group.set_update_range(update_range(&version));

        for plugin in &feature.plugins {
            group.add_requirement(entry_requirement(origin, plugin, plugin.id.clone())?);
        }
        for included in &feature.included_features {
            let name = format!("{}{}", included.id, GROUP_SUFFIX);
            group.add_requirement(entry_requirement(origin, included, name)?);
        }
        for import in &feature.imports {
            group.add_requirement(import_requirement(origin, import)?);
        }

        group.add_requirement(
            Requirement::new(IU, jar.id(), VersionRange::exact(version.clone()))
                .with_filter(Some(install_features_filter())),
        );

        let patch = self.advice.patch_for(&AdviceContext::new(&group_id, &version));
        patch.apply_to(&mut group);

        Ok(TranslationResult {
            primary: group.build(),
            secondary: vec![jar],
            artifact_properties: patch.artifact_properties,
        })
    }

    fn jar_unit(&self, feature: &FeatureDescriptor, version: &Version) -> Arc<InstallableUnit> {
        let mut jar = InstallableUnit::builder(format!("{}{}", feature.id, JAR_SUFFIX), version.clone());
        jar.add_capability(Capability::new(ECLIPSE_TYPE, TYPE_FEATURE, Version::new(1, 0, 0)));
        jar.add_capability(Capability::new(
            "org.eclipse.update.feature",
            feature.id.clone(),
            version.clone(),
        ));
        jar.add_artifact(ArtifactKey::new(CLASSIFIER_FEATURE, feature.id.clone(), version.clone()));
        jar.set_filter(Some(install_features_filter()));
        if let Some(label) = &feature.label {
            jar.set_property(PROP_NAME, label.clone());
        }
        jar.build()
    }
}

fn install_features_filter() -> Filter {
    Filter::equal(INSTALL_FEATURES, "true")
}

fn parse_version(origin: &str, text: Option<&str>) -> Result<Version> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => Version::parse(text).map_err(|e| P2Error::translation(origin, e.to_string())),
        None => Ok(Version::ZERO),
    }
}

/// Range for an included plugin or feature: exact for a concrete version,
/// every build for `.qualifier`, any for `0.0.0` or no version
fn entry_requirement(origin: &str, entry: &FeatureEntry, name: String) -> Result<Requirement> {
    let version = parse_version(origin, entry.version.as_deref())?;
    let mut requirement = Requirement::new(IU, name, VersionRange::for_reference(&version))
        .with_filter(entry_filter(origin, entry)?);
    if entry.optional {
        requirement = requirement.optional();
    }
    Ok(requirement)
}

fn import_requirement(origin: &str, import: &FeatureImport) -> Result<Requirement> {
    let name = match import.kind {
        ImportKind::Plugin => import.id.clone(),
        ImportKind::Feature => format!("{}{}", import.id, GROUP_SUFFIX),
    };
    let version = parse_version(origin, import.version.as_deref())?;

    let range = match import.match_rule.as_deref() {
        Some(rule) => {
            let rule = MatchRule::parse(rule).map_err(|e| P2Error::translation(origin, e.to_string()))?;
            if version.is_zero() {
                VersionRange::any()
            } else {
                rule.range_for(&version)
            }
        }
        None => {
            if !version.is_zero() {
                log::warn!(
                    "Feature {} imports {} {} without a match rule, accepting any version",
                    origin,
                    name,
                    version
                );
            }
            VersionRange::any()
        }
    };

    let filter = import
        .filter
        .as_deref()
        .map(|text| Filter::parse(text).map_err(|e| P2Error::translation(origin, e.to_string())))
        .transpose()?;
    Ok(Requirement::new(IU, name, range).with_filter(filter))
}

/// OR of equalities within one dimension, AND across dimensions and with
/// the explicit filter
fn entry_filter(origin: &str, entry: &FeatureEntry) -> Result<Option<Filter>> {
    let dimensions = [
        (OSGI_OS, &entry.os),
        (OSGI_WS, &entry.ws),
        (OSGI_ARCH, &entry.arch),
        (OSGI_NL, &entry.nl),
    ];

    let mut clauses: Vec<Filter> = dimensions
        .into_iter()
        .filter_map(|(key, values)| {
            let values: Vec<Filter> = values
                .as_deref()?
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Filter::equal(key, v))
                .collect();
            (!values.is_empty()).then(|| Filter::or(values))
        })
        .collect();

    if let Some(text) = &entry.filter {
        clauses.push(Filter::parse(text).map_err(|e| P2Error::translation(origin, e.to_string()))?);
    }

    Ok((!clauses.is_empty()).then(|| Filter::and(clauses)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SelectionContext;

    fn feature() -> FeatureDescriptor {
        FeatureDescriptor {
            id: "org.example.feature".to_string(),
            version: "1.0.0.v1".to_string(),
            label: Some("Example".to_string()),
            ..FeatureDescriptor::default()
        }
    }

    fn requirement<'a>(unit: &'a InstallableUnit, name: &str) -> &'a Requirement {
        unit.requirements()
            .iter()
            .find(|r| r.name() == Some(name))
            .unwrap()
    }

    #[test]
    fn test_group_and_jar() {
        let result = FeatureTranslator::new().translate(&feature()).unwrap();
        let group = &result.primary;
        let jar = &result.secondary[0];

        assert_eq!(group.id(), "org.example.feature.feature.group");
        assert_eq!(group.property(PROP_TYPE_GROUP), Some("true"));
        assert_eq!(jar.id(), "org.example.feature.feature.jar");
        assert_eq!(jar.artifacts()[0].classifier, CLASSIFIER_FEATURE);

        let jar_req = requirement(group, "org.example.feature.feature.jar");
        assert!(jar.satisfies(jar_req));
        assert!(!jar_req.is_applicable(&SelectionContext::new()));
        assert!(jar_req.is_applicable(&SelectionContext::new().with(INSTALL_FEATURES, "true")));
    }

    #[test]
    fn test_included_entry_ranges() {
        let mut descriptor = feature();
        descriptor.plugins = vec![
            FeatureEntry::new("exact", "1.2.3.v2020"),
            FeatureEntry::new("any", "0.0.0"),
            FeatureEntry::new("qualified", "1.2.3.qualifier"),
            FeatureEntry {
                optional: true,
                ..FeatureEntry::new("maybe", "0.0.0")
            },
        ];
        descriptor.included_features = vec![FeatureEntry::new("child", "2.0.0")];

        let group = FeatureTranslator::new().translate(&descriptor).unwrap().primary;

        assert_eq!(requirement(&group, "exact").range().unwrap().to_string(), "[1.2.3.v2020,1.2.3.v2020]");
        assert!(requirement(&group, "any").range().unwrap().is_any());
        let qualified = requirement(&group, "qualified").range().unwrap();
        assert!(qualified.includes(&Version::parse("1.2.3.v2024").unwrap()));
        assert!(!qualified.includes(&Version::new(1, 2, 4)));

        let maybe = requirement(&group, "maybe");
        assert!(maybe.is_optional() && maybe.is_greedy());
        assert!(requirement(&group, "child.feature.group").is_required());
    }

    #[test]
    fn test_compatible_import() {
        let mut descriptor = feature();
        descriptor.imports = vec![FeatureImport {
            id: "dep".to_string(),
            version: Some("2.3.0".to_string()),
            match_rule: Some("compatible".to_string()),
            ..FeatureImport::default()
        }];

        let group = FeatureTranslator::new().translate(&descriptor).unwrap().primary;
        let range = requirement(&group, "dep").range().unwrap();

        assert!(range.includes(&Version::new(2, 3, 0)));
        assert!(range.includes(&Version::new(2, 9, 9)));
        assert!(!range.includes(&Version::new(3, 0, 0)));
        assert!(!range.includes(&Version::new(2, 2, 9)));
    }

    #[test]
    fn test_import_without_match_accepts_any_version() {
        let mut descriptor = feature();
        descriptor.imports = vec![FeatureImport {
            kind: ImportKind::Feature,
            id: "other".to_string(),
            version: Some("3.0.0".to_string()),
            ..FeatureImport::default()
        }];

        let group = FeatureTranslator::new().translate(&descriptor).unwrap().primary;
        assert!(requirement(&group, "other.feature.group").range().unwrap().is_any());
    }

    #[test]
    fn test_unknown_match_rule_fails() {
        let mut descriptor = feature();
        descriptor.imports = vec![FeatureImport {
            id: "dep".to_string(),
            version: Some("1.0.0".to_string()),
            match_rule: Some("sometimes".to_string()),
            ..FeatureImport::default()
        }];
        let err = FeatureTranslator::new().translate(&descriptor).unwrap_err();
        assert!(err.to_string().contains("org.example.feature"));
    }

    #[test]
    fn test_environment_filter() {
        let mut descriptor = feature();
        descriptor.plugins = vec![FeatureEntry {
            os: Some("linux,macosx".to_string()),
            ws: Some("gtk".to_string()),
            filter: Some("(osgi.arch=x86_64)".to_string()),
            ..FeatureEntry::new("native", "1.0.0")
        }];

        let group = FeatureTranslator::new().translate(&descriptor).unwrap().primary;
        let filter = requirement(&group, "native").filter().unwrap();
        assert_eq!(
            filter.to_string(),
            "(&(|(osgi.os=linux)(osgi.os=macosx))(osgi.ws=gtk)(osgi.arch=x86_64))"
        );

        let linux = SelectionContext::new()
            .with(OSGI_OS, "linux")
            .with(OSGI_WS, "gtk")
            .with(OSGI_ARCH, "x86_64");
        assert!(filter.matches(&linux));
        assert!(!filter.matches(&linux.clone().with(OSGI_OS, "win32")));
    }

    #[test]
    fn test_bad_feature_version() {
        let mut descriptor = feature();
        descriptor.version = "one".to_string();
        assert!(matches!(
            FeatureTranslator::new().translate(&descriptor),
            Err(P2Error::Translation { .. })
        ));
    }
}
