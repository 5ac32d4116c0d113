//! Translation of OSGi bundle manifests into installable units.

use std::sync::Arc;

use indexmap::IndexMap;
use tycho_version::{Version, VersionRange};

use crate::error::{P2Error, Result};
use crate::metadata::namespace::{self, *};
use crate::metadata::{
    ArtifactKey, Capability, Filter, InstallableUnit, InstallableUnitBuilder, Requirement,
};

use super::advice::{AdviceContext, AdviceSet, CONFIGURE, UNCONFIGURE};
use super::manifest::{Manifest, ManifestElement};

pub const DEFAULT_FLAVOR: &str = "tooling";
const DEFAULT_LOCALIZATION: &str = "OSGI-INF/l10n/bundle";

/// Headers whose values may be localized with `%key`
const LOCALIZED_HEADERS: [(&str, &str); 3] = [
    ("Bundle-Name", PROP_NAME),
    ("Bundle-Vendor", PROP_PROVIDER),
    ("Bundle-Description", PROP_DESCRIPTION),
];

/// How the bundle is laid out on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BundleShape {
    #[default]
    Jar,
    Dir,
}

/// Everything the translator reads about one bundle
#[derive(Debug, Clone, Default)]
pub struct BundleDescription {
    pub manifest: Manifest,
    /// locale -> localization key -> translated value
    pub localizations: IndexMap<String, IndexMap<String, String>>,
    /// False when manifest sections are missing; no artifact key is emitted
    pub complete: bool,
    pub shape: BundleShape,
}

impl BundleDescription {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            complete: true,
            ..Self::default()
        }
    }

    pub fn with_localization(
        mut self,
        locale: impl Into<String>,
        table: IndexMap<String, String>,
    ) -> Self {
        self.localizations.insert(locale.into(), table);
        self
    }
}

/// Units produced for one published item
#[derive(Debug, Clone)]
pub struct TranslationResult {
    pub primary: Arc<InstallableUnit>,
    /// Localization, configuration and source companion units
    pub secondary: Vec<Arc<InstallableUnit>>,
    pub artifact_properties: IndexMap<String, String>,
}

impl TranslationResult {
    pub fn units(&self) -> impl Iterator<Item = &Arc<InstallableUnit>> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }
}

/// Translates bundle manifests into units
#[derive(Debug, Clone)]
pub struct BundleTranslator {
    advice: AdviceSet,
    flavor: String,
    source_companion: bool,
}

impl Default for BundleTranslator {
    fn default() -> Self {
        Self {
            advice: AdviceSet::new(),
            flavor: DEFAULT_FLAVOR.to_string(),
            source_companion: false,
        }
    }
}

impl BundleTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advice(mut self, advice: AdviceSet) -> Self {
        self.advice = advice;
        self
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = flavor.into();
        self
    }

    /// Also emit a `{id}.source` unit for every non-source bundle
    pub fn with_source_companion(mut self, enabled: bool) -> Self {
        self.source_companion = enabled;
        self
    }

    pub fn translate(&self, bundle: &BundleDescription) -> Result<TranslationResult> {
        let manifest = &bundle.manifest;

        let symbolic_name = manifest
            .elements("Bundle-SymbolicName")
            .into_iter()
            .next()
            .filter(|e| !e.value().is_empty())
            .ok_or_else(|| P2Error::translation("bundle", "missing Bundle-SymbolicName header"))?;
        let id = symbolic_name.value().to_string();

        let version = match manifest.get("Bundle-Version") {
            Some(text) => Version::parse(text)
                .map_err(|e| P2Error::translation(&id, e.to_string()))?,
            None => Version::ZERO,
        };

        log::debug!("Translating bundle {} {}", id, version);

        let is_source = manifest.get("Eclipse-SourceBundle").is_some();
        let mut builder = InstallableUnit::builder(id.clone(), version.clone());
        builder.set_singleton(is_singleton(&symbolic_name));
        builder.add_capability(Capability::new(OSGI_BUNDLE, id.clone(), version.clone()));

        self.add_fragment_host(manifest, &id, &version, &mut builder)?;
        self.add_requirements(manifest, &id, &mut builder)?;
        self.add_capabilities(manifest, &id, &version, &mut builder)?;

        let platform_filter = manifest
            .get("Eclipse-PlatformFilter")
            .map(|text| Filter::parse(text).map_err(|e| P2Error::translation(&id, e.to_string())))
            .transpose()?;
        builder.set_filter(platform_filter.clone());

        let type_name = if is_source { TYPE_SOURCE } else { TYPE_BUNDLE };
        builder.add_capability(Capability::new(ECLIPSE_TYPE, type_name, Version::new(1, 0, 0)));
        if !is_source {
            builder.add_requirement(source_requirement(&id, &version));
        }

        builder.set_update_range(update_range(&version));

        for (header, property) in LOCALIZED_HEADERS {
            if let Some(value) = manifest.get(header) {
                builder.set_property(property, value);
            }
        }
        let localization = manifest
            .get("Bundle-Localization")
            .unwrap_or(DEFAULT_LOCALIZATION);
        builder.set_property(PROP_BUNDLE_LOCALIZATION, localization);

        if bundle.complete {
            builder.add_artifact(ArtifactKey::new(CLASSIFIER_BUNDLE, id.clone(), version.clone()));
        } else {
            log::warn!("Bundle {} has incomplete manifest sections, no artifact published", id);
        }

        builder.set_touchpoint(
            "manifest",
            format!("Bundle-SymbolicName: {}\nBundle-Version: {}\n", id, version),
        );
        if bundle.shape == BundleShape::Dir {
            builder.set_touchpoint("zipped", "true");
        }

        let patch = self.advice.patch_for(&AdviceContext::new(&id, &version));
        patch.apply_to(&mut builder);

        let mut secondary = localization_fragments(bundle, &id, &version);
        if patch.touchpoint.contains_key(CONFIGURE) || patch.touchpoint.contains_key(UNCONFIGURE) {
            secondary.push(self.configuration_unit(&id, &version, &patch.touchpoint, platform_filter));
        }
        if self.source_companion && !is_source {
            secondary.push(source_companion(&id, &version));
        }

        Ok(TranslationResult {
            primary: builder.build(),
            secondary,
            artifact_properties: patch.artifact_properties,
        })
    }

    fn add_fragment_host(
        &self,
        manifest: &Manifest,
        id: &str,
        version: &Version,
        builder: &mut InstallableUnitBuilder,
    ) -> Result<()> {
        let Some(host) = manifest.elements("Fragment-Host").into_iter().next() else {
            return Ok(());
        };
        let range = parse_range(id, host.attribute("bundle-version"))?;
        builder.add_capability(Capability::new(OSGI_FRAGMENT, host.value(), version.clone()));
        builder.add_host_requirement(Requirement::new(OSGI_BUNDLE, host.value(), range));
        Ok(())
    }

    fn add_requirements(
        &self,
        manifest: &Manifest,
        id: &str,
        builder: &mut InstallableUnitBuilder,
    ) -> Result<()> {
        for element in manifest.elements("Require-Bundle") {
            let range = parse_range(id, element.attribute("bundle-version"))?;
            let requirement = Requirement::new(OSGI_BUNDLE, element.value(), range);
            builder.add_requirement(apply_resolution(requirement, &element));
        }

        for element in manifest.elements("Import-Package") {
            let range = parse_range(
                id,
                element
                    .attribute("version")
                    .or_else(|| element.attribute("specification-version")),
            )?;
            for package in &element.values {
                let requirement = Requirement::new(JAVA_PACKAGE, package.clone(), range.clone());
                builder.add_requirement(apply_resolution(requirement, &element));
            }
        }

        for element in manifest.elements("Require-Capability") {
            if let Some(requirement) = generic_requirement(id, &element)? {
                builder.add_requirement(requirement);
            }
        }

        if let Some(requirement) = execution_environment_requirement(manifest) {
            builder.add_requirement(requirement);
        }

        Ok(())
    }

    fn add_capabilities(
        &self,
        manifest: &Manifest,
        id: &str,
        version: &Version,
        builder: &mut InstallableUnitBuilder,
    ) -> Result<()> {
        for element in manifest.elements("Export-Package") {
            let package_version = match element.attribute("version") {
                Some(text) => {
                    Version::parse(text).map_err(|e| P2Error::translation(id, e.to_string()))?
                }
                None => Version::ZERO,
            };
            for package in &element.values {
                builder.add_capability(Capability::new(
                    JAVA_PACKAGE,
                    package.clone(),
                    package_version.clone(),
                ));
            }
        }

        for (index, element) in manifest.elements("Provide-Capability").into_iter().enumerate() {
            builder.add_capability(generic_capability(id, version, index, &element)?);
        }

        Ok(())
    }

    fn configuration_unit(
        &self,
        id: &str,
        version: &Version,
        touchpoint: &IndexMap<String, String>,
        filter: Option<Filter>,
    ) -> Arc<InstallableUnit> {
        let mut builder = InstallableUnit::builder(format!("{}{}", self.flavor, id), version.clone());
        builder.add_capability(Capability::new(FLAVOR, self.flavor.clone(), Version::new(1, 0, 0)));
        builder.add_host_requirement(Requirement::new(
            OSGI_BUNDLE,
            id,
            VersionRange::exact(version.clone()),
        ));
        builder.set_filter(filter);
        for (phase, instructions) in touchpoint {
            builder.set_touchpoint(phase.clone(), instructions.clone());
        }
        builder.build()
    }
}

fn is_singleton(symbolic_name: &ManifestElement) -> bool {
    symbolic_name
        .directive("singleton")
        .or_else(|| symbolic_name.attribute("singleton"))
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_range(id: &str, text: Option<&str>) -> Result<VersionRange> {
    match text {
        Some(text) => VersionRange::parse(text).map_err(|e| P2Error::translation(id, e.to_string())),
        None => Ok(VersionRange::any()),
    }
}

/// `resolution:=optional` makes a requirement optional; only
/// `x-installation:=greedy` keeps an optional requirement greedy
fn apply_resolution(requirement: Requirement, element: &ManifestElement) -> Requirement {
    if element.directive("resolution") != Some("optional") {
        return requirement;
    }
    let greedy = element.directive("x-installation") == Some("greedy");
    requirement.optional().with_greedy(greedy)
}

fn generic_requirement(id: &str, element: &ManifestElement) -> Result<Option<Requirement>> {
    let namespace = element.value();
    if let Some(effective) = element.directive("effective") {
        if effective != "resolve" {
            return Ok(None);
        }
    }

    let filter = match element.directive("filter") {
        Some(text) => Filter::parse(text).map_err(|e| P2Error::translation(id, e.to_string()))?,
        None => Filter::Present(namespace.to_string()),
    };

    let mut requirement = Requirement::expression(namespace, filter);
    if element.directive("cardinality") == Some("multiple") {
        requirement = requirement.multiple();
    }
    Ok(Some(apply_resolution(requirement, element)))
}

/// A capability without an attribute named like its namespace gets the
/// name `{id}_{version}-{index}`
fn generic_capability(
    id: &str,
    version: &Version,
    index: usize,
    element: &ManifestElement,
) -> Result<Capability> {
    let namespace = element.value();
    let capability_version = match element.attribute("version") {
        Some(text) => Version::parse(text).map_err(|e| P2Error::translation(id, e.to_string()))?,
        None => Version::ZERO,
    };

    let name = match element.attribute(namespace) {
        Some(name) => name.to_string(),
        None => format!("{}_{}-{}", id, version, index),
    };

    let mut capability = Capability::new(namespace, name.clone(), capability_version);
    for (key, value) in &element.attributes {
        capability = capability.with_attribute(key.clone(), value.clone());
    }
    if element.attribute(namespace).is_none() {
        capability = capability.with_attribute(namespace, name);
    }
    Ok(capability)
}

/// `JavaSE-17, J2SE-1.5` becomes
/// `(|(&(osgi.ee=JavaSE)(version=17))(&(osgi.ee=JavaSE)(version=1.5)))`
fn execution_environment_requirement(manifest: &Manifest) -> Option<Requirement> {
    let header = manifest.get("Bundle-RequiredExecutionEnvironment")?;
    let alternatives: Vec<Filter> = header
        .split(',')
        .map(str::trim)
        .filter(|ee| !ee.is_empty())
        .map(ee_filter)
        .collect();

    if alternatives.is_empty() {
        return None;
    }
    Some(Requirement::expression(OSGI_EE, Filter::or(alternatives)))
}

fn ee_filter(ee: &str) -> Filter {
    let (name, version) = match ee.rsplit_once('-') {
        Some((name, version)) if Version::parse(version).is_ok() => (name, Some(version)),
        _ => (ee, None),
    };
    let name = if name == "J2SE" { "JavaSE" } else { name };

    match version {
        Some(version) => Filter::and(vec![
            Filter::equal(OSGI_EE, name),
            Filter::equal("version", version),
        ]),
        None => Filter::equal(OSGI_EE, name),
    }
}

fn source_requirement(id: &str, version: &Version) -> Requirement {
    Requirement::new(
        namespace::IU,
        format!("{}.source", id),
        VersionRange::exact(version.clone()),
    )
    .optional()
    .with_greedy(false)
    .with_filter(Some(Filter::equal(INSTALL_SOURCES, "true")))
}

/// `[0.0.0, v)`; a `0.0.0` bundle gets the empty range
pub fn update_range(version: &Version) -> VersionRange {
    if version.is_zero() {
        VersionRange::empty()
    } else {
        VersionRange::new(Version::ZERO, true, version.clone(), false)
    }
}

fn localized_key(value: &str) -> Option<&str> {
    value.strip_prefix('%').map(str::trim).filter(|k| !k.is_empty())
}

/// One fragment per locale carrying the translated host properties
fn localization_fragments(
    bundle: &BundleDescription,
    id: &str,
    version: &Version,
) -> Vec<Arc<InstallableUnit>> {
    let keys: Vec<&str> = LOCALIZED_HEADERS
        .iter()
        .filter_map(|(header, _)| bundle.manifest.get(header))
        .filter_map(localized_key)
        .collect();
    if keys.is_empty() {
        return Vec::new();
    }

    bundle
        .localizations
        .iter()
        .filter_map(|(locale, table)| {
            let translated: Vec<(&str, &String)> = keys
                .iter()
                .filter_map(|key| table.get(*key).map(|value| (*key, value)))
                .collect();
            if translated.is_empty() {
                return None;
            }

            let mut builder = InstallableUnit::builder(
                format!("{}.translated_host_properties.{}", id, locale),
                version.clone(),
            );
            builder.add_host_requirement(Requirement::new(
                OSGI_BUNDLE,
                id,
                VersionRange::exact(version.clone()),
            ));
            builder.add_capability(Capability::new(LOCALIZATION, locale.clone(), Version::new(1, 0, 0)));
            for (key, value) in translated {
                builder.set_property(format!("{}.{}", locale, key), value.clone());
            }
            Some(builder.build())
        })
        .collect()
}

fn source_companion(id: &str, version: &Version) -> Arc<InstallableUnit> {
    let source_id = format!("{}.source", id);
    let mut builder = InstallableUnit::builder(source_id.clone(), version.clone());
    builder.add_capability(Capability::new(OSGI_BUNDLE, source_id.clone(), version.clone()));
    builder.add_capability(Capability::new(ECLIPSE_TYPE, TYPE_SOURCE, Version::new(1, 0, 0)));
    builder.set_update_range(update_range(version));
    builder.add_artifact(ArtifactKey::new(CLASSIFIER_BUNDLE, source_id, version.clone()));
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SelectionContext;
    use crate::publisher::advice::Advice;

    fn manifest(headers: &[(&str, &str)]) -> BundleDescription {
        BundleDescription::new(headers.iter().copied().collect())
    }

    fn translate(headers: &[(&str, &str)]) -> TranslationResult {
        BundleTranslator::new().translate(&manifest(headers)).unwrap()
    }

    fn requirement<'a>(unit: &'a InstallableUnit, name: &str) -> &'a Requirement {
        unit.requirements()
            .iter()
            .find(|r| r.name() == Some(name))
            .unwrap()
    }

    #[test]
    fn test_basic_bundle() {
        let result = translate(&[
            ("Bundle-SymbolicName", "org.example.a;singleton:=true"),
            ("Bundle-Version", "1.2.3.v2024"),
            ("Bundle-Name", "Example"),
        ]);
        let unit = &result.primary;

        assert_eq!(unit.id(), "org.example.a");
        assert!(unit.is_singleton());
        assert!(unit.provides(namespace::IU, "org.example.a"));
        assert!(unit.provides(OSGI_BUNDLE, "org.example.a"));
        assert!(unit.provides(ECLIPSE_TYPE, TYPE_BUNDLE));
        assert_eq!(unit.property(PROP_NAME), Some("Example"));
        assert_eq!(unit.artifacts()[0].classifier, CLASSIFIER_BUNDLE);
        assert!(result.secondary.is_empty());
    }

    #[test]
    fn test_missing_symbolic_name() {
        let err = BundleTranslator::new()
            .translate(&manifest(&[("Bundle-Version", "1.0.0")]))
            .unwrap_err();
        assert!(matches!(err, P2Error::Translation { .. }));
    }

    #[test]
    fn test_bad_version_fails() {
        let err = BundleTranslator::new()
            .translate(&manifest(&[("Bundle-SymbolicName", "a"), ("Bundle-Version", "1.x")]))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to translate a"));
    }

    #[test]
    fn test_resolution_and_greediness() {
        let result = translate(&[
            ("Bundle-SymbolicName", "a"),
            ("Bundle-Version", "1.0.0"),
            (
                "Require-Bundle",
                "req;bundle-version=\"[1.0.0,2.0.0)\",opt;resolution:=optional,greedy;resolution:=optional;x-installation:=greedy",
            ),
            ("Import-Package", "org.pkg.a,org.pkg.b;version=\"1.0\""),
            ("DynamicImport-Package", "*"),
        ]);
        let unit = &result.primary;

        let req = requirement(unit, "req");
        assert!(req.is_required() && req.is_greedy());
        assert!(req.range().unwrap().includes(&Version::new(1, 5, 0)));

        let opt = requirement(unit, "opt");
        assert!(opt.is_optional() && !opt.is_greedy());

        let greedy = requirement(unit, "greedy");
        assert!(greedy.is_optional() && greedy.is_greedy());

        assert_eq!(requirement(unit, "org.pkg.b").namespace(), JAVA_PACKAGE);
        assert!(unit.requirements().iter().all(|r| r.name() != Some("*")));
    }

    #[test]
    fn test_source_requirement_and_exclusivity() {
        let binary = translate(&[("Bundle-SymbolicName", "a"), ("Bundle-Version", "1.0.0")]);
        let source_req = requirement(&binary.primary, "a.source");
        assert!(source_req.is_optional() && !source_req.is_greedy());
        assert_eq!(source_req.range().unwrap().as_exact(), Some(&Version::new(1, 0, 0)));
        assert!(!source_req.is_applicable(&SelectionContext::new()));
        assert!(source_req.is_applicable(&SelectionContext::new().with(INSTALL_SOURCES, "true")));

        let source = translate(&[
            ("Bundle-SymbolicName", "a.source"),
            ("Bundle-Version", "1.0.0"),
            ("Eclipse-SourceBundle", "a;version=\"1.0.0\""),
        ]);
        let unit = &source.primary;
        assert!(unit.provides(ECLIPSE_TYPE, TYPE_SOURCE));
        assert!(!unit.provides(ECLIPSE_TYPE, TYPE_BUNDLE));
        assert!(unit.requirements().iter().all(|r| r.name() != Some("a.source.source")));
    }

    #[test]
    fn test_update_range() {
        let unit = translate(&[("Bundle-SymbolicName", "a"), ("Bundle-Version", "2.1.0")]).primary;
        assert_eq!(unit.update_range().unwrap().to_string(), "[0.0.0,2.1.0)");

        let zero = translate(&[("Bundle-SymbolicName", "a")]).primary;
        assert!(zero.update_range().unwrap().is_empty());
    }

    #[test]
    fn test_fragment_host() {
        let unit = translate(&[
            ("Bundle-SymbolicName", "org.eclipse.swt.gtk.linux.x86_64"),
            ("Bundle-Version", "3.120.0"),
            ("Fragment-Host", "org.eclipse.swt;bundle-version=\"[3.0.0,4.0.0)\""),
            ("Export-Package", "org.eclipse.swt.internal.gtk;x-internal:=true"),
            ("Eclipse-PlatformFilter", "(& (osgi.ws=gtk) (osgi.os=linux) (osgi.arch=x86_64))"),
        ])
        .primary;

        assert!(unit.is_fragment());
        assert!(unit.provides(OSGI_FRAGMENT, "org.eclipse.swt"));
        assert!(unit.provides(JAVA_PACKAGE, "org.eclipse.swt.internal.gtk"));
        assert!(unit.filter().is_some());
    }

    #[test]
    fn test_generic_capabilities() {
        let unit = translate(&[
            ("Bundle-SymbolicName", "a"),
            ("Bundle-Version", "1.0.0"),
            (
                "Provide-Capability",
                "osgi.service;objectClass=x.Y,named.ns;named.ns=thing;version:Version=2.0",
            ),
            (
                "Require-Capability",
                "osgi.extender;filter:=\"(osgi.extender=osgi.component)\",osgi.service;effective:=active,osgi.serviceloader;cardinality:=multiple",
            ),
        ])
        .primary;

        assert!(unit.provides("osgi.service", "a_1.0.0-0"));
        let named = unit.capabilities_in("named.ns").next().unwrap();
        assert_eq!(named.name(), "thing");
        assert_eq!(named.version(), &Version::new(2, 0, 0));

        let generic: Vec<_> = unit
            .requirements()
            .iter()
            .filter(|r| r.name().is_none() && r.namespace() != OSGI_EE)
            .collect();
        assert_eq!(generic.len(), 2);
        assert_eq!(generic[1].max(), u32::MAX);
    }

    #[test]
    fn test_execution_environment_requirement() {
        let unit = translate(&[
            ("Bundle-SymbolicName", "a"),
            ("Bundle-RequiredExecutionEnvironment", "JavaSE-17, J2SE-1.5"),
        ])
        .primary;

        let ee = unit
            .requirements()
            .iter()
            .find(|r| r.namespace() == OSGI_EE)
            .unwrap();
        assert_eq!(
            ee.to_string(),
            "osgi.ee; (|(&(osgi.ee=JavaSE)(version=17))(&(osgi.ee=JavaSE)(version=1.5)))"
        );
    }

    #[test]
    fn test_incomplete_manifest_has_no_artifact() {
        let mut bundle = manifest(&[("Bundle-SymbolicName", "a")]);
        bundle.complete = false;
        let result = BundleTranslator::new().translate(&bundle).unwrap();
        assert!(result.primary.artifacts().is_empty());
    }

    #[test]
    fn test_localization_fragments() {
        let bundle = manifest(&[
            ("Bundle-SymbolicName", "a"),
            ("Bundle-Version", "1.0.0"),
            ("Bundle-Name", "%bundleName"),
        ])
        .with_localization("de", IndexMap::from([("bundleName".to_string(), "Beispiel".to_string())]))
        .with_localization("fr", IndexMap::from([("other".to_string(), "x".to_string())]));

        let result = BundleTranslator::new().translate(&bundle).unwrap();
        assert_eq!(result.primary.property(PROP_NAME), Some("%bundleName"));
        assert_eq!(result.secondary.len(), 1);

        let fragment = &result.secondary[0];
        assert_eq!(fragment.id(), "a.translated_host_properties.de");
        assert_eq!(fragment.property("de.bundleName"), Some("Beispiel"));
        assert!(fragment.provides(LOCALIZATION, "de"));
        assert!(fragment.is_fragment());
    }

    #[test]
    fn test_configuration_unit_from_advice() {
        let advice: AdviceSet = [Advice::start_level("a", Some(3), true)].into_iter().collect();
        let result = BundleTranslator::new()
            .with_advice(advice)
            .translate(&manifest(&[("Bundle-SymbolicName", "a"), ("Bundle-Version", "1.0.0")]))
            .unwrap();

        let cu = &result.secondary[0];
        assert_eq!(cu.id(), "toolinga");
        assert!(cu.touchpoint_data()[CONFIGURE].contains("setStartLevel(startLevel:3);"));
        assert!(cu.is_fragment());
    }

    #[test]
    fn test_source_companion() {
        let result = BundleTranslator::new()
            .with_source_companion(true)
            .translate(&manifest(&[("Bundle-SymbolicName", "a"), ("Bundle-Version", "1.0.0")]))
            .unwrap();

        let source = &result.secondary[0];
        assert_eq!(source.id(), "a.source");
        assert!(source.provides(ECLIPSE_TYPE, TYPE_SOURCE));
        assert!(source.satisfies(requirement(&result.primary, "a.source")));
    }
}
