//! Execution environment handling for the target platform.
//!
//! The JRE is not part of any repository the build reads. Hints inject a
//! synthetic `a.jre.javase` unit that exports the system packages and the
//! `osgi.ee` capabilities of the configured environment.

use std::fmt;
use std::sync::Arc;

use tycho_version::{Version, VersionRange};

use crate::error::{P2Error, Result};
use crate::metadata::namespace::{IU, JAVA_PACKAGE, OSGI_EE};
use crate::metadata::{Capability, InstallableUnit, Requirement};

pub const JRE_UNIT_ID: &str = "a.jre.javase";

const JRE_PREFIX: &str = "a.jre.";
const JRE_CONFIG_PREFIX: &str = "config.a.jre.";

/// Profiles offered by [`AllKnownEEsResolutionHints`]
pub const KNOWN_PROFILES: [&str; 5] = ["JavaSE-1.8", "JavaSE-11", "JavaSE-17", "JavaSE-21", "JavaSE-25"];

/// Packages exported by every JavaSE runtime besides `java.*`
const SYSTEM_PACKAGES: [&str; 22] = [
    "javax.annotation.processing",
    "javax.crypto",
    "javax.crypto.spec",
    "javax.management",
    "javax.naming",
    "javax.net",
    "javax.net.ssl",
    "javax.script",
    "javax.security.auth",
    "javax.security.auth.x500",
    "javax.sql",
    "javax.tools",
    "javax.xml",
    "javax.xml.namespace",
    "javax.xml.parsers",
    "javax.xml.stream",
    "javax.xml.transform",
    "javax.xml.xpath",
    "org.w3c.dom",
    "org.xml.sax",
    "org.xml.sax.helpers",
    "org.ietf.jgss",
];

/// A parsed execution environment profile such as `JavaSE-17`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionEnvironment {
    profile: String,
    family: String,
    version: Version,
}

impl ExecutionEnvironment {
    pub fn parse(profile: &str) -> Result<Self> {
        let profile = profile.trim();
        let (family, version) = profile.rsplit_once('-').ok_or_else(|| {
            P2Error::Config(format!("invalid execution environment \"{}\"", profile))
        })?;
        let version = Version::parse(version).map_err(|e| {
            P2Error::Config(format!("invalid execution environment \"{}\": {}", profile, e))
        })?;
        let family = if family == "J2SE" { "JavaSE" } else { family };

        Ok(Self {
            profile: profile.to_string(),
            family: family.to_string(),
            version,
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Every `osgi.ee` version this environment is compatible with
    fn compatible_versions(&self) -> Vec<Version> {
        if self.family != "JavaSE" {
            return vec![self.version.clone()];
        }

        let legacy_max = if self.version.major() == 1 { self.version.minor() } else { 8 };
        let mut versions: Vec<Version> = (0..=legacy_max).map(|minor| Version::new(1, minor, 0)).collect();
        if self.version.major() >= 9 {
            versions.extend((9..=self.version.major()).map(|major| Version::new(major, 0, 0)));
        }
        versions
    }

    /// The synthetic unit standing in for the JRE
    pub fn jre_unit(&self) -> Arc<InstallableUnit> {
        let mut builder = InstallableUnit::builder(JRE_UNIT_ID, self.version.clone());
        for package in SYSTEM_PACKAGES {
            builder.add_capability(Capability::new(JAVA_PACKAGE, package, Version::ZERO));
        }
        for version in self.compatible_versions() {
            builder.add_capability(Capability::new(OSGI_EE, self.family.clone(), version));
        }
        builder.set_property("org.eclipse.tycho.ee.profile", self.profile.clone());
        builder.build()
    }
}

impl fmt::Display for ExecutionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.profile)
    }
}

/// Adjusts the resolution universe for the configured execution
/// environment before any resolver runs
pub trait ExecutionEnvironmentResolutionHints: fmt::Debug + Send + Sync {
    /// Units from repositories that must not take part in the resolution
    fn is_non_applicable_unit(&self, unit: &InstallableUnit) -> bool;

    /// Synthetic units to add to the universe
    fn additional_units(&self) -> Vec<Arc<InstallableUnit>>;

    /// Requirements added to every resolution
    fn additional_requirements(&self) -> Vec<Requirement>;
}

fn is_jre_unit(unit: &InstallableUnit) -> bool {
    unit.id().starts_with(JRE_PREFIX) || unit.id().starts_with(JRE_CONFIG_PREFIX)
}

/// Resolve against exactly the configured environment
#[derive(Debug, Clone)]
pub struct StandardEEResolutionHints {
    environment: ExecutionEnvironment,
}

impl StandardEEResolutionHints {
    pub fn new(environment: ExecutionEnvironment) -> Self {
        Self { environment }
    }
}

impl ExecutionEnvironmentResolutionHints for StandardEEResolutionHints {
    fn is_non_applicable_unit(&self, unit: &InstallableUnit) -> bool {
        is_jre_unit(unit)
    }

    fn additional_units(&self) -> Vec<Arc<InstallableUnit>> {
        vec![self.environment.jre_unit()]
    }

    fn additional_requirements(&self) -> Vec<Requirement> {
        vec![Requirement::new(
            IU,
            JRE_UNIT_ID,
            VersionRange::exact(self.environment.version().clone()),
        )]
    }
}

/// Offer a JRE unit for every known profile and keep the JRE units of
/// repositories
#[derive(Debug, Clone, Default)]
pub struct AllKnownEEsResolutionHints;

impl AllKnownEEsResolutionHints {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionEnvironmentResolutionHints for AllKnownEEsResolutionHints {
    fn is_non_applicable_unit(&self, _unit: &InstallableUnit) -> bool {
        false
    }

    fn additional_units(&self) -> Vec<Arc<InstallableUnit>> {
        KNOWN_PROFILES
            .iter()
            .filter_map(|profile| ExecutionEnvironment::parse(profile).ok())
            .map(|ee| ee.jre_unit())
            .collect()
    }

    fn additional_requirements(&self) -> Vec<Requirement> {
        Vec::new()
    }
}
