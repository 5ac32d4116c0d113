//! Reactor description files.
//!
//! A reactor file lists the projects of a build. Each project publishes
//! units given directly or translated from manifests, features and
//! products:
//!
//! ```json
//! {
//!   "projects": [
//!     {
//!       "id": "org.example:bundle",
//!       "manifests": [{"Bundle-SymbolicName": "org.example", "Bundle-Version": "1.0.0"}],
//!       "mainArtifact": "target/bundle.jar"
//!     }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tycho_p2::publisher::{
    BundleDescription, FeatureDescriptor, Manifest, ProductDescriptor,
};
use tycho_p2::target::ReactorProject;
use tycho_p2::{BundleTranslator, FeatureTranslator, InstallableUnit, ProductTranslator};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReactorFile {
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub id: String,
    pub units: Vec<InstallableUnit>,
    pub manifests: Vec<IndexMap<String, String>>,
    pub features: Vec<FeatureDescriptor>,
    pub products: Vec<ProductDescriptor>,
    pub main_artifact: Option<PathBuf>,
    pub secondary_artifacts: IndexMap<String, PathBuf>,
}

impl ReactorFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Translate every project entry
    pub fn into_projects(self, include_sources: bool) -> Result<Vec<ReactorProject>> {
        self.projects
            .into_iter()
            .map(|entry| entry.into_project(include_sources))
            .collect()
    }
}

impl ProjectEntry {
    fn into_project(self, include_sources: bool) -> Result<ReactorProject> {
        let mut units: Vec<Arc<InstallableUnit>> = self
            .units
            .into_iter()
            .map(|u| Arc::new(u.with_self_capability()))
            .collect();

        let bundles = BundleTranslator::new().with_source_companion(include_sources);
        for headers in self.manifests {
            let description = BundleDescription::new(Manifest::new(headers));
            let result = bundles
                .translate(&description)
                .with_context(|| format!("Failed to translate a manifest of {}", self.id))?;
            units.extend(result.units().cloned());
        }

        let features = FeatureTranslator::new();
        for feature in &self.features {
            let result = features
                .translate(feature)
                .with_context(|| format!("Failed to translate feature {}", feature.id))?;
            units.extend(result.units().cloned());
        }

        let products = ProductTranslator::new();
        for product in &self.products {
            let result = products
                .translate(product)
                .with_context(|| format!("Failed to translate product {}", product.id))?;
            units.extend(result.units().cloned());
        }

        log::debug!("Project {} publishes {} units", self.id, units.len());

        let mut project = ReactorProject::new(self.id).with_units(units);
        if let Some(main) = self.main_artifact {
            project.set_main_artifact(main);
        }
        for (classifier, location) in self.secondary_artifacts {
            project.add_secondary_artifact(Some(&classifier), location)?;
        }
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projects_are_translated() {
        let file: ReactorFile = serde_json::from_str(
            r#"{
                "projects": [{
                    "id": "org.example:bundle",
                    "manifests": [{"Bundle-SymbolicName": "org.example", "Bundle-Version": "1.2.0"}],
                    "features": [{"id": "org.example.feature", "version": "1.0.0"}],
                    "mainArtifact": "target/bundle.jar",
                    "secondaryArtifacts": {"sources": "target/bundle-sources.jar"}
                }]
            }"#,
        )
        .unwrap();

        let projects = file.into_projects(false).unwrap();
        let project = &projects[0];
        let ids: Vec<&str> = project.seed_units().iter().map(|u| u.id()).collect();
        assert!(ids.contains(&"org.example"));
        assert!(ids.contains(&"org.example.feature.feature.group"));
        assert!(ids.contains(&"org.example.feature.feature.jar"));
        assert_eq!(project.artifacts().secondary("sources"), Some(Path::new("target/bundle-sources.jar")));
    }

    #[test]
    fn test_broken_manifest_names_project() {
        let file: ReactorFile = serde_json::from_str(
            r#"{"projects": [{"id": "org.example:broken",
                "manifests": [{"Bundle-SymbolicName": "broken", "Bundle-Version": "not.a.version"}]}]}"#,
        )
        .unwrap();

        let err = file.into_projects(false).unwrap_err();
        assert!(err.to_string().contains("org.example:broken"));
    }
}
