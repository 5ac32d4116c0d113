//! Translation of product descriptors.

use serde::{Deserialize, Serialize};
use tycho_version::{Version, VersionRange};

use crate::error::{P2Error, Result};
use crate::metadata::namespace::*;
use crate::metadata::{InstallableUnit, Requirement};

use super::advice::{AdviceContext, AdviceSet};
use super::bundle::{update_range, TranslationResult};
use super::feature::GROUP_SUFFIX;

pub const EXECUTABLE_FEATURE: &str = "org.eclipse.equinox.executable";
pub const LAUNCHER_BUNDLE: &str = "org.eclipse.equinox.launcher";

/// Which parts of the descriptor define the product content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductContentType {
    #[default]
    Bundles,
    Features,
    Mixed,
}

impl ProductContentType {
    fn includes_features(self) -> bool {
        matches!(self, ProductContentType::Features | ProductContentType::Mixed)
    }

    fn includes_bundles(self) -> bool {
        matches!(self, ProductContentType::Bundles | ProductContentType::Mixed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallMode {
    #[default]
    Include,
    /// Installed next to the product so it can be updated independently
    Root,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFeature {
    pub id: String,
    pub version: Option<String>,
    pub install_mode: InstallMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPlugin {
    pub id: String,
    pub version: Option<String>,
    pub fragment: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDescriptor {
    pub id: String,
    pub version: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ProductContentType,
    pub features: Vec<ProductFeature>,
    pub plugins: Vec<ProductPlugin>,
    pub include_launchers: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductTranslator {
    advice: AdviceSet,
}

impl ProductTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advice(mut self, advice: AdviceSet) -> Self {
        self.advice = advice;
        self
    }

    pub fn translate(&self, product: &ProductDescriptor) -> Result<TranslationResult> {
        if product.id.is_empty() {
            return Err(P2Error::translation("product", "missing product id"));
        }
        let origin = product.id.as_str();
        let version = parse_version(origin, Some(&product.version))?;
        log::debug!(
            "Translating {:?} based product {} {}",
            product.content_type,
            product.id,
            version
        );

        let mut builder = InstallableUnit::builder(product.id.clone(), version.clone());
        builder.set_property(PROP_TYPE_PRODUCT, "true");
        builder.set_property(PROP_TYPE_GROUP, "true");
        if let Some(name) = &product.name {
            builder.set_property(PROP_NAME, name.clone());
        }
        builder.set_update_range(update_range(&version));

        if product.content_type.includes_features() {
            for feature in &product.features {
                let range = reference_range(origin, feature.version.as_deref())?;
                builder.add_requirement(Requirement::new(
                    IU,
                    format!("{}{}", feature.id, GROUP_SUFFIX),
                    range,
                ));
            }

            let roots: Vec<&str> = product
                .features
                .iter()
                .filter(|f| f.install_mode == InstallMode::Root)
                .map(|f| f.id.as_str())
                .collect();
            if !roots.is_empty() {
                builder.set_property(PROP_ROOT_FEATURES, roots.join(","));
            }
        }

        if product.content_type.includes_bundles() {
            for plugin in &product.plugins {
                let range = reference_range(origin, plugin.version.as_deref())?;
                builder.add_requirement(Requirement::new(IU, plugin.id.clone(), range));
            }
        }

        if product.include_launchers {
            builder.add_requirement(Requirement::new(
                IU,
                format!("{}{}", EXECUTABLE_FEATURE, GROUP_SUFFIX),
                VersionRange::any(),
            ));
            if product.content_type == ProductContentType::Bundles {
                builder.add_requirement(Requirement::new(IU, LAUNCHER_BUNDLE, VersionRange::any()));
            }
        }

        let patch = self.advice.patch_for(&AdviceContext::new(origin, &version));
        patch.apply_to(&mut builder);

        Ok(TranslationResult {
            primary: builder.build(),
            secondary: Vec::new(),
            artifact_properties: patch.artifact_properties,
        })
    }
}

fn parse_version(origin: &str, text: Option<&str>) -> Result<Version> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => Version::parse(text).map_err(|e| P2Error::translation(origin, e.to_string())),
        None => Ok(Version::ZERO),
    }
}

fn reference_range(origin: &str, text: Option<&str>) -> Result<VersionRange> {
    Ok(VersionRange::for_reference(&parse_version(origin, text)?))
}
