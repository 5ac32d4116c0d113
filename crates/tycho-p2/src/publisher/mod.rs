//! Translators turning bundles, features and products into installable
//! units.
//!
//! Every translator produces one primary unit plus secondary units such
//! as localization fragments, configuration fragments and feature jars.

pub mod advice;
mod bundle;
mod feature;
pub mod manifest;
mod product;

pub use advice::{Advice, AdviceContext, AdviceKind, AdvicePatch, AdviceSet};
pub use bundle::{
    update_range, BundleDescription, BundleShape, BundleTranslator, TranslationResult,
    DEFAULT_FLAVOR,
};
pub use feature::{
    FeatureDescriptor, FeatureEntry, FeatureImport, FeatureTranslator, ImportKind, GROUP_SUFFIX,
    JAR_SUFFIX,
};
pub use manifest::{Manifest, ManifestElement};
pub use product::{
    InstallMode, ProductContentType, ProductDescriptor, ProductFeature, ProductPlugin,
    ProductTranslator, EXECUTABLE_FEATURE, LAUNCHER_BUNDLE,
};
