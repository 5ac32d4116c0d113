//! p2 metadata translation and resolution.
//!
//! Bundles, features and products are translated into installable units,
//! which are merged with external repositories into a target platform and
//! resolved once per target environment with a SAT solver.

pub mod artifact;
pub mod config;
pub mod error;
pub mod metadata;
pub mod publisher;
pub mod repository;
pub mod resolver;
pub mod solver;
pub mod status;
pub mod target;

pub use config::ResolverConfig;
pub use error::{DuplicateUnit, P2Error, Result};
pub use metadata::{
    ArtifactKey, Capability, Filter, InstallableUnit, InstallableUnitBuilder, Requirement,
    SelectionContext, UnitKey,
};
pub use publisher::{BundleTranslator, FeatureTranslator, ProductTranslator, TranslationResult};
pub use resolver::{DependencyCollector, Projector};
pub use status::{Severity, Status};
pub use target::{
    ResolutionResult, TargetEnvironment, TargetPlatform, TargetPlatformAssembler,
    TargetPlatformStage,
};
pub use tycho_version::{MatchRule, Version, VersionRange};
