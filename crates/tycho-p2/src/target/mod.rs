//! Target platform assembly and per-environment resolution.
//!
//! The assembler merges external metadata repositories, the units published
//! by reactor projects, execution environment units and, in the final
//! stage, pom dependency units. Each reactor project is then resolved once
//! per configured [`TargetEnvironment`]; the environments fail or succeed
//! independently.

mod assembler;
pub mod ee;
mod environment;
mod platform;
mod reactor;
mod result;

pub use assembler::{EnvironmentResults, TargetPlatformAssembler};
pub use ee::{
    AllKnownEEsResolutionHints, ExecutionEnvironment, ExecutionEnvironmentResolutionHints,
    StandardEEResolutionHints,
};
pub use environment::TargetEnvironment;
pub use platform::{TargetPlatform, TargetPlatformStage};
pub use reactor::{ReactorArtifacts, ReactorProject};
pub use result::{ArtifactEntry, ResolutionResult};
