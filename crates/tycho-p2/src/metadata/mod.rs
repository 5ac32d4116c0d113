//! Installable unit metadata model.

mod artifact_key;
mod capability;
mod context;
mod filter;
pub mod namespace;
mod requirement;
mod unit;

pub use artifact_key::ArtifactKey;
pub use capability::Capability;
pub use context::SelectionContext;
pub use filter::{Filter, FilterProperties};
pub use requirement::{Requirement, RequirementMatch};
pub use unit::{InstallableUnit, InstallableUnitBuilder, UnitKey};
