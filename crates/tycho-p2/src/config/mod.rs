//! Resolver configuration.
//!
//! Values are merged from several sources, highest priority first:
//!
//! 1. Environment variables (`TYCHO_*`)
//! 2. The JSON configuration file
//! 3. Built-in defaults
//!
//! The source of every value is recorded and can be queried with
//! [`ResolverConfig::get_source`].

#[allow(clippy::module_inception)]
mod config;
mod source;

pub use config::{running_environment, RepositoryLocation, ResolverConfig, ResolverKind};
pub use source::{ConfigLoader, ConfigSource, RawConfig};
