//! OSGi versioning library compatible with Equinox p2
//!
//! This crate provides version parsing, comparison, version ranges and the
//! feature `match` rules used when translating feature and product
//! descriptors into p2 requirements.

mod error;
mod match_rule;
mod range;
mod version;

pub use error::VersionError;
pub use match_rule::MatchRule;
pub use range::VersionRange;
pub use version::Version;
