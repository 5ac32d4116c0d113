//! Resolution strategies over a unit universe.
//!
//! [`DependencyCollector`] gathers the full reachable closure, [`Projector`]
//! selects one consistent set per selection context.

mod collector;
mod projector;
pub mod swt;

pub use collector::DependencyCollector;
pub use projector::Projector;
