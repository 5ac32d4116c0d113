//! SAT-based resolver for installable units.
//!
//! # Architecture
//!
//! - [`Pool`]: registry of the units taking part in one solve
//! - [`Request`]: root units, extra requirements and the selection context
//! - [`RuleSet`]: clauses generated from the reachable unit graph
//! - [`Solver`]: unit propagation plus branching over providers
//! - [`ProblemSet`]: explanation of a failed solve
//!
//! # Example
//!
//! ```ignore
//! use tycho_p2::solver::{Policy, Pool, Request, Solver};
//!
//! let pool = Pool::from_units(&units);
//! let mut request = Request::new(context);
//! request.fix(root.key());
//!
//! let policy = Policy::default();
//! match Solver::new(&pool, &policy).solve(&request) {
//!     Ok(selected) => println!("{} units", selected.len()),
//!     Err(problems) => println!("{}", problems),
//! }
//! ```

mod decisions;
mod policy;
mod pool;
mod problem;
mod request;
mod rule;
mod rule_generator;
mod rule_set;
#[allow(clippy::module_inception)]
mod solver;
mod watch_graph;


pub use decisions::Decisions;
pub use policy::Policy;
pub use pool::{Pool, UnitId};
pub use problem::{Problem, ProblemRule, ProblemSet};
pub use request::Request;
pub use rule::{Literal, Rule, RuleType};
pub use rule_generator::RuleGenerator;
pub use rule_set::{RuleSet, RuleSetStats};
pub use solver::Solver;
pub use watch_graph::WatchGraph;
