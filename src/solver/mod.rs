//! The territory design metaheuristic.
//!
//! - [`Solver`] — Construction, local search, ruin-and-recreate and problem splitting
//! - [`SolutionBank`] — Best solution per comparator slot, with provenance [`Tags`]
//! - [`ContinueOption`] / [`SolverStateSummary`] — Progress callback protocol

mod bank;
mod config;
mod engine;
mod progress;
mod tags;

pub use bank::SolutionBank;
pub use config::{SolutionBankConfig, SolverConfig};
pub(crate) use engine::construct_weighted_then_improve;
pub use engine::Solver;
pub use progress::{ContinueCallback, ContinueOption, SolverStateSummary, TimingStats};
pub use tags::{Tag, Tags};
