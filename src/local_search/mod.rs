//! Local search operators for improving territory assignments.
//!
//! - [`LocalSearch::run_single_step`] — Nearest-cluster moves/swaps plus nearest-customer moves
//! - [`LocalSearch::assign_unassigned`] — Greedy best-cluster insertion
//! - [`Interrupt`] — Cooperative cancellation polled inside long passes

mod config;
mod inter_cluster;
mod interrupt;
mod nearest;
mod search;

pub use config::{LocalSearchConfig, LocalSearchHeuristic};
pub use interrupt::{Interrupt, NeverInterrupt, POLL_INTERVAL};
pub use search::LocalSearch;
