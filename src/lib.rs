//! # u-territory
//!
//! Capacitated territory design: partitions customers into a fixed number
//! of clusters so that every cluster's quantity stays within its bounds and
//! the travel cost from each cluster centre to its customers is minimised.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Location, Customer, Cluster, Problem)
//! - [`distance`] — Travel matrix and closest-neighbour index
//! - [`evaluation`] — Cost and search comparators
//! - [`solution`] — Incrementally evaluated and snapshot solutions
//! - [`constructive`] — Centre selection and weight-based assignment
//! - [`local_search`] — Nearest-cluster moves/swaps and nearest-customer moves
//! - [`ruin`] — Ruin operator for ruin-and-recreate
//! - [`split`] — Decomposition into independent sub-problems
//! - [`solver`] — Outer metaheuristic with solution bank and progress callback
//! - [`error`] — Configuration and input errors

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod ruin;
pub mod solution;
pub mod solver;
pub mod split;

#[cfg(test)]
mod testing;
