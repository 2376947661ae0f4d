//! Domain model types for territory design problems.
//!
//! Provides the immutable input of a solve: customers with quantities and
//! cost rates, clusters with quantity bounds and optional fixed or target
//! centres, locations that index into the travel matrix, and the problem
//! that ties them together.

mod cluster;
mod customer;
mod location;
mod problem;

pub use cluster::{Cluster, TargetCentre};
pub use customer::{ClusterPreference, Customer, PreferenceKind};
pub use location::{Coordinates, Location};
pub use problem::{Problem, QuantityViolationType};
