//! Travel data.
//!
//! Provides the dense distance/time matrix and the per-customer
//! closest-neighbour ranking derived from it.

mod closest;
mod matrix;

pub use closest::ClosestNeighbours;
pub use matrix::{DistanceTime, TravelMatrix};
