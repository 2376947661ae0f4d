//! Solution representations.
//!
//! - [`MutableSolution`]: incrementally evaluated, used by every heuristic
//! - [`ImmutableSolution`]: owned snapshot returned to callers

mod immutable;
mod mutable;

pub use immutable::{ClusterSummary, ImmutableSolution};
pub use mutable::MutableSolution;
