//! Constructive heuristics for building initial territory assignments.
//!
//! - [`CentreSelector`] — Randomised farthest-first seeding with target pull, O(p·n log n)
//! - [`WeightBasedAssignment`] — Multiplier line search balancing cluster quantities, O(p²·n)
//!
//! The two are chained: seed centres, then assign customers around them.

mod centre_selector;
mod weight_based;

pub use centre_selector::{CentreSelector, CentreSelectorConfig};
pub use weight_based::{WeightBasedAssignment, WeightBasedConfig};
