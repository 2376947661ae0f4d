//! Solution cost and its comparison rules.

mod comparator;
mod cost;

pub use comparator::CostComparator;
pub use cost::{approx_eq, Cost, ROUNDOFF_TOLERANCE};
