//! Error types for configuration and problem input.
//!
//! Both enums are returned from constructors only. Once a [`Problem`] and a
//! [`Solver`] exist, the search itself cannot fail: broken internal
//! bookkeeping panics instead of returning an error.
//!
//! [`Problem`]: crate::models::Problem
//! [`Solver`]: crate::solver::Solver

use std::fmt::{self, Display};

/// A configuration value that the search cannot run with.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A ruin weight is negative.
    NegativeRuinWeight {
        /// Name of the offending weight.
        name: &'static str,
        /// The value supplied.
        value: f64,
    },
    /// A fraction range is outside `[0, 1]` or has `min > max`.
    InvalidFractionRange {
        /// Name of the offending range.
        name: &'static str,
        /// Lower bound supplied.
        min: f64,
        /// Upper bound supplied.
        max: f64,
    },
    /// The weight-based assigner's minimum step size is not positive.
    NonPositiveStepSize(f64),
    /// The weight-based assigner's step growth factor is not above 1.
    StepMultiplierTooSmall(f64),
    /// The weight-based assigner was given zero balancing iterations.
    NonPositiveIterations(usize),
    /// The multiplier bounds are inverted or not positive.
    InvalidMultiplierRange {
        /// Lower bound supplied.
        min: f64,
        /// Upper bound supplied.
        max: f64,
    },
    /// A probability is outside `[0, 1]`.
    InvalidProbability {
        /// Name of the offending probability.
        name: &'static str,
        /// The value supplied.
        value: f64,
    },
    /// The centre selector's selectivity is not positive.
    NonPositiveSelectivity(f64),
    /// The travel-target fraction is not in `(0, 1]`.
    InvalidTravelTargetFraction(f64),
    /// Splitter fractions of the average are not positive or are inverted.
    InvalidSplitterFractions {
        /// Lower fraction supplied.
        min: f64,
        /// Upper fraction supplied.
        max: f64,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeRuinWeight { name, value } => {
                write!(f, "ruin weight '{name}' must be non-negative, got {value}")
            }
            Self::InvalidFractionRange { name, min, max } => write!(
                f,
                "fraction range '{name}' must satisfy 0 <= min <= max <= 1, got [{min}, {max}]"
            ),
            Self::NonPositiveStepSize(v) => write!(f, "min_step_size must be positive, got {v}"),
            Self::StepMultiplierTooSmall(v) => {
                write!(f, "step_size_multiplier must be greater than 1, got {v}")
            }
            Self::NonPositiveIterations(n) => {
                write!(f, "nb_iterations must be positive, got {n}")
            }
            Self::InvalidMultiplierRange { min, max } => write!(
                f,
                "multiplier range must satisfy 0 < min <= max, got [{min}, {max}]"
            ),
            Self::InvalidProbability { name, value } => {
                write!(f, "probability '{name}' must be in [0, 1], got {value}")
            }
            Self::NonPositiveSelectivity(v) => {
                write!(f, "best_candidate_selectivity must be positive, got {v}")
            }
            Self::InvalidTravelTargetFraction(v) => write!(
                f,
                "travel_target_improvement_fraction must be in (0, 1], got {v}"
            ),
            Self::InvalidSplitterFractions { min, max } => write!(
                f,
                "splitter fractions must satisfy 0 < min <= max, got [{min}, {max}]"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Problem input that refers to data which does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    /// A location index is not covered by the travel matrix.
    LocationOutOfBounds {
        /// What the location belongs to, e.g. `"customer 3"`.
        owner: String,
        /// The offending location index.
        index: usize,
        /// Number of locations in the travel matrix.
        matrix_size: usize,
    },
    /// A customer prefers a cluster that does not exist.
    PreferredClusterOutOfBounds {
        /// Customer index.
        customer: usize,
        /// The preferred cluster index.
        cluster: usize,
        /// Number of clusters in the problem.
        nb_clusters: usize,
    },
    /// A customer has a negative or non-finite quantity.
    InvalidQuantity {
        /// Customer index.
        customer: usize,
    },
}

impl Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationOutOfBounds {
                owner,
                index,
                matrix_size,
            } => write!(
                f,
                "{owner} uses location index {index} but the travel matrix has {matrix_size} locations"
            ),
            Self::PreferredClusterOutOfBounds {
                customer,
                cluster,
                nb_clusters,
            } => write!(
                f,
                "customer {customer} prefers cluster {cluster} but the problem has {nb_clusters} clusters"
            ),
            Self::InvalidQuantity { customer } => {
                write!(f, "customer {customer} has a negative or non-finite quantity")
            }
        }
    }
}

impl std::error::Error for ProblemError {}
