//! Two-component solution cost with tolerance-aware ordering.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Relative and absolute tolerance used by [`approx_eq`].
pub const ROUNDOFF_TOLERANCE: f64 = 1e-9;

/// Returns `true` if `a` and `b` are equal up to accumulated rounding error.
///
/// Two NaNs are equal to each other and to nothing else. Values both smaller
/// than the absolute tolerance are equal. If either value is exactly zero the
/// difference is compared against the tolerance directly; otherwise the
/// difference must be within the tolerance relative to both values.
///
/// # Examples
///
/// ```
/// use u_territory::evaluation::approx_eq;
///
/// assert!(approx_eq(1000.0, 1000.0 + 1e-8));
/// assert!(!approx_eq(1.0, 1.001));
/// assert!(approx_eq(1e-12, -1e-12));
/// ```
pub fn approx_eq(a: f64, b: f64) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    if b.is_nan() {
        return false;
    }
    if a.abs() < ROUNDOFF_TOLERANCE && b.abs() < ROUNDOFF_TOLERANCE {
        return true;
    }

    let diff = (a - b).abs();
    if a == 0.0 || b == 0.0 {
        return diff < ROUNDOFF_TOLERANCE;
    }
    !(diff > a.abs() * ROUNDOFF_TOLERANCE || diff > b.abs() * ROUNDOFF_TOLERANCE)
}

/// Cost of a cluster or a whole solution.
///
/// Quantity violation is the primary objective and travel the secondary one.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use u_territory::evaluation::Cost;
///
/// let balanced = Cost::new(500.0, 0.0);
/// let cheap = Cost::new(100.0, 2.0);
/// assert_eq!(balanced.approx_cmp(&cheap), Ordering::Less);
///
/// let mut total = Cost::zero();
/// total += balanced;
/// total += cheap;
/// assert_eq!(total, Cost::new(600.0, 2.0));
/// assert_eq!(total.to_string(), "trv=600.000, qv=2.000");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    /// Centre-to-customer travel plus target drift and preference penalties.
    pub travel: f64,
    /// Sum of cluster quantity violations.
    pub quantity_violation: f64,
}

impl Cost {
    /// Creates a cost.
    pub fn new(travel: f64, quantity_violation: f64) -> Self {
        Self {
            travel,
            quantity_violation,
        }
    }

    /// The zero cost.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sentinel worse than any real cost.
    pub fn max() -> Self {
        Self::new(f64::MAX, f64::MAX)
    }

    /// `true` if this is the [`Cost::max`] sentinel.
    pub fn is_max(&self) -> bool {
        self.quantity_violation == f64::MAX
    }

    /// Exact lexicographic ordering, quantity violation first.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.quantity_violation
            .total_cmp(&other.quantity_violation)
            .then_with(|| self.travel.total_cmp(&other.travel))
    }

    /// Ordering that treats costs within rounding tolerance as equal.
    pub fn approx_cmp(&self, other: &Self) -> Ordering {
        if !approx_eq(self.quantity_violation, other.quantity_violation) {
            return if self.quantity_violation < other.quantity_violation {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if !approx_eq(self.travel, other.travel) {
            return if self.travel < other.travel {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        Ordering::Equal
    }

    /// `true` if both components are within rounding tolerance.
    pub fn approx_eq(&self, other: &Self) -> bool {
        approx_eq(self.quantity_violation, other.quantity_violation)
            && approx_eq(self.travel, other.travel)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        self.travel += rhs.travel;
        self.quantity_violation += rhs.quantity_violation;
    }
}

impl SubAssign for Cost {
    fn sub_assign(&mut self, rhs: Self) {
        self.travel -= rhs.travel;
        self.quantity_violation -= rhs.quantity_violation;
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(mut self, rhs: Self) -> Cost {
        self += rhs;
        self
    }
}

impl Sub for Cost {
    type Output = Cost;

    fn sub(mut self, rhs: Self) -> Cost {
        self -= rhs;
        self
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trv={:.3}, qv={:.3}", self.travel, self.quantity_violation)
    }
}
