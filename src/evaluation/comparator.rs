//! Search objectives over [`Cost`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{approx_eq, Cost};

/// The ordering a search branch optimises.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use u_territory::evaluation::{Cost, CostComparator};
///
/// let tt = CostComparator::TargetTravel { target: 100.0 };
/// let under_target = Cost::new(90.0, 5.0);
/// let balanced = Cost::new(120.0, 0.0);
/// assert_eq!(tt.compare(&under_target, &balanced), Ordering::Less);
/// assert_eq!(CostComparator::Standard.compare(&under_target, &balanced), Ordering::Greater);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CostComparator {
    /// [`Cost::approx_cmp`]: quantity violation, then travel.
    Standard,
    /// Travel at or below `target` beats travel above it. Two costs below
    /// the target fall back to [`CostComparator::Standard`]; two above it
    /// prefer the smaller excess.
    TargetTravel {
        /// Travel threshold.
        target: f64,
    },
}

impl CostComparator {
    /// Compares `a` with `b`; `Less` means `a` is better.
    pub fn compare(&self, a: &Cost, b: &Cost) -> Ordering {
        match *self {
            Self::Standard => a.approx_cmp(b),
            Self::TargetTravel { target } => {
                let a_below = a.travel <= target;
                let b_below = b.travel <= target;
                match (a_below, b_below) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (true, true) => a.approx_cmp(b),
                    (false, false) => {
                        let a_excess = a.travel - target;
                        let b_excess = b.travel - target;
                        if approx_eq(a_excess, b_excess) {
                            a.approx_cmp(b)
                        } else if a_excess < b_excess {
                            Ordering::Less
                        } else {
                            Ordering::Greater
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_approx_cmp() {
        let a = Cost::new(10.0, 1.0);
        let b = Cost::new(10.0 + 1e-12, 1.0);
        assert_eq!(CostComparator::Standard.compare(&a, &b), Ordering::Equal);
        assert_eq!(
            CostComparator::Standard.compare(&a, &Cost::new(1.0, 2.0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_target_both_below_uses_standard() {
        let tt = CostComparator::TargetTravel { target: 50.0 };
        let a = Cost::new(40.0, 0.0);
        let b = Cost::new(30.0, 1.0);
        assert_eq!(tt.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_target_both_above_smaller_excess_wins() {
        let tt = CostComparator::TargetTravel { target: 50.0 };
        let a = Cost::new(55.0, 3.0);
        let b = Cost::new(70.0, 0.0);
        assert_eq!(tt.compare(&a, &b), Ordering::Less);
        assert_eq!(tt.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_infinite_target_is_standard() {
        let tt = CostComparator::TargetTravel {
            target: f64::INFINITY,
        };
        let a = Cost::new(70.0, 0.0);
        let b = Cost::new(55.0, 3.0);
        assert_eq!(tt.compare(&a, &b), Ordering::Less);
    }
}
