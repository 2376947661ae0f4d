//! Cluster (territory) type.

use serde::{Deserialize, Serialize};

use super::Location;

/// A location a cluster's centre is pulled towards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetCentre {
    /// Target location.
    pub location: Location,
    /// Cost per unit distance between the target and the actual centre.
    pub cost_per_unit_distance: f64,
    /// Cost per unit time between the target and the actual centre.
    pub cost_per_unit_time: f64,
}

/// A capacity-bounded territory that customers are assigned to.
///
/// A cluster's centre is normally the assigned customer that minimises the
/// summed travel cost to the others. A fixed centre overrides this and
/// cannot move.
///
/// # Examples
///
/// ```
/// use u_territory::models::{Cluster, Location};
///
/// let c = Cluster::new(10.0, 20.0);
/// assert!(c.fixed_centre().is_none());
///
/// let c = c.with_target_centre(Location::new(5), 1.0, 0.0).with_fix_centre_to_target(true);
/// assert_eq!(c.fixed_centre().map(|l| l.index()), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    min_quantity: f64,
    max_quantity: f64,
    fixed_centre: Option<Location>,
    target: Option<TargetCentre>,
    fix_centre_to_target: bool,
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Cluster {
    /// Creates a cluster with the given quantity bounds.
    pub fn new(min_quantity: f64, max_quantity: f64) -> Self {
        Self {
            min_quantity,
            max_quantity,
            fixed_centre: None,
            target: None,
            fix_centre_to_target: false,
        }
    }

    /// Pins the centre to a location.
    pub fn with_fixed_centre(mut self, location: Location) -> Self {
        self.fixed_centre = Some(location);
        self
    }

    /// Sets a target centre and the cost rates for drifting away from it.
    pub fn with_target_centre(
        mut self,
        location: Location,
        cost_per_unit_distance: f64,
        cost_per_unit_time: f64,
    ) -> Self {
        self.target = Some(TargetCentre {
            location,
            cost_per_unit_distance,
            cost_per_unit_time,
        });
        self
    }

    /// When set, the target centre acts as a fixed centre.
    pub fn with_fix_centre_to_target(mut self, fix: bool) -> Self {
        self.fix_centre_to_target = fix;
        self
    }

    /// Replaces the quantity bounds.
    pub fn with_quantity_bounds(mut self, min_quantity: f64, max_quantity: f64) -> Self {
        self.min_quantity = min_quantity;
        self.max_quantity = max_quantity;
        self
    }

    /// Minimum total quantity.
    pub fn min_quantity(&self) -> f64 {
        self.min_quantity
    }

    /// Maximum total quantity.
    pub fn max_quantity(&self) -> f64 {
        self.max_quantity
    }

    /// The immovable centre, if any.
    ///
    /// An explicit fixed centre wins over a target marked as fixed.
    pub fn fixed_centre(&self) -> Option<&Location> {
        self.fixed_centre.as_ref().or_else(|| {
            if self.fix_centre_to_target {
                self.target.as_ref().map(|t| &t.location)
            } else {
                None
            }
        })
    }

    /// Target centre, if any.
    pub fn target(&self) -> Option<&TargetCentre> {
        self.target.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let c = Cluster::default();
        assert_eq!(c.min_quantity(), 0.0);
        assert_eq!(c.max_quantity(), 1.0);
    }

    #[test]
    fn test_explicit_fixed_centre_wins() {
        let c = Cluster::new(0.0, 1.0)
            .with_target_centre(Location::new(2), 1.0, 1.0)
            .with_fix_centre_to_target(true)
            .with_fixed_centre(Location::new(7));
        assert_eq!(c.fixed_centre().map(|l| l.index()), Some(7));
    }

    #[test]
    fn test_target_not_fixed_by_default() {
        let c = Cluster::new(0.0, 1.0).with_target_centre(Location::new(2), 1.0, 1.0);
        assert!(c.fixed_centre().is_none());
        assert!(c.target().is_some());
    }
}
