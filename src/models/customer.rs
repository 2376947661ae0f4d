//! Customer and cluster-preference types.

use serde::{Deserialize, Serialize};

use super::Location;

/// How a customer's preference for one cluster changes its travel cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PreferenceKind {
    /// Travel cost is multiplied by this factor when the customer is
    /// assigned to its preferred cluster.
    Multiplier(f64),
    /// Flat cost added when the customer is assigned to any other cluster.
    Penalty(f64),
}

/// A customer's preferred cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterPreference {
    /// Index of the preferred cluster.
    pub cluster: usize,
    /// Effect of the preference.
    pub kind: PreferenceKind,
}

/// A weighted demand point to be assigned to a cluster.
///
/// Travel cost from a cluster centre to the customer is
/// `distance * cost_per_unit_distance + time * cost_per_unit_time`.
///
/// # Examples
///
/// ```
/// use u_territory::models::{Customer, Location};
///
/// let c = Customer::new(Location::new(0));
/// assert_eq!(c.quantity(), 1.0);
/// assert_eq!(c.cost_per_unit_distance(), 0.0);
/// assert_eq!(c.cost_per_unit_time(), 1.0);
///
/// let c = c.with_quantity(7.5).with_preferred_multiplier(2, 0.5);
/// assert_eq!(c.quantity(), 7.5);
/// assert_eq!(c.preference().map(|p| p.cluster), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    location: Location,
    quantity: f64,
    cost_per_unit_distance: f64,
    cost_per_unit_time: f64,
    preference: Option<ClusterPreference>,
}

impl Customer {
    /// Creates a customer with quantity 1 whose cost is travel time only.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            quantity: 1.0,
            cost_per_unit_distance: 0.0,
            cost_per_unit_time: 1.0,
            preference: None,
        }
    }

    /// Sets the demand quantity.
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets cost per unit distance.
    pub fn with_cost_per_unit_distance(mut self, cost: f64) -> Self {
        self.cost_per_unit_distance = cost;
        self
    }

    /// Sets cost per unit time.
    pub fn with_cost_per_unit_time(mut self, cost: f64) -> Self {
        self.cost_per_unit_time = cost;
        self
    }

    /// Prefers `cluster`, scaling travel cost by `multiplier` when assigned to it.
    pub fn with_preferred_multiplier(self, cluster: usize, multiplier: f64) -> Self {
        self.with_preference(Some(ClusterPreference {
            cluster,
            kind: PreferenceKind::Multiplier(multiplier),
        }))
    }

    /// Prefers `cluster`, charging `penalty` when assigned anywhere else.
    pub fn with_preferred_penalty(self, cluster: usize, penalty: f64) -> Self {
        self.with_preference(Some(ClusterPreference {
            cluster,
            kind: PreferenceKind::Penalty(penalty),
        }))
    }

    /// Replaces the cluster preference.
    pub fn with_preference(mut self, preference: Option<ClusterPreference>) -> Self {
        self.preference = preference;
        self
    }

    /// Customer location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Demand quantity.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Cost per unit distance.
    pub fn cost_per_unit_distance(&self) -> f64 {
        self.cost_per_unit_distance
    }

    /// Cost per unit time.
    pub fn cost_per_unit_time(&self) -> f64 {
        self.cost_per_unit_time
    }

    /// Preferred cluster, if any.
    pub fn preference(&self) -> Option<&ClusterPreference> {
        self.preference.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Customer::new(Location::new(3));
        assert_eq!(c.location().index(), 3);
        assert_eq!(c.quantity(), 1.0);
        assert!(c.preference().is_none());
    }

    #[test]
    fn test_penalty_preference() {
        let c = Customer::new(Location::new(0)).with_preferred_penalty(1, 10.0);
        let p = c.preference().expect("preference set");
        assert_eq!(p.cluster, 1);
        assert_eq!(p.kind, PreferenceKind::Penalty(10.0));
    }

    #[test]
    fn test_clear_preference() {
        let c = Customer::new(Location::new(0))
            .with_preferred_multiplier(1, 0.5)
            .with_preference(None);
        assert!(c.preference().is_none());
    }
}
