//! Read-only solution snapshot handed back to callers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::MutableSolution;
use crate::evaluation::Cost;
use crate::models::{Location, Problem};

/// Per-cluster view of a solved assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    customers: Vec<usize>,
    centre: Option<Location>,
    quantity: f64,
    cost: Cost,
}

impl ClusterSummary {
    /// Customers assigned to this cluster.
    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    /// Number of assigned customers.
    pub fn nb_customers(&self) -> usize {
        self.customers.len()
    }

    /// Centre location, `None` for an empty cluster without a fixed centre.
    pub fn centre(&self) -> Option<&Location> {
        self.centre.as_ref()
    }

    /// Total assigned quantity.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Cluster cost.
    pub fn cost(&self) -> Cost {
        self.cost
    }
}

/// Owned snapshot of a [`MutableSolution`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
/// use u_territory::solution::MutableSolution;
///
/// let matrix = Arc::new(TravelMatrix::euclidean(&[(0.0, 0.0), (2.0, 0.0)], 1.0));
/// let customers = (0..2).map(|i| Customer::new(Location::new(i))).collect();
/// let problem = Arc::new(Problem::new(customers, vec![Cluster::new(0.0, 2.0)], matrix).unwrap());
///
/// let snap = MutableSolution::new(problem, Some(&[Some(0), None])).snapshot();
/// assert_eq!(snap.nb_unassigned(), 1);
/// assert_eq!(snap.cluster(0).customers(), &[0]);
/// assert_eq!(snap.cluster(0).centre().map(|l| l.index()), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmutableSolution {
    assignment: Vec<Option<usize>>,
    clusters: Vec<ClusterSummary>,
    cost: Cost,
}

impl ImmutableSolution {
    pub(crate) fn from_mutable(sol: &MutableSolution) -> Self {
        let clusters = (0..sol.nb_clusters())
            .map(|c| ClusterSummary {
                customers: sol.customers_of(c).to_vec(),
                centre: sol.cluster_centre(c),
                quantity: sol.cluster_quantity(c),
                cost: sol.cluster_cost(c),
            })
            .collect();
        Self {
            assignment: sol.assignment(),
            clusters,
            cost: sol.cost(),
        }
    }

    /// Rebuilds an editable solution against `problem`.
    pub fn to_mutable(&self, problem: Arc<Problem>) -> MutableSolution {
        MutableSolution::new(problem, Some(&self.assignment))
    }

    /// Total cost.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Cluster of every customer.
    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    /// Cluster of one customer.
    pub fn cluster_of(&self, customer: usize) -> Option<usize> {
        self.assignment[customer]
    }

    /// Number of unassigned customers.
    pub fn nb_unassigned(&self) -> usize {
        self.assignment.iter().filter(|c| c.is_none()).count()
    }

    /// Number of clusters.
    pub fn nb_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Summary of one cluster.
    pub fn cluster(&self, index: usize) -> &ClusterSummary {
        &self.clusters[index]
    }

    /// Summaries of all clusters.
    pub fn clusters(&self) -> &[ClusterSummary] {
        &self.clusters
    }
}
