//! Territory design problem instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Cluster, Customer, Location, PreferenceKind};
use crate::distance::{DistanceTime, TravelMatrix};
use crate::error::ProblemError;

/// How a cluster's quantity outside `[min, max]` is penalised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityViolationType {
    /// `max(0, min - q, q - max)`.
    #[default]
    Linear,
    /// The linear violation squared.
    Square,
}

/// Immutable input to a solve: customers, clusters and the travel matrix.
///
/// The travel matrix is reference-counted so sub-problems built by the
/// splitter share it instead of copying.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
///
/// let matrix = Arc::new(TravelMatrix::euclidean(&[(0.0, 0.0), (3.0, 4.0)], 1.0));
/// let customers = vec![
///     Customer::new(Location::xy(0, 0.0, 0.0)),
///     Customer::new(Location::xy(1, 3.0, 4.0)),
/// ];
/// let problem = Problem::new(customers, vec![Cluster::new(0.0, 2.0)], matrix).unwrap();
///
/// let cost = problem.travel_cost(None, problem.customer(0).location(), problem.customer(1));
/// assert!((cost - 5.0).abs() < 1e-10);
/// assert_eq!(problem.quantity_violation(problem.cluster(0), 3.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Problem {
    customers: Vec<Customer>,
    clusters: Vec<Cluster>,
    matrix: Arc<TravelMatrix>,
    violation_type: QuantityViolationType,
}

impl Problem {
    /// Creates a problem, checking that every referenced index exists.
    pub fn new(
        customers: Vec<Customer>,
        clusters: Vec<Cluster>,
        matrix: Arc<TravelMatrix>,
    ) -> Result<Self, ProblemError> {
        let n = matrix.size();
        let check = |owner: String, loc: &Location| {
            if loc.index() >= n {
                Err(ProblemError::LocationOutOfBounds {
                    owner,
                    index: loc.index(),
                    matrix_size: n,
                })
            } else {
                Ok(())
            }
        };

        for (i, c) in customers.iter().enumerate() {
            check(format!("customer {i}"), c.location())?;
            if !c.quantity().is_finite() || c.quantity() < 0.0 {
                return Err(ProblemError::InvalidQuantity { customer: i });
            }
            if let Some(p) = c.preference() {
                if p.cluster >= clusters.len() {
                    return Err(ProblemError::PreferredClusterOutOfBounds {
                        customer: i,
                        cluster: p.cluster,
                        nb_clusters: clusters.len(),
                    });
                }
            }
        }
        for (i, c) in clusters.iter().enumerate() {
            if let Some(loc) = c.fixed_centre() {
                check(format!("cluster {i} fixed centre"), loc)?;
            }
            if let Some(t) = c.target() {
                check(format!("cluster {i} target centre"), &t.location)?;
            }
        }

        Ok(Self {
            customers,
            clusters,
            matrix,
            violation_type: QuantityViolationType::Linear,
        })
    }

    /// Sets the quantity violation function.
    pub fn with_violation_type(mut self, violation_type: QuantityViolationType) -> Self {
        self.violation_type = violation_type;
        self
    }

    /// All customers in index order.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// All clusters in index order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Customer at `index`.
    pub fn customer(&self, index: usize) -> &Customer {
        &self.customers[index]
    }

    /// Cluster at `index`.
    pub fn cluster(&self, index: usize) -> &Cluster {
        &self.clusters[index]
    }

    /// Number of customers.
    pub fn nb_customers(&self) -> usize {
        self.customers.len()
    }

    /// Number of clusters.
    pub fn nb_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// `true` when there is nothing to assign or nowhere to assign it.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty() || self.clusters.is_empty()
    }

    /// Shared travel matrix.
    pub fn travel_matrix(&self) -> &Arc<TravelMatrix> {
        &self.matrix
    }

    /// Quantity violation function in use.
    pub fn violation_type(&self) -> QuantityViolationType {
        self.violation_type
    }

    /// Sum of all customer quantities.
    pub fn total_quantity(&self) -> f64 {
        self.customers.iter().map(|c| c.quantity()).sum()
    }

    /// Raw travel from `from` to the customer.
    pub fn travel(&self, from: &Location, customer: &Customer) -> DistanceTime {
        self.matrix.get(from.index(), customer.location().index())
    }

    /// Cost of serving `customer` from a centre at `from`.
    ///
    /// When `assigned` is the customer's preferred cluster and the preference
    /// is a multiplier, the cost is scaled by it. Flat penalties are not part
    /// of this cost; see [`Problem::preference_penalty`].
    pub fn travel_cost(&self, assigned: Option<usize>, from: &Location, customer: &Customer) -> f64 {
        let dt = self.travel(from, customer);
        let cost =
            dt.distance * customer.cost_per_unit_distance() + dt.time * customer.cost_per_unit_time();
        match (assigned, customer.preference()) {
            (Some(cluster), Some(p)) if p.cluster == cluster => match p.kind {
                PreferenceKind::Multiplier(m) => cost * m,
                PreferenceKind::Penalty(_) => cost,
            },
            _ => cost,
        }
    }

    /// Flat penalty for assigning `customer` to `cluster` instead of its
    /// preferred one. Zero when there is no penalty-type preference.
    pub fn preference_penalty(&self, cluster: usize, customer: &Customer) -> f64 {
        match customer.preference() {
            Some(p) if p.cluster != cluster => match p.kind {
                PreferenceKind::Penalty(penalty) => penalty,
                PreferenceKind::Multiplier(_) => 0.0,
            },
            _ => 0.0,
        }
    }

    /// Cost of the centre drifting away from the cluster's target.
    ///
    /// Zero when there is no centre or no target.
    pub fn target_to_centre_cost(&self, centre: Option<&Location>, cluster: &Cluster) -> f64 {
        match (centre, cluster.target()) {
            (Some(centre), Some(target)) => {
                let dt = self.matrix.get(target.location.index(), centre.index());
                target.cost_per_unit_distance * dt.distance + target.cost_per_unit_time * dt.time
            }
            _ => 0.0,
        }
    }

    /// Violation of the cluster's quantity bounds at total `quantity`.
    pub fn quantity_violation(&self, cluster: &Cluster, quantity: f64) -> f64 {
        let linear = (cluster.min_quantity() - quantity)
            .max(quantity - cluster.max_quantity())
            .max(0.0);
        match self.violation_type {
            QuantityViolationType::Linear => linear,
            QuantityViolationType::Square => linear * linear,
        }
    }
}
