//! Incrementally evaluated customer-to-cluster assignment.
//!
//! # Algorithm
//!
//! Every assigned customer caches the travel cost its cluster would have if
//! that customer were the centre (the sum of its travel cost to every other
//! customer in the cluster). Moving one customer updates these sums for the
//! two affected clusters only, re-selects their centres, and adjusts the
//! running total by subtracting the old cluster costs and adding the new
//! ones.
//!
//! # Complexity
//!
//! O(m) per move where m = customers in the two affected clusters.
//! [`MutableSolution::update`] is O(Σ m²).

use std::sync::Arc;

use super::ImmutableSolution;
use crate::evaluation::Cost;
use crate::models::{Location, Problem};

#[derive(Debug, Clone, Default)]
struct CustomerRecord {
    cluster: Option<usize>,
    travel_if_centre: f64,
}

#[derive(Debug, Clone, Default)]
struct ClusterRecord {
    cost: Cost,
    quantity: f64,
    central_customer: Option<usize>,
    customers: Vec<usize>,
    fixed_centre_travel: f64,
    preference_penalty: f64,
}

/// A solution whose cost is kept up to date as customers move.
///
/// Incremental updates accumulate floating-point drift;
/// [`MutableSolution::update`] recomputes everything from scratch and is the
/// canonical cost.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
/// use u_territory::solution::MutableSolution;
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (10.0, 0.0)];
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..3).map(|i| Customer::new(Location::new(i))).collect();
/// let clusters = vec![Cluster::new(0.0, 3.0), Cluster::new(0.0, 3.0)];
/// let problem = Arc::new(Problem::new(customers, clusters, matrix).unwrap());
///
/// let mut sol = MutableSolution::new(problem, Some(&[Some(0), Some(0), Some(1)]));
/// assert!((sol.cost().travel - 1.0).abs() < 1e-10);
///
/// let what_if = sol.evaluate_set(2, Some(0));
/// assert!((what_if.travel - 11.0).abs() < 1e-10);
/// assert_eq!(sol.cluster_of(2), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct MutableSolution {
    problem: Arc<Problem>,
    cost: Cost,
    customers: Vec<CustomerRecord>,
    clusters: Vec<ClusterRecord>,
}

impl MutableSolution {
    /// Creates a solution from an optional assignment and evaluates it.
    ///
    /// # Panics
    ///
    /// Panics if the assignment length differs from the customer count or
    /// names a cluster that does not exist.
    pub fn new(problem: Arc<Problem>, assignment: Option<&[Option<usize>]>) -> Self {
        let mut customers = vec![CustomerRecord::default(); problem.nb_customers()];
        let mut clusters = vec![ClusterRecord::default(); problem.nb_clusters()];

        if let Some(assignment) = assignment {
            assert_eq!(
                assignment.len(),
                customers.len(),
                "assignment length must equal the number of customers"
            );
            for (i, cluster) in assignment.iter().enumerate() {
                if let Some(c) = *cluster {
                    assert!(c < clusters.len(), "customer {i} assigned to unknown cluster {c}");
                    customers[i].cluster = Some(c);
                    clusters[c].customers.push(i);
                }
            }
        }

        let mut sol = Self {
            problem,
            cost: Cost::zero(),
            customers,
            clusters,
        };
        sol.update();
        sol
    }

    /// Rebuilds a fresh solution from this one's assignment.
    ///
    /// Centres and costs are recomputed, so they may differ from the
    /// incrementally maintained values by rounding.
    pub fn deep_copy(&self) -> Self {
        Self::new(Arc::clone(&self.problem), Some(&self.assignment()))
    }

    /// The problem this solution belongs to.
    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    /// Total cost.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Cluster of a customer, `None` if unassigned.
    pub fn cluster_of(&self, customer: usize) -> Option<usize> {
        self.customers[customer].cluster
    }

    /// Customers assigned to `cluster`.
    pub fn customers_of(&self, cluster: usize) -> &[usize] {
        &self.clusters[cluster].customers
    }

    /// Number of customers assigned to `cluster`.
    pub fn nb_customers_in(&self, cluster: usize) -> usize {
        self.clusters[cluster].customers.len()
    }

    /// Cost of one cluster.
    pub fn cluster_cost(&self, cluster: usize) -> Cost {
        self.clusters[cluster].cost
    }

    /// Total quantity assigned to `cluster`.
    pub fn cluster_quantity(&self, cluster: usize) -> f64 {
        self.clusters[cluster].quantity
    }

    /// Customer acting as the centre of `cluster`.
    ///
    /// Always `None` for clusters with a fixed centre.
    pub fn central_customer(&self, cluster: usize) -> Option<usize> {
        self.clusters[cluster].central_customer
    }

    /// Centre location of `cluster`: its fixed centre, or the location of
    /// its central customer, or `None` when it is empty.
    pub fn cluster_centre(&self, cluster: usize) -> Option<Location> {
        centre_location(&self.problem, &self.clusters[cluster], cluster)
    }

    /// Centre locations of every cluster.
    pub fn cluster_centres(&self) -> Vec<Option<Location>> {
        (0..self.clusters.len())
            .map(|c| self.cluster_centre(c))
            .collect()
    }

    /// Cluster of every customer.
    pub fn assignment(&self) -> Vec<Option<usize>> {
        self.customers.iter().map(|r| r.cluster).collect()
    }

    /// Number of unassigned customers.
    pub fn nb_unassigned(&self) -> usize {
        self.customers.iter().filter(|r| r.cluster.is_none()).count()
    }

    /// Number of customers.
    pub fn nb_customers(&self) -> usize {
        self.customers.len()
    }

    /// Number of clusters.
    pub fn nb_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Captures a read-only copy of this solution.
    pub fn snapshot(&self) -> ImmutableSolution {
        ImmutableSolution::from_mutable(self)
    }

    /// Moves `customer` to `cluster`, or unassigns it when `cluster` is `None`.
    pub fn set_customer_to_cluster(&mut self, customer: usize, cluster: Option<usize>) {
        let original = self.customers[customer].cluster;
        if original == cluster {
            return;
        }

        if let Some(o) = original {
            self.cost -= self.clusters[o].cost;
        }
        if let Some(d) = cluster {
            self.cost -= self.clusters[d].cost;
        }

        if let Some(o) = original {
            self.remove(o, customer);
        }
        if let Some(d) = cluster {
            self.insert(d, customer);
        }

        if let Some(o) = original {
            self.cost += self.clusters[o].cost;
        }
        if let Some(d) = cluster {
            self.cost += self.clusters[d].cost;
        }
    }

    /// Total cost if `customer` were moved to `cluster`. The solution is
    /// left unchanged.
    pub fn evaluate_set(&mut self, customer: usize, cluster: Option<usize>) -> Cost {
        let original = self.customers[customer].cluster;
        self.set_customer_to_cluster(customer, cluster);
        let cost = self.cost;
        self.set_customer_to_cluster(customer, original);
        cost
    }

    /// Total cost if the two customers exchanged clusters. The solution is
    /// left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the customers are in different clusters and either one is
    /// unassigned.
    pub fn evaluate_swap(&mut self, a: usize, b: usize) -> Cost {
        let (ca, cb) = match self.swap_clusters(a, b) {
            Some(pair) => pair,
            None => return self.cost,
        };

        self.set_customer_to_cluster(a, Some(cb));
        self.set_customer_to_cluster(b, Some(ca));
        let cost = self.cost;
        self.set_customer_to_cluster(a, Some(ca));
        self.set_customer_to_cluster(b, Some(cb));
        cost
    }

    /// O(1) estimate of [`MutableSolution::evaluate_swap`] that keeps both
    /// clusters' current centres.
    ///
    /// The quantity violation part is exact. The travel part is exact for
    /// fixed-centre clusters. When neither customer is a central customer the
    /// true cost can only be lower, since re-selecting a centre never
    /// increases a cluster's pairwise travel.
    ///
    /// # Panics
    ///
    /// Same conditions as [`MutableSolution::evaluate_swap`].
    pub fn estimate_swap_cost_without_changing_centres(&self, a: usize, b: usize) -> Cost {
        let mut out = self.cost;
        let (ca, cb) = match self.swap_clusters(a, b) {
            Some(pair) => pair,
            None => return out,
        };

        let problem = &*self.problem;
        let cust_a = problem.customer(a);
        let cust_b = problem.customer(b);

        out.quantity_violation += self.violation_change(ca, cust_b.quantity() - cust_a.quantity());
        out.quantity_violation += self.violation_change(cb, cust_a.quantity() - cust_b.quantity());

        let centre_a = self
            .cluster_centre(ca)
            .expect("a cluster holding a customer has a centre");
        let centre_b = self
            .cluster_centre(cb)
            .expect("a cluster holding a customer has a centre");

        out.travel -= problem.travel_cost(Some(ca), &centre_a, cust_a);
        out.travel -= problem.travel_cost(Some(cb), &centre_b, cust_b);
        out.travel += problem.travel_cost(Some(ca), &centre_a, cust_b);
        out.travel += problem.travel_cost(Some(cb), &centre_b, cust_a);

        out.travel += problem.preference_penalty(ca, cust_b) - problem.preference_penalty(ca, cust_a);
        out.travel += problem.preference_penalty(cb, cust_a) - problem.preference_penalty(cb, cust_b);
        out
    }

    /// Recomputes every cluster from scratch and resets the total cost to
    /// the sum of cluster costs.
    ///
    /// Each cluster's customers are sorted by index first, so the result
    /// does not depend on the order in which moves were applied.
    pub fn update(&mut self) {
        self.cost = Cost::zero();
        for c in 0..self.clusters.len() {
            self.update_cluster(c);
            self.cost += self.clusters[c].cost;
        }
    }

    fn swap_clusters(&self, a: usize, b: usize) -> Option<(usize, usize)> {
        let ca = self.customers[a].cluster;
        let cb = self.customers[b].cluster;
        if ca == cb {
            return None;
        }
        match (ca, cb) {
            (Some(ca), Some(cb)) => Some((ca, cb)),
            _ => panic!("can only swap customers that are both assigned (customers {a} and {b})"),
        }
    }

    fn violation_change(&self, cluster: usize, quantity_change: f64) -> f64 {
        let rec = &self.clusters[cluster];
        let new = self
            .problem
            .quantity_violation(self.problem.cluster(cluster), rec.quantity + quantity_change);
        let old = rec.cost.quantity_violation;
        if old != new {
            new - old
        } else {
            0.0
        }
    }

    fn insert(&mut self, cluster: usize, customer: usize) {
        let problem = &*self.problem;
        let rec = &mut self.clusters[cluster];
        assert!(
            self.customers[customer].cluster.is_none(),
            "customer {customer} is already assigned"
        );

        let cust = problem.customer(customer);
        let fixed = problem.cluster(cluster).fixed_centre();
        self.customers[customer].cluster = Some(cluster);
        self.customers[customer].travel_if_centre = 0.0;

        if fixed.is_none() {
            let mut own = 0.0;
            for &other in &rec.customers {
                let other_cust = problem.customer(other);
                self.customers[other].travel_if_centre +=
                    problem.travel_cost(Some(cluster), other_cust.location(), cust);
                own += problem.travel_cost(Some(cluster), cust.location(), other_cust);
            }
            self.customers[customer].travel_if_centre = own;
        }

        if let Some(centre) = fixed {
            rec.fixed_centre_travel += problem.travel_cost(Some(cluster), centre, cust);
        }
        rec.preference_penalty += problem.preference_penalty(cluster, cust);
        rec.customers.push(customer);
        rec.quantity += cust.quantity();

        self.update_centre_and_cost(cluster);
    }

    fn remove(&mut self, cluster: usize, customer: usize) {
        let problem = &*self.problem;
        let rec = &mut self.clusters[cluster];
        assert_eq!(
            self.customers[customer].cluster,
            Some(cluster),
            "customer {customer} is not in cluster {cluster}"
        );
        let pos = rec
            .customers
            .iter()
            .position(|&c| c == customer)
            .unwrap_or_else(|| panic!("cluster {cluster} has no record of customer {customer}"));

        let cust = problem.customer(customer);
        rec.quantity -= cust.quantity();
        rec.customers.remove(pos);
        self.customers[customer].cluster = None;
        self.customers[customer].travel_if_centre = 0.0;

        let fixed = problem.cluster(cluster).fixed_centre();
        if fixed.is_none() {
            for &other in &rec.customers {
                self.customers[other].travel_if_centre -=
                    problem.travel_cost(Some(cluster), problem.customer(other).location(), cust);
            }
        }

        if let Some(centre) = fixed {
            rec.fixed_centre_travel -= problem.travel_cost(Some(cluster), centre, cust);
        }
        rec.preference_penalty -= problem.preference_penalty(cluster, cust);

        self.update_centre_and_cost(cluster);
    }

    fn update_cluster(&mut self, cluster: usize) {
        let problem = &*self.problem;
        let rec = &mut self.clusters[cluster];
        rec.customers.sort_unstable();

        let fixed = problem.cluster(cluster).fixed_centre();
        rec.quantity = 0.0;
        rec.fixed_centre_travel = 0.0;
        rec.preference_penalty = 0.0;

        for &i in &rec.customers {
            let ci = problem.customer(i);
            rec.quantity += ci.quantity();
            rec.preference_penalty += problem.preference_penalty(cluster, ci);

            let mut sum = 0.0;
            match fixed {
                Some(centre) => {
                    rec.fixed_centre_travel += problem.travel_cost(Some(cluster), centre, ci);
                }
                None => {
                    for &j in &rec.customers {
                        if i != j {
                            sum += problem.travel_cost(
                                Some(cluster),
                                ci.location(),
                                problem.customer(j),
                            );
                        }
                    }
                }
            }
            self.customers[i].travel_if_centre = sum;
        }

        self.update_centre_and_cost(cluster);
    }

    fn update_centre_and_cost(&mut self, cluster: usize) {
        let problem = &*self.problem;
        let def = problem.cluster(cluster);
        let rec = &mut self.clusters[cluster];

        let mut travel = 0.0;
        if def.fixed_centre().is_some() {
            rec.central_customer = None;
            travel = rec.fixed_centre_travel;
        } else {
            let mut best: Option<usize> = None;
            for &i in &rec.customers {
                let better = match best {
                    None => true,
                    Some(b) => {
                        self.customers[i].travel_if_centre < self.customers[b].travel_if_centre
                    }
                };
                if better {
                    best = Some(i);
                }
            }
            rec.central_customer = best;
            if let Some(b) = best {
                travel = self.customers[b].travel_if_centre;
            }
        }

        let centre = centre_location(problem, rec, cluster);
        travel += problem.target_to_centre_cost(centre.as_ref(), def);
        travel += rec.preference_penalty;

        rec.cost = Cost::new(travel, problem.quantity_violation(def, rec.quantity));

        let valid = if def.fixed_centre().is_some() {
            rec.central_customer.is_none()
        } else {
            rec.central_customer.is_some() == !rec.customers.is_empty()
        };
        assert!(valid, "cluster {cluster} centre is inconsistent with its customers");
    }
}

fn centre_location(problem: &Problem, rec: &ClusterRecord, cluster: usize) -> Option<Location> {
    if let Some(fixed) = problem.cluster(cluster).fixed_centre() {
        return Some(*fixed);
    }
    rec.central_customer
        .map(|c| *problem.customer(c).location())
}
