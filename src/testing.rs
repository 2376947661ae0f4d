//! Random problem instances shared by unit tests.

use std::sync::Arc;

use rand::Rng;

use crate::distance::TravelMatrix;
use crate::models::{Cluster, Customer, Location, Problem};

/// Customers uniformly in `[-0.5, 0.5]²` with skewed quantities in
/// `[1, 100]`, and clusters whose bounds are ±20% of the average share.
pub(crate) fn xy_problem<R: Rng>(rng: &mut R, nb_customers: usize, nb_clusters: usize) -> Problem {
    let points: Vec<(f64, f64)> = (0..nb_customers)
        .map(|_| (rng.random::<f64>() - 0.5, rng.random::<f64>() - 0.5))
        .collect();
    let matrix = Arc::new(TravelMatrix::euclidean(&points, 1.0));

    let customers: Vec<Customer> = points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let r: f64 = rng.random();
            Customer::new(Location::xy(i, x, y))
                .with_quantity(1.0 + 99.0 * r.powi(4))
                .with_cost_per_unit_distance(1.0)
                .with_cost_per_unit_time(1.0)
        })
        .collect();

    let total: f64 = customers.iter().map(|c| c.quantity()).sum();
    let share = if nb_clusters > 0 {
        total / nb_clusters as f64
    } else {
        0.0
    };
    let clusters = vec![Cluster::new(0.8 * share, 1.2 * share); nb_clusters];

    Problem::new(customers, clusters, matrix).expect("generated problem is consistent")
}

/// Every customer assigned to a uniformly random cluster.
pub(crate) fn random_assignment<R: Rng>(
    rng: &mut R,
    nb_customers: usize,
    nb_clusters: usize,
) -> Vec<Option<usize>> {
    (0..nb_customers)
        .map(|_| Some(rng.random_range(0..nb_clusters)))
        .collect()
}
