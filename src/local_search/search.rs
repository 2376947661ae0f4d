//! Local search driver: single improvement steps and greedy insertion.
//!
//! # Algorithm
//!
//! A step runs two passes in random order:
//!
//! 1. nearest-cluster search: for every cluster, in random order, try
//!    customer moves and swaps against each of its closest clusters;
//! 2. nearest-customer moves: for every customer, try moving it to the
//!    clusters holding its nearest other customers.
//!
//! A move is taken when it is better under the branch comparator, or on a
//! coin flip when it is equal. The step reports an improvement only if the
//! final cost is lower beyond rounding tolerance.
//!
//! # Reference
//!
//! Ríos-Mercado, R. Z. (Ed.) (2020). "Optimal Districting and Territory
//! Design". Springer.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::{Interrupt, LocalSearchConfig};
use crate::distance::ClosestNeighbours;
use crate::evaluation::{Cost, CostComparator};
use crate::models::Problem;
use crate::solution::MutableSolution;

/// Neighbourhood search over a [`MutableSolution`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_territory::distance::{ClosestNeighbours, TravelMatrix};
/// use u_territory::evaluation::CostComparator;
/// use u_territory::local_search::{LocalSearch, LocalSearchConfig, NeverInterrupt};
/// use u_territory::models::{Cluster, Customer, Location, Problem};
///
/// let pts: Vec<(f64, f64)> = (0..8).map(|i| ((i % 4) as f64, (i / 4) as f64 * 10.0)).collect();
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..8).map(|i| Customer::new(Location::new(i))).collect();
/// let clusters = vec![Cluster::new(4.0, 4.0); 2];
/// let problem = Arc::new(Problem::new(customers, clusters, matrix).unwrap());
///
/// let neighbours = ClosestNeighbours::new(&problem);
/// let ls = LocalSearch::new(LocalSearchConfig::default(), &neighbours);
/// let mut rng = ChaCha8Rng::seed_from_u64(5);
/// let mut sol = ls.construct_new_solution(problem, CostComparator::Standard, &mut rng);
/// while ls.run_single_step(CostComparator::Standard, &mut sol, &mut rng, &mut NeverInterrupt) {}
///
/// assert_eq!(sol.nb_unassigned(), 0);
/// assert_eq!(sol.cost().quantity_violation, 0.0);
/// ```
pub struct LocalSearch<'a> {
    pub(super) config: LocalSearchConfig,
    pub(super) neighbours: &'a ClosestNeighbours,
}

impl<'a> LocalSearch<'a> {
    /// Creates a local search using the closest-neighbour index of the
    /// problem it will be run on.
    pub fn new(config: LocalSearchConfig, neighbours: &'a ClosestNeighbours) -> Self {
        Self { config, neighbours }
    }

    /// The neighbourhood switches this search runs with.
    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Runs one improvement step on `solution`.
    ///
    /// Returns `true` if the cost dropped by more than rounding tolerance.
    pub fn run_single_step<R: Rng, I: Interrupt>(
        &self,
        comparator: CostComparator,
        solution: &mut MutableSolution,
        rng: &mut R,
        interrupt: &mut I,
    ) -> bool {
        let reference = solution.cost();

        if rng.random_bool(0.5) {
            self.nearest_cluster_search(comparator, solution, rng, interrupt);
            self.nearest_customer_moves(comparator, solution, rng, interrupt);
        } else {
            self.nearest_customer_moves(comparator, solution, rng, interrupt);
            self.nearest_cluster_search(comparator, solution, rng, interrupt);
        }

        solution.update();

        let cost = solution.cost();
        let improved = !cost.approx_eq(&reference) && cost.total_cmp(&reference) == Ordering::Less;
        tracing::trace!(before = %reference, after = %cost, improved, "local search step");
        improved
    }

    /// Builds a solution from `assignment` and runs one step on it.
    pub fn run_single_step_from<R: Rng>(
        &self,
        problem: Arc<Problem>,
        comparator: CostComparator,
        assignment: &[Option<usize>],
        rng: &mut R,
    ) -> MutableSolution {
        let mut solution = MutableSolution::new(problem, Some(assignment));
        self.run_single_step(comparator, &mut solution, rng, &mut super::NeverInterrupt);
        solution
    }

    /// A new solution built by inserting every customer greedily.
    pub fn construct_new_solution<R: Rng>(
        &self,
        problem: Arc<Problem>,
        comparator: CostComparator,
        rng: &mut R,
    ) -> MutableSolution {
        let mut solution = MutableSolution::new(problem, None);
        self.assign_unassigned(comparator, &mut solution, rng);
        solution
    }

    /// Inserts each unassigned customer, in random order, into the cluster
    /// giving the best total cost. Clusters are tried in random order and
    /// the first best one wins.
    pub fn assign_unassigned<R: Rng>(
        &self,
        comparator: CostComparator,
        solution: &mut MutableSolution,
        rng: &mut R,
    ) {
        let mut customers: Vec<usize> = (0..solution.nb_customers()).collect();
        customers.shuffle(rng);
        let mut clusters: Vec<usize> = (0..solution.nb_clusters()).collect();

        for customer in customers {
            if solution.cluster_of(customer).is_some() {
                continue;
            }

            let mut best = Cost::max();
            let mut best_cluster = None;
            clusters.shuffle(rng);
            for &c in &clusters {
                let cost = solution.evaluate_set(customer, Some(c));
                if comparator.compare(&cost, &best) == Ordering::Less {
                    best = cost;
                    best_cluster = Some(c);
                }
            }
            solution.set_customer_to_cluster(customer, best_cluster);
        }

        solution.update();
    }

    /// Whether to take a move from `old` to `new`.
    pub(super) fn accept_move<R: Rng>(
        comparator: CostComparator,
        old: &Cost,
        new: &Cost,
        rng: &mut R,
    ) -> bool {
        match comparator.compare(old, new) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => rng.random_bool(0.5),
        }
    }
}
