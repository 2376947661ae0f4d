//! Neighbourhood restriction passes.
//!
//! # Complexity
//!
//! Nearest-cluster search: O(n²) to rank clusters, then O(p × k) pair
//! searches. Nearest-customer moves: O(n × (n + k)) worst case.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use super::interrupt::POLL_INTERVAL;
use super::{Interrupt, LocalSearch};
use crate::evaluation::CostComparator;
use crate::solution::MutableSolution;

impl LocalSearch<'_> {
    /// Runs moves and swaps between every cluster and its closest clusters.
    ///
    /// Cluster closeness is the minimum round-trip travel cost between any
    /// two of their customers, recomputed from the current assignment.
    pub(super) fn nearest_cluster_search<R: Rng, I: Interrupt>(
        &self,
        comparator: CostComparator,
        solution: &mut MutableSolution,
        rng: &mut R,
        interrupt: &mut I,
    ) {
        if !interrupt.keep_going("NearClusterSearch") {
            return;
        }

        let mut nearest = self.nearest_clusters(solution);
        let p = nearest.len();

        let mut order: Vec<usize> = (0..p).collect();
        order.shuffle(rng);

        let mut last_poll = Instant::now();
        for (done, &ci) in order.iter().enumerate() {
            let neighbours = &mut nearest[ci];
            neighbours.shuffle(rng);

            for &cj in neighbours.iter() {
                assert_ne!(ci, cj, "a cluster is never its own neighbour");
                if rng.random_bool(0.5) {
                    self.inter_cluster_moves(comparator, ci, cj, solution, rng);
                    self.inter_cluster_swaps(comparator, ci, cj, solution, rng);
                } else {
                    self.inter_cluster_swaps(comparator, ci, cj, solution, rng);
                    self.inter_cluster_moves(comparator, ci, cj, solution, rng);
                }
            }

            solution.update();

            if last_poll.elapsed() > POLL_INTERVAL {
                if !interrupt.keep_going(&format!("Cluster {}/{}", done + 1, p)) {
                    break;
                }
                last_poll = Instant::now();
            }
        }
    }

    /// For every cluster, the other clusters sorted by closeness and
    /// truncated to `interchange_n_nearest`.
    fn nearest_clusters(&self, solution: &MutableSolution) -> Vec<Vec<usize>> {
        let problem = solution.problem();
        let p = problem.nb_clusters();
        let customers = problem.customers();

        let mut closeness = vec![vec![f64::INFINITY; p]; p];
        for (i, ci) in customers.iter().enumerate() {
            let Some(cluster_i) = solution.cluster_of(i) else {
                continue;
            };
            for (j, cj) in customers.iter().enumerate() {
                let Some(cluster_j) = solution.cluster_of(j) else {
                    continue;
                };
                let round_trip = problem.travel_cost(None, ci.location(), cj)
                    + problem.travel_cost(None, cj.location(), ci);
                let entry = &mut closeness[cluster_i][cluster_j];
                *entry = entry.min(round_trip);
            }
        }

        closeness
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut others: Vec<usize> = (0..p).filter(|&j| j != i).collect();
                others.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
                others.truncate(self.config.interchange_n_nearest);
                others
            })
            .collect()
    }

    /// Tries moving each customer, in random order, to the clusters of its
    /// nearest other customers. At most `interchange_n_nearest + 1` distinct
    /// clusters are tried per customer.
    pub(super) fn nearest_customer_moves<R: Rng, I: Interrupt>(
        &self,
        comparator: CostComparator,
        solution: &mut MutableSolution,
        rng: &mut R,
        interrupt: &mut I,
    ) {
        if !interrupt.keep_going("NearCustMoves") {
            return;
        }
        if !self.config.nearest_customer_moves {
            return;
        }

        let nc = solution.nb_customers();
        let mut tried = vec![false; solution.nb_clusters()];
        let mut order: Vec<usize> = (0..nc).collect();
        order.shuffle(rng);

        let mut last_poll = Instant::now();
        for (done, &customer) in order.iter().enumerate() {
            tried.fill(false);
            if let Some(own) = solution.cluster_of(customer) {
                tried[own] = true;
            }

            let mut nb_tried = 0;
            for rank in 0..self.neighbours.nb_closest(customer) {
                if let Some(other) = self.neighbours.cluster_of_closest(solution, customer, rank) {
                    if !tried[other] {
                        tried[other] = true;
                        nb_tried += 1;
                        let current = solution.cost();
                        let candidate = solution.evaluate_set(customer, Some(other));
                        if Self::accept_move(comparator, &current, &candidate, rng) {
                            solution.set_customer_to_cluster(customer, Some(other));
                        }
                    }
                }

                if nb_tried > self.config.interchange_n_nearest {
                    break;
                }
            }

            if last_poll.elapsed() > POLL_INTERVAL {
                if !interrupt.keep_going(&format!("Customer {}/{}", done + 1, nc)) {
                    break;
                }
                last_poll = Instant::now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{ClosestNeighbours, TravelMatrix};
    use crate::local_search::{LocalSearchConfig, LocalSearchHeuristic, NeverInterrupt};
    use crate::models::{Cluster, Customer, Location, Problem};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    /// Four fixed-centre clusters along a line, one customer on each centre.
    fn four_in_a_row() -> MutableSolution {
        let pts: Vec<(f64, f64)> = (0..4).map(|i| (i as f64 * 10.0, 0.0)).collect();
        let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
        let customers = (0..4).map(|i| Customer::new(Location::new(i))).collect();
        let clusters = (0..4)
            .map(|i| Cluster::new(0.0, 5.0).with_fixed_centre(Location::new(i)))
            .collect();
        let problem = Arc::new(Problem::new(customers, clusters, matrix).expect("valid"));
        MutableSolution::new(problem, Some(&[Some(0), Some(1), Some(2), Some(3)]))
    }

    #[test]
    fn test_nearest_clusters_sorted_and_truncated() {
        let sol = four_in_a_row();
        let nn = ClosestNeighbours::new(sol.problem());
        let ls = LocalSearch::new(LocalSearchConfig::default().with_interchange_n_nearest(2), &nn);
        let nearest = ls.nearest_clusters(&sol);
        assert_eq!(nearest[0], vec![1, 2]);
        assert_eq!(nearest[3], vec![2, 1]);
        assert_eq!(nearest[1].len(), 2);
        assert!(!nearest[1].contains(&1));
    }

    #[test]
    fn test_empty_clusters_rank_last() {
        let mut sol = four_in_a_row();
        sol.set_customer_to_cluster(1, Some(0));
        let nn = ClosestNeighbours::new(sol.problem());
        let ls = LocalSearch::new(LocalSearchConfig::default(), &nn);
        let nearest = ls.nearest_clusters(&sol);
        assert_eq!(nearest[0], vec![2, 3, 1]);
    }

    #[test]
    fn test_nearest_customer_moves_pull_stray_customer() {
        // customer 1 sits on centre 1 but is assigned far away to cluster 3
        let mut sol = four_in_a_row();
        sol.set_customer_to_cluster(1, Some(3));
        let nn = ClosestNeighbours::new(sol.problem());
        let config = LocalSearchConfig::default()
            .with_heuristic(LocalSearchHeuristic::InterClusterMoves, false)
            .with_heuristic(LocalSearchHeuristic::InterClusterSwaps, false);
        let ls = LocalSearch::new(config, &nn);
        let mut rng = ChaCha8Rng::seed_from_u64(41);

        ls.nearest_customer_moves(CostComparator::Standard, &mut sol, &mut rng, &mut NeverInterrupt);
        assert_ne!(sol.cluster_of(1), Some(3));
        assert!(sol.cost().travel < 20.0);
    }
}
