//! Moves and swaps between one pair of clusters.
//!
//! # Complexity
//!
//! Moves: O(|A| × m) where m is the cost of an incremental move.
//! Swaps: O(|A| × |B|) estimates, exact evaluation only for survivors.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

use super::LocalSearch;
use crate::evaluation::CostComparator;
use crate::solution::MutableSolution;

impl LocalSearch<'_> {
    /// Tries moving each customer of `from` into `to`, in random order.
    pub(super) fn inter_cluster_moves<R: Rng>(
        &self,
        comparator: CostComparator,
        from: usize,
        to: usize,
        solution: &mut MutableSolution,
        rng: &mut R,
    ) {
        if !self.config.inter_cluster_moves {
            return;
        }

        let mut customers = solution.customers_of(from).to_vec();
        customers.shuffle(rng);

        for customer in customers {
            let current = solution.cost();
            let candidate = solution.evaluate_set(customer, Some(to));
            if Self::accept_move(comparator, &current, &candidate, rng) {
                solution.set_customer_to_cluster(customer, Some(to));
            }
        }
    }

    /// For each customer of `a`, finds the customer of `b` giving the
    /// cheapest exact swap and takes it under the acceptance rule.
    pub(super) fn inter_cluster_swaps<R: Rng>(
        &self,
        comparator: CostComparator,
        a: usize,
        b: usize,
        solution: &mut MutableSolution,
        rng: &mut R,
    ) {
        if !self.config.inter_cluster_swaps {
            return;
        }

        let mut customers_a = solution.customers_of(a).to_vec();
        customers_a.shuffle(rng);
        let mut customers_b = solution.customers_of(b).to_vec();
        customers_b.shuffle(rng);

        solution.update();

        for &ca in &customers_a {
            let current = solution.cost();
            let mut best = current;
            let mut partner = None;

            for &cb in &customers_b {
                if solution.cluster_of(cb) != Some(b) {
                    continue;
                }

                if self.config.estimated_swap_costs {
                    let estimate = solution.estimate_swap_cost_without_changing_centres(ca, cb);
                    if comparator.compare(&estimate, &best) == Ordering::Greater {
                        continue;
                    }
                }

                let exact = solution.evaluate_swap(ca, cb);
                if exact.total_cmp(&best) != Ordering::Greater {
                    best = exact;
                    partner = Some(cb);
                }
            }

            if let Some(cb) = partner {
                if Self::accept_move(comparator, &current, &best, rng) {
                    solution.set_customer_to_cluster(ca, Some(b));
                    solution.set_customer_to_cluster(cb, Some(a));
                }
            }
        }
    }
}
