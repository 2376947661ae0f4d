//! Per-customer ranking of the other customers by travel cost.

use crate::models::Problem;
use crate::solution::MutableSolution;

/// For every customer, all other customers ordered by ascending travel cost
/// from it. Built once per problem and reused across restarts.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_territory::distance::{ClosestNeighbours, TravelMatrix};
/// use u_territory::models::{Cluster, Customer, Location, Problem};
///
/// let pts = [(0.0, 0.0), (5.0, 0.0), (1.0, 0.0)];
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..3).map(|i| Customer::new(Location::new(i))).collect();
/// let problem = Problem::new(customers, vec![Cluster::default()], matrix).unwrap();
///
/// let nn = ClosestNeighbours::new(&problem);
/// assert_eq!(nn.nb_closest(0), 2);
/// assert_eq!(nn.neighbour(0, 0), 2);
/// assert_eq!(nn.neighbour(0, 1), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClosestNeighbours {
    lists: Vec<Vec<usize>>,
}

impl ClosestNeighbours {
    /// Ranks neighbours using the cost of serving them from each customer's
    /// location, ignoring cluster preferences. Ties keep index order.
    pub fn new(problem: &Problem) -> Self {
        let customers = problem.customers();
        let lists = customers
            .iter()
            .enumerate()
            .map(|(i, from)| {
                let mut ranked: Vec<(usize, f64)> = customers
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, to)| (j, problem.travel_cost(None, from.location(), to)))
                    .collect();
                ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
                ranked.into_iter().map(|(j, _)| j).collect()
            })
            .collect();
        Self { lists }
    }

    /// Restricts the ranking to a subset of customers and re-indexes it.
    ///
    /// `new_to_original[k]` is the original index of new customer `k`.
    /// Neighbours outside the subset are dropped; relative order is kept.
    pub fn restricted(&self, new_to_original: &[usize]) -> Self {
        let mut original_to_new = vec![None; self.lists.len()];
        for (new, &orig) in new_to_original.iter().enumerate() {
            original_to_new[orig] = Some(new);
        }

        let lists = new_to_original
            .iter()
            .map(|&orig| {
                self.lists[orig]
                    .iter()
                    .filter_map(|&nb| original_to_new[nb])
                    .collect()
            })
            .collect();
        Self { lists }
    }

    /// Number of ranked neighbours of `customer`.
    pub fn nb_closest(&self, customer: usize) -> usize {
        self.lists[customer].len()
    }

    /// The `rank`-th closest other customer (0 = closest).
    pub fn neighbour(&self, customer: usize, rank: usize) -> usize {
        self.lists[customer][rank]
    }

    /// Cluster currently holding the `rank`-th closest neighbour.
    pub fn cluster_of_closest(
        &self,
        solution: &MutableSolution,
        customer: usize,
        rank: usize,
    ) -> Option<usize> {
        solution.cluster_of(self.neighbour(customer, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::xy_problem;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    #[test]
    fn test_sorted_ascending() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let problem = xy_problem(&mut rng, 20, 3);
        let nn = ClosestNeighbours::new(&problem);
        for i in 0..20 {
            assert_eq!(nn.nb_closest(i), 19);
            let from = problem.customer(i).location();
            let costs: Vec<f64> = (0..19)
                .map(|k| problem.travel_cost(None, from, problem.customer(nn.neighbour(i, k))))
                .collect();
            assert!(costs.windows(2).all(|w| w[0] <= w[1]));
            assert!((0..19).all(|k| nn.neighbour(i, k) != i));
        }
    }

    #[test]
    fn test_restricted_reindexes() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let problem = xy_problem(&mut rng, 10, 2);
        let full = ClosestNeighbours::new(&problem);
        let subset = [7, 2, 5];
        let sub = full.restricted(&subset);
        for (new, &orig) in subset.iter().enumerate() {
            assert_eq!(sub.nb_closest(new), 2);
            let expected: Vec<usize> = (0..9)
                .map(|k| full.neighbour(orig, k))
                .filter(|nb| subset.contains(nb))
                .collect();
            let got: Vec<usize> = (0..2).map(|k| subset[sub.neighbour(new, k)]).collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_cluster_of_closest() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let problem = Arc::new(xy_problem(&mut rng, 6, 2));
        let nn = ClosestNeighbours::new(&problem);
        let mut sol = MutableSolution::new(problem, None);
        let nb = nn.neighbour(0, 0);
        assert_eq!(nn.cluster_of_closest(&sol, 0, 0), None);
        sol.set_customer_to_cluster(nb, Some(1));
        assert_eq!(nn.cluster_of_closest(&sol, 0, 0), Some(1));
    }
}
