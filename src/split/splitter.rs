//! Divide-and-conquer decomposition of a solved problem.
//!
//! # Algorithm
//!
//! 1. Build a meta-problem with one unit-quantity pseudo-customer at every
//!    cluster centre and one meta-cluster per requested sub-problem.
//! 2. Solve it with weight-based construction plus one local search step,
//!    which groups geographically close clusters.
//! 3. Each non-empty meta-cluster becomes a sub-problem holding its
//!    clusters and their currently assigned customers, re-indexed from 0.
//!
//! Sub-problems share the original travel matrix.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;

use super::SplitterConfig;
use crate::distance::ClosestNeighbours;
use crate::error::ConfigError;
use crate::evaluation::CostComparator;
use crate::models::{Cluster, ClusterPreference, Customer, Location, Problem};
use crate::solution::{ImmutableSolution, MutableSolution};
use crate::solver::{construct_weighted_then_improve, SolverConfig};

/// An independent part of a larger problem.
#[derive(Debug, Clone)]
pub struct Subproblem {
    problem: Arc<Problem>,
    initial: ImmutableSolution,
    new_to_original_customers: Vec<usize>,
    new_to_original_clusters: Vec<usize>,
    neighbours: ClosestNeighbours,
}

impl Subproblem {
    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    /// The original assignment restricted to this sub-problem.
    pub fn initial_solution(&self) -> &ImmutableSolution {
        &self.initial
    }

    /// Original index of each sub-problem customer.
    pub fn new_to_original_customers(&self) -> &[usize] {
        &self.new_to_original_customers
    }

    /// Original index of each sub-problem cluster.
    pub fn new_to_original_clusters(&self) -> &[usize] {
        &self.new_to_original_clusters
    }

    /// Closest-neighbour index in sub-problem customer indices.
    pub fn neighbours(&self) -> &ClosestNeighbours {
        &self.neighbours
    }
}

/// Splits a solved problem into sub-problems and merges their solutions.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_territory::distance::{ClosestNeighbours, TravelMatrix};
/// use u_territory::models::{Cluster, Customer, Location, Problem};
/// use u_territory::split::{ProblemSplitter, SplitterConfig};
///
/// let pts: Vec<(f64, f64)> = (0..16).map(|i| ((i % 4) as f64, (i / 4) as f64)).collect();
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..16).map(|i| Customer::new(Location::new(i))).collect();
/// let clusters = vec![Cluster::new(4.0, 4.0); 4];
/// let problem = Arc::new(Problem::new(customers, clusters, matrix).unwrap());
/// let assignment: Vec<Option<usize>> = (0..16).map(|i| Some(i / 4)).collect();
///
/// let neighbours = ClosestNeighbours::new(&problem);
/// let splitter = ProblemSplitter::new(Arc::clone(&problem), SplitterConfig::default()).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let parts = splitter.split(&assignment, 2, &neighbours, &mut rng);
///
/// let nb_customers: usize = parts.iter().map(|p| p.problem().nb_customers()).sum();
/// assert_eq!(nb_customers, 16);
///
/// let solutions: Vec<_> = parts.iter().map(|p| p.initial_solution().clone()).collect();
/// let merged = ProblemSplitter::combine(&problem, &parts, &solutions);
/// assert_eq!(merged.assignment(), assignment);
/// ```
pub struct ProblemSplitter {
    problem: Arc<Problem>,
    config: SplitterConfig,
}

impl ProblemSplitter {
    /// Creates a splitter, rejecting invalid configuration.
    pub fn new(problem: Arc<Problem>, config: SplitterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { problem, config })
    }

    /// Sub-problem counts worth trying: powers of two up to half the
    /// number of clusters, each randomly shifted by -1, 0 or +1 when the
    /// shifted value is new. Always contains 1.
    ///
    /// For callers sweeping split sizes themselves; [`Solver`](crate::solver::Solver)
    /// draws its own count uniformly and does not call this.
    pub fn candidate_subproblem_counts<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let max = (self.problem.nb_clusters() / 2).max(1);
        let mut counts = BTreeSet::new();
        let mut n = 1;
        while n <= max {
            counts.insert(n);
            n *= 2;
        }

        for value in counts.iter().copied().collect::<Vec<_>>() {
            let shifted = (value as i64 + rng.random_range(-1..=1)) as usize;
            if shifted >= 1 && !counts.contains(&shifted) {
                counts.remove(&value);
                counts.insert(shifted);
            }
        }

        counts.insert(1);
        counts.into_iter().collect()
    }

    /// Splits a complete assignment into at most `nb_subproblems` parts.
    ///
    /// Clusters without a centre are attached to a random sub-problem.
    ///
    /// # Panics
    ///
    /// Panics if any customer is unassigned.
    #[tracing::instrument(level = "debug", skip_all, fields(nb_subproblems = nb_subproblems))]
    pub fn split<R: Rng>(
        &self,
        assignment: &[Option<usize>],
        nb_subproblems: usize,
        neighbours: &ClosestNeighbours,
        rng: &mut R,
    ) -> Vec<Subproblem> {
        let problem = &self.problem;
        let original = MutableSolution::new(Arc::clone(problem), Some(assignment));
        assert_eq!(
            original.nb_unassigned(),
            0,
            "all customers must be assigned before splitting"
        );

        let centres = original.cluster_centres();
        let pseudo_to_cluster: Vec<usize> = centres
            .iter()
            .enumerate()
            .filter_map(|(c, centre)| centre.map(|_| c))
            .collect();
        let meta = Arc::new(self.meta_problem(&centres, nb_subproblems));
        let meta_neighbours = ClosestNeighbours::new(&meta);
        let grouping = construct_weighted_then_improve(
            &meta,
            &SolverConfig::default(),
            &meta_neighbours,
            CostComparator::Standard,
            rng,
        );

        let mut groups: Vec<Vec<usize>> = (0..nb_subproblems)
            .map(|g| {
                grouping
                    .customers_of(g)
                    .iter()
                    .map(|&pseudo| pseudo_to_cluster[pseudo])
                    .collect()
            })
            .filter(|g: &Vec<usize>| !g.is_empty())
            .collect();
        assert!(!groups.is_empty(), "a solved problem has at least one centre");

        for (c, centre) in centres.iter().enumerate() {
            if centre.is_none() {
                let g = rng.random_range(0..groups.len());
                groups[g].push(c);
            }
        }

        let parts: Vec<Subproblem> = groups
            .iter()
            .map(|clusters| self.build_subproblem(&original, clusters, neighbours))
            .collect();

        let nb_customers: usize = parts.iter().map(|p| p.problem.nb_customers()).sum();
        assert_eq!(
            nb_customers,
            problem.nb_customers(),
            "sub-problems must cover every customer"
        );
        tracing::debug!(nb_parts = parts.len(), "split problem");
        parts
    }

    fn meta_problem(&self, centres: &[Option<Location>], nb_subproblems: usize) -> Problem {
        let customers = self.problem.customers();
        let n = customers.len().max(1) as f64;
        let avg_distance_rate = customers.iter().map(|c| c.cost_per_unit_distance()).sum::<f64>() / n;
        let avg_time_rate = customers.iter().map(|c| c.cost_per_unit_time()).sum::<f64>() / n;

        let pseudo: Vec<Customer> = centres
            .iter()
            .flatten()
            .map(|&loc| {
                Customer::new(loc)
                    .with_quantity(1.0)
                    .with_cost_per_unit_distance(avg_distance_rate)
                    .with_cost_per_unit_time(avg_time_rate)
            })
            .collect();

        let average = pseudo.len() as f64 / nb_subproblems as f64;
        let min = (average * self.config.min_fraction_of_average).max(2.0);
        let max = average * self.config.max_fraction_of_average;
        let clusters = vec![Cluster::new(min, max); nb_subproblems];

        Problem::new(pseudo, clusters, Arc::clone(self.problem.travel_matrix()))
            .expect("pseudo-customers sit on locations of the original problem")
            .with_violation_type(self.problem.violation_type())
    }

    fn build_subproblem(
        &self,
        original: &MutableSolution,
        clusters: &[usize],
        neighbours: &ClosestNeighbours,
    ) -> Subproblem {
        let problem = &self.problem;
        let mut original_to_new_cluster = vec![None; problem.nb_clusters()];
        for (new, &orig) in clusters.iter().enumerate() {
            original_to_new_cluster[orig] = Some(new);
        }

        let mut new_to_original_customers = Vec::new();
        let mut sub_customers = Vec::new();
        let mut sub_assignment = Vec::new();
        for (new_cluster, &orig_cluster) in clusters.iter().enumerate() {
            for &orig in original.customers_of(orig_cluster) {
                let customer = problem.customer(orig);
                let preference = customer.preference().and_then(|p| {
                    original_to_new_cluster[p.cluster].map(|cluster| ClusterPreference {
                        cluster,
                        kind: p.kind,
                    })
                });
                sub_customers.push(customer.clone().with_preference(preference));
                sub_assignment.push(Some(new_cluster));
                new_to_original_customers.push(orig);
            }
        }

        let sub_clusters = clusters.iter().map(|&c| problem.cluster(c).clone()).collect();
        let sub_problem = Problem::new(
            sub_customers,
            sub_clusters,
            Arc::clone(problem.travel_matrix()),
        )
        .expect("sub-problem reuses validated customers and clusters")
        .with_violation_type(problem.violation_type());
        let sub_problem = Arc::new(sub_problem);

        let initial = MutableSolution::new(Arc::clone(&sub_problem), Some(&sub_assignment)).snapshot();
        Subproblem {
            problem: sub_problem,
            initial,
            neighbours: neighbours.restricted(&new_to_original_customers),
            new_to_original_customers,
            new_to_original_clusters: clusters.to_vec(),
        }
    }

    /// Merges one solution per sub-problem back into the original problem.
    ///
    /// # Panics
    ///
    /// Panics if a sub-problem solution leaves customers unassigned, or if
    /// the merged assignment misses a customer.
    pub fn combine(
        problem: &Arc<Problem>,
        parts: &[Subproblem],
        solutions: &[ImmutableSolution],
    ) -> MutableSolution {
        assert_eq!(parts.len(), solutions.len(), "one solution per sub-problem");

        let mut assignment = vec![None; problem.nb_customers()];
        for (part, solution) in parts.iter().zip(solutions) {
            assert_eq!(
                solution.nb_unassigned(),
                0,
                "sub-problem solutions must assign every customer"
            );
            for (new, &orig) in part.new_to_original_customers.iter().enumerate() {
                let cluster = solution
                    .cluster_of(new)
                    .expect("checked above that every customer is assigned");
                assignment[orig] = Some(part.new_to_original_clusters[cluster]);
            }
        }

        let merged = MutableSolution::new(Arc::clone(problem), Some(&assignment));
        assert_eq!(merged.nb_unassigned(), 0, "sub-problems must cover every customer");
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::TravelMatrix;
    use crate::testing::{random_assignment, xy_problem};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn check_conservation(problem: &Arc<Problem>, assignment: &[Option<usize>], nb: usize, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let nn = ClosestNeighbours::new(problem);
        let splitter = ProblemSplitter::new(Arc::clone(problem), SplitterConfig::default()).expect("valid");
        let parts = splitter.split(assignment, nb, &nn, &mut rng);

        assert!(!parts.is_empty() && parts.len() <= nb);
        let customers: usize = parts.iter().map(|p| p.problem().nb_customers()).sum();
        let clusters: usize = parts.iter().map(|p| p.problem().nb_clusters()).sum();
        assert_eq!(customers, problem.nb_customers());
        assert_eq!(clusters, problem.nb_clusters());

        let solutions: Vec<ImmutableSolution> =
            parts.iter().map(|p| p.initial_solution().clone()).collect();
        let merged = ProblemSplitter::combine(problem, &parts, &solutions);
        let before = MutableSolution::new(Arc::clone(problem), Some(assignment));
        assert!(merged.cost().approx_eq(&before.cost()));
        assert_eq!(merged.assignment(), assignment);
    }

    #[test]
    fn test_split_conserves_customers_and_clusters() {
        let mut rng = ChaCha8Rng::seed_from_u64(61);
        let problem = Arc::new(xy_problem(&mut rng, 120, 12));
        let assignment = random_assignment(&mut rng, 120, 12);
        for (nb, seed) in [(1, 1), (2, 2), (3, 3), (6, 4)] {
            check_conservation(&problem, &assignment, nb, seed);
        }
    }

    #[test]
    fn test_empty_clusters_attached() {
        let mut rng = ChaCha8Rng::seed_from_u64(62);
        let problem = Arc::new(xy_problem(&mut rng, 40, 8));
        // clusters 6 and 7 stay empty
        let assignment: Vec<Option<usize>> = (0..40).map(|i| Some(i % 6)).collect();
        check_conservation(&problem, &assignment, 2, 9);
    }

    #[test]
    fn test_subproblem_reindexing() {
        let mut rng = ChaCha8Rng::seed_from_u64(63);
        let problem = Arc::new(xy_problem(&mut rng, 60, 6));
        let assignment = random_assignment(&mut rng, 60, 6);
        let nn = ClosestNeighbours::new(&problem);
        let splitter = ProblemSplitter::new(Arc::clone(&problem), SplitterConfig::default()).expect("valid");
        let parts = splitter.split(&assignment, 3, &nn, &mut rng);

        for part in &parts {
            let initial = part.initial_solution();
            for (new, &orig) in part.new_to_original_customers().iter().enumerate() {
                let sub_cluster = initial.cluster_of(new).expect("assigned");
                assert_eq!(
                    Some(part.new_to_original_clusters()[sub_cluster]),
                    assignment[orig]
                );
                assert_eq!(
                    part.problem().customer(new).location(),
                    problem.customer(orig).location()
                );
            }
            assert_eq!(part.neighbours().nb_closest(0), part.problem().nb_customers() - 1);
        }
    }

    #[test]
    fn test_preferences_remapped() {
        let pts: Vec<(f64, f64)> = (0..8).map(|i| (i as f64, 0.0)).collect();
        let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
        let customers: Vec<Customer> = (0..8)
            .map(|i| {
                let c = Customer::new(Location::new(i));
                match i {
                    0 => c.with_preferred_penalty(1, 5.0),
                    7 => c.with_preferred_multiplier(0, 0.5),
                    _ => c,
                }
            })
            .collect();
        let clusters = vec![Cluster::new(0.0, 10.0); 4];
        let problem = Arc::new(Problem::new(customers, clusters, matrix).expect("valid"));
        let assignment: Vec<Option<usize>> = (0..8).map(|i| Some(i / 2)).collect();

        let nn = ClosestNeighbours::new(&problem);
        let splitter = ProblemSplitter::new(Arc::clone(&problem), SplitterConfig::default()).expect("valid");
        let mut rng = ChaCha8Rng::seed_from_u64(64);
        for part in splitter.split(&assignment, 2, &nn, &mut rng) {
            for (new, &orig) in part.new_to_original_customers().iter().enumerate() {
                let original_pref = problem.customer(orig).preference();
                let sub_pref = part.problem().customer(new).preference();
                match (original_pref, sub_pref) {
                    (Some(o), Some(s)) => {
                        assert_eq!(part.new_to_original_clusters()[s.cluster], o.cluster);
                        assert_eq!(o.kind, s.kind);
                    }
                    (Some(o), None) => {
                        assert!(!part.new_to_original_clusters().contains(&o.cluster));
                    }
                    (None, None) => {}
                    (None, Some(_)) => panic!("preference appeared from nowhere"),
                }
            }
        }
    }

    #[test]
    fn test_candidate_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(65);
        let problem = Arc::new(xy_problem(&mut rng, 10, 20));
        let splitter = ProblemSplitter::new(problem, SplitterConfig::default()).expect("valid");
        for _ in 0..20 {
            let counts = splitter.candidate_subproblem_counts(&mut rng);
            assert!(counts.contains(&1));
            assert!(counts.windows(2).all(|w| w[0] < w[1]));
            assert!(counts.iter().all(|&c| (1..=11).contains(&c)));
            assert!(counts.len() >= 4);
        }
    }

    #[test]
    #[should_panic(expected = "all customers must be assigned")]
    fn test_split_rejects_unassigned() {
        let mut rng = ChaCha8Rng::seed_from_u64(66);
        let problem = Arc::new(xy_problem(&mut rng, 10, 2));
        let nn = ClosestNeighbours::new(&problem);
        let splitter = ProblemSplitter::new(Arc::clone(&problem), SplitterConfig::default()).expect("valid");
        let mut assignment = random_assignment(&mut rng, 10, 2);
        assignment[4] = None;
        splitter.split(&assignment, 2, &nn, &mut rng);
    }

    #[test]
    #[should_panic(expected = "must assign every customer")]
    fn test_combine_rejects_unassigned() {
        let mut rng = ChaCha8Rng::seed_from_u64(67);
        let problem = Arc::new(xy_problem(&mut rng, 10, 2));
        let nn = ClosestNeighbours::new(&problem);
        let splitter = ProblemSplitter::new(Arc::clone(&problem), SplitterConfig::default()).expect("valid");
        let assignment = random_assignment(&mut rng, 10, 2);
        let parts = splitter.split(&assignment, 1, &nn, &mut rng);
        let empty: Vec<ImmutableSolution> = parts
            .iter()
            .map(|p| MutableSolution::new(Arc::clone(p.problem()), None).snapshot())
            .collect();
        ProblemSplitter::combine(&problem, &parts, &empty);
    }
}
