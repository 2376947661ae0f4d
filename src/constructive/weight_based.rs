//! Quantity-balancing assignment to fixed centres.
//!
//! # Algorithm
//!
//! Each customer goes to the cluster minimising `multiplier[c] × cost(c)`,
//! where `cost(c)` is the travel cost from the centre of `c` plus any
//! preference penalty. Starting from all multipliers at 1, each iteration
//! visits the clusters in random order and line-searches that cluster's
//! multiplier: candidate values are sampled at geometrically growing
//! distances in both directions, and the value giving the lowest total
//! quantity violation is kept.
//!
//! # Complexity
//!
//! O(iterations × p × k × n) where p = clusters, n = customers and k is the
//! number of sampled multipliers (logarithmic in the multiplier range).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{Location, Problem};

/// Configuration for [`WeightBasedAssignment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightBasedConfig {
    /// Lowest multiplier a cluster may take.
    pub min_multiplier: f64,
    /// Highest multiplier a cluster may take.
    pub max_multiplier: f64,
    /// First sampling step away from the current multiplier.
    pub min_step_size: f64,
    /// Growth factor between successive sampling steps.
    pub step_size_multiplier: f64,
    /// Passes over all clusters. At least one.
    pub nb_iterations: usize,
}

impl Default for WeightBasedConfig {
    fn default() -> Self {
        Self {
            min_multiplier: 0.1,
            max_multiplier: 10.0,
            min_step_size: 0.01,
            step_size_multiplier: 1.5,
            nb_iterations: 5,
        }
    }
}

impl WeightBasedConfig {
    pub fn with_multiplier_range(mut self, min: f64, max: f64) -> Self {
        self.min_multiplier = min;
        self.max_multiplier = max;
        self
    }

    pub fn with_step_size(mut self, min_step_size: f64, step_size_multiplier: f64) -> Self {
        self.min_step_size = min_step_size;
        self.step_size_multiplier = step_size_multiplier;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.nb_iterations = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_step_size > 0.0) {
            return Err(ConfigError::NonPositiveStepSize(self.min_step_size));
        }
        if !(self.step_size_multiplier > 1.0) {
            return Err(ConfigError::StepMultiplierTooSmall(self.step_size_multiplier));
        }
        if self.nb_iterations == 0 {
            return Err(ConfigError::NonPositiveIterations(self.nb_iterations));
        }
        if !(self.min_multiplier > 0.0 && self.min_multiplier <= self.max_multiplier) {
            return Err(ConfigError::InvalidMultiplierRange {
                min: self.min_multiplier,
                max: self.max_multiplier,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct BalanceState {
    best_cluster: Vec<Option<usize>>,
    quantities: Vec<f64>,
}

/// Assigns every customer to one of a set of given centres, balancing
/// cluster quantities.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_territory::constructive::{WeightBasedAssignment, WeightBasedConfig};
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
///
/// let pts: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 0.0)).collect();
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..6).map(|i| Customer::new(Location::new(i))).collect();
/// let clusters = vec![Cluster::new(3.0, 3.0); 2];
/// let problem = Problem::new(customers, clusters, matrix).unwrap();
///
/// let assigner = WeightBasedAssignment::new(&problem, WeightBasedConfig::default()).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(3);
/// let centres = [Some(Location::new(0)), Some(Location::new(5))];
/// let assignment = assigner.assign(&centres, None, &mut rng);
/// assert!(assignment.iter().all(|c| c.is_some()));
/// ```
pub struct WeightBasedAssignment<'a> {
    problem: &'a Problem,
    config: WeightBasedConfig,
}

impl<'a> WeightBasedAssignment<'a> {
    /// Creates an assigner, rejecting invalid configuration.
    pub fn new(problem: &'a Problem, config: WeightBasedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { problem, config })
    }

    /// Returns a cluster per customer.
    ///
    /// Customers with `fixed[i] = Some(_)` keep that entry and are never
    /// re-evaluated. A customer stays `None` only if no cluster has a centre.
    ///
    /// # Panics
    ///
    /// Panics if `centres` or `fixed` have the wrong length.
    pub fn assign<R: Rng>(
        &self,
        centres: &[Option<Location>],
        fixed: Option<&[Option<usize>]>,
        rng: &mut R,
    ) -> Vec<Option<usize>> {
        let problem = self.problem;
        let p = problem.nb_clusters();
        let nc = problem.nb_customers();
        assert_eq!(centres.len(), p, "one centre slot per cluster");
        if let Some(fixed) = fixed {
            assert_eq!(fixed.len(), nc, "one fixed-assignment slot per customer");
        }
        let fixed_of = |i: usize| fixed.and_then(|f| f[i]);

        let costs: Vec<Vec<f64>> = problem
            .customers()
            .iter()
            .map(|cust| {
                centres
                    .iter()
                    .enumerate()
                    .map(|(c, centre)| match centre {
                        Some(loc) => {
                            problem.travel_cost(Some(c), loc, cust)
                                + problem.preference_penalty(c, cust)
                        }
                        None => f64::INFINITY,
                    })
                    .collect()
            })
            .collect();

        let mut multipliers = vec![1.0; p];
        let mut state = self.evaluate(&costs, &multipliers, &fixed_of);

        let mut order: Vec<usize> = (0..p).collect();
        for _ in 0..self.config.nb_iterations {
            order.shuffle(rng);
            for &c in &order {
                self.line_search(c, &costs, &mut multipliers, &state, &fixed_of, rng);
                state = self.evaluate(&costs, &multipliers, &fixed_of);
            }
        }

        state.best_cluster
    }

    /// Moves `multipliers[cluster]` to the sampled value with the lowest
    /// total violation. Ties keep the smallest value.
    fn line_search<R: Rng>(
        &self,
        cluster: usize,
        costs: &[Vec<f64>],
        multipliers: &mut [f64],
        state: &BalanceState,
        fixed_of: &impl Fn(usize) -> Option<usize>,
        rng: &mut R,
    ) {
        let cfg = &self.config;
        let current = multipliers[cluster];

        let mut candidates = vec![current];
        for sign in [-1.0, 1.0] {
            let mut low = 0.0;
            let mut high = cfg.min_step_size * cfg.step_size_multiplier;
            let mut test = current;
            loop {
                let nearest = test + sign * low;
                if nearest < cfg.min_multiplier || nearest > cfg.max_multiplier {
                    break;
                }
                test += sign * (low + rng.random::<f64>() * (high - low));
                candidates.push(test.clamp(cfg.min_multiplier, cfg.max_multiplier));
                low = high;
                high = low * cfg.step_size_multiplier;
            }
        }
        candidates.sort_by(f64::total_cmp);
        candidates.dedup();

        let problem = self.problem;
        let mut best_multiplier = current;
        let mut best_violation = f64::INFINITY;
        for &candidate in &candidates {
            multipliers[cluster] = candidate;
            let mut quantities = state.quantities.clone();
            for (i, row) in costs.iter().enumerate() {
                if fixed_of(i).is_some() {
                    continue;
                }
                let old = state.best_cluster[i];
                let new = Self::cheapest(row, multipliers);
                if old != new {
                    let q = problem.customer(i).quantity();
                    if let Some(o) = old {
                        quantities[o] -= q;
                    }
                    if let Some(n) = new {
                        quantities[n] += q;
                    }
                }
            }

            let violation: f64 = quantities
                .iter()
                .enumerate()
                .map(|(c, &q)| problem.quantity_violation(problem.cluster(c), q))
                .sum();
            if violation < best_violation {
                best_violation = violation;
                best_multiplier = candidate;
            }
        }

        multipliers[cluster] = best_multiplier;
    }

    fn evaluate(
        &self,
        costs: &[Vec<f64>],
        multipliers: &[f64],
        fixed_of: &impl Fn(usize) -> Option<usize>,
    ) -> BalanceState {
        let problem = self.problem;
        let best_cluster: Vec<Option<usize>> = costs
            .iter()
            .enumerate()
            .map(|(i, row)| fixed_of(i).or_else(|| Self::cheapest(row, multipliers)))
            .collect();

        let mut quantities = vec![0.0; multipliers.len()];
        for (i, c) in best_cluster.iter().enumerate() {
            if let Some(c) = *c {
                quantities[c] += problem.customer(i).quantity();
            }
        }
        BalanceState {
            best_cluster,
            quantities,
        }
    }

    /// Cluster with the lowest weighted cost; the first one wins ties.
    fn cheapest(row: &[f64], multipliers: &[f64]) -> Option<usize> {
        let mut best = None;
        let mut best_cost = f64::INFINITY;
        for (c, (&cost, &m)) in row.iter().zip(multipliers).enumerate() {
            let weighted = cost * m;
            if weighted < best_cost {
                best_cost = weighted;
                best = Some(c);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::TravelMatrix;
    use crate::models::{Cluster, Customer};
    use crate::testing::xy_problem;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn total_violation(problem: &Problem, assignment: &[Option<usize>]) -> f64 {
        let mut q = vec![0.0; problem.nb_clusters()];
        for (i, c) in assignment.iter().enumerate() {
            q[c.expect("assigned")] += problem.customer(i).quantity();
        }
        q.iter()
            .enumerate()
            .map(|(c, &q)| problem.quantity_violation(problem.cluster(c), q))
            .sum()
    }

    fn nearest_centre(problem: &Problem, centres: &[Option<Location>]) -> Vec<Option<usize>> {
        problem
            .customers()
            .iter()
            .map(|cust| {
                (0..centres.len()).min_by(|&a, &b| {
                    let ca = problem.travel_cost(Some(a), centres[a].as_ref().expect("centre"), cust);
                    let cb = problem.travel_cost(Some(b), centres[b].as_ref().expect("centre"), cust);
                    ca.total_cmp(&cb)
                })
            })
            .collect()
    }

    #[test]
    fn test_balancing_never_worse_than_nearest() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let problem = xy_problem(&mut rng, 60, 4);
        let centres: Vec<Option<Location>> =
            (0..4).map(|c| Some(*problem.customer(c).location())).collect();

        let nearest = nearest_centre(&problem, &centres);
        let balanced = WeightBasedAssignment::new(&problem, WeightBasedConfig::default())
            .expect("valid")
            .assign(&centres, None, &mut rng);

        assert!(total_violation(&problem, &balanced) <= total_violation(&problem, &nearest) + 1e-9);
    }

    #[test]
    fn test_balances_line() {
        // 10 unit customers on a line, centres at both ends, bounds [5, 5]
        let pts: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 0.0)).collect();
        let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
        let customers = (0..10).map(|i| Customer::new(Location::new(i))).collect();
        let clusters = vec![Cluster::new(5.0, 5.0); 2];
        let problem = Problem::new(customers, clusters, matrix).expect("valid");
        let centres = [Some(Location::new(0)), Some(Location::new(1))];

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let assigner = WeightBasedAssignment::new(&problem, WeightBasedConfig::default()).expect("valid");
        let assignment = assigner.assign(&centres, None, &mut rng);
        assert!(total_violation(&problem, &assignment) < 8.0);
    }

    #[test]
    fn test_fixed_assignments_kept() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let problem = xy_problem(&mut rng, 20, 2);
        let centres: Vec<Option<Location>> =
            (0..2).map(|c| Some(*problem.customer(c).location())).collect();
        let mut fixed = vec![None; 20];
        fixed[0] = Some(1);
        fixed[5] = Some(0);

        let assigner = WeightBasedAssignment::new(&problem, WeightBasedConfig::default()).expect("valid");
        let assignment = assigner.assign(&centres, Some(&fixed), &mut rng);
        assert_eq!(assignment[0], Some(1));
        assert_eq!(assignment[5], Some(0));
    }

    #[test]
    fn test_centreless_cluster_unused() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let problem = xy_problem(&mut rng, 15, 3);
        let centres = [Some(*problem.customer(0).location()), None, Some(*problem.customer(1).location())];
        let assigner = WeightBasedAssignment::new(&problem, WeightBasedConfig::default()).expect("valid");
        let assignment = assigner.assign(&centres, None, &mut rng);
        assert!(assignment.iter().all(|c| matches!(c, Some(0) | Some(2))));
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let problem = xy_problem(&mut rng, 3, 1);
        let bad_step = WeightBasedConfig::default().with_step_size(0.0, 1.5);
        assert!(matches!(
            WeightBasedAssignment::new(&problem, bad_step),
            Err(ConfigError::NonPositiveStepSize(_))
        ));
        let bad_mult = WeightBasedConfig::default().with_step_size(0.01, 1.0);
        assert!(WeightBasedAssignment::new(&problem, bad_mult).is_err());
        let bad_range = WeightBasedConfig::default().with_multiplier_range(2.0, 1.0);
        assert!(WeightBasedAssignment::new(&problem, bad_range).is_err());
        let no_passes = WeightBasedConfig::default().with_iterations(0);
        assert_eq!(no_passes.validate(), Err(ConfigError::NonPositiveIterations(0)));
        assert!(WeightBasedAssignment::new(&problem, no_passes).is_err());
    }
}
