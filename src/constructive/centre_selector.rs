//! Randomised best-candidate centre seeding.
//!
//! # Algorithm
//!
//! Clusters without a centre are visited in random order. For each one,
//! every customer is scored by the normalised rank of its distance to the
//! nearest centre chosen so far (farther is better) plus, when the cluster
//! has a target centre, the normalised rank of its distance to that target
//! (closer is better). The new centre is drawn uniformly from the top
//! `selectivity / #clusters` fraction of the ranking.
//!
//! # Complexity
//!
//! O(p × n log n) where p = clusters, n = customers.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{Location, Problem};

/// Configuration for [`CentreSelector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentreSelectorConfig {
    /// Size of the random pick pool, as a multiple of `#customers / #clusters`.
    pub best_candidate_selectivity: f64,
}

impl Default for CentreSelectorConfig {
    fn default() -> Self {
        Self {
            best_candidate_selectivity: 0.5,
        }
    }
}

impl CentreSelectorConfig {
    pub fn with_selectivity(mut self, selectivity: f64) -> Self {
        self.best_candidate_selectivity = selectivity;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.best_candidate_selectivity > 0.0) {
            return Err(ConfigError::NonPositiveSelectivity(
                self.best_candidate_selectivity,
            ));
        }
        Ok(())
    }
}

struct Candidate {
    customer: usize,
    tie_break: f64,
    spread_score: f64,
    target_score: f64,
}

/// Picks one seed location per cluster.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_territory::constructive::{CentreSelector, CentreSelectorConfig};
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
///
/// let pts: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 0.0)).collect();
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..10).map(|i| Customer::new(Location::new(i))).collect();
/// let clusters = vec![Cluster::new(0.0, 5.0); 3];
/// let problem = Problem::new(customers, clusters, matrix).unwrap();
///
/// let selector = CentreSelector::new(&problem, CentreSelectorConfig::default()).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let centres = selector.select(None, &mut rng);
/// assert!(centres.iter().all(|c| c.is_some()));
/// ```
pub struct CentreSelector<'a> {
    problem: &'a Problem,
    config: CentreSelectorConfig,
}

impl<'a> CentreSelector<'a> {
    /// Creates a selector, rejecting invalid configuration.
    pub fn new(problem: &'a Problem, config: CentreSelectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { problem, config })
    }

    /// Returns a centre for every cluster.
    ///
    /// Fixed centres are kept, then `preset[c]` if supplied; the remaining
    /// clusters get a customer location. Entries stay `None` only when the
    /// problem has no customers.
    ///
    /// # Panics
    ///
    /// Panics if `preset` does not have one entry per cluster.
    pub fn select<R: Rng>(&self, preset: Option<&[Option<Location>]>, rng: &mut R) -> Vec<Option<Location>> {
        let problem = self.problem;
        let p = problem.nb_clusters();
        let nc = problem.nb_customers();
        if let Some(preset) = preset {
            assert_eq!(preset.len(), p, "one preset centre slot per cluster");
        }

        let mut centres: Vec<Option<Location>> = (0..p)
            .map(|c| {
                problem
                    .cluster(c)
                    .fixed_centre()
                    .copied()
                    .or_else(|| preset.and_then(|pre| pre[c]))
            })
            .collect();

        let mut min_cost = vec![f64::INFINITY; nc];
        for centre in centres.iter().flatten() {
            self.lower_min_costs(centre, &mut min_cost);
        }

        let mut order: Vec<usize> = (0..p).collect();
        order.shuffle(rng);

        for c in order {
            if centres[c].is_some() || nc == 0 {
                continue;
            }

            let ranked = self.rank_candidates(c, &min_cost, rng);
            let limit = ((self.config.best_candidate_selectivity * nc as f64) / p as f64).ceil() as usize;
            let limit = limit.min(nc);
            let chosen = if limit >= 2 {
                ranked[rng.random_range(0..limit)]
            } else {
                ranked[0]
            };

            let loc = *problem.customer(chosen).location();
            self.lower_min_costs(&loc, &mut min_cost);
            centres[c] = Some(loc);
        }

        centres
    }

    fn lower_min_costs(&self, centre: &Location, min_cost: &mut [f64]) {
        for (i, cust) in self.problem.customers().iter().enumerate() {
            let cost = self.problem.travel_cost(None, centre, cust);
            min_cost[i] = min_cost[i].min(cost);
        }
    }

    /// Customer indices ordered best candidate first.
    fn rank_candidates<R: Rng>(&self, cluster: usize, min_cost: &[f64], rng: &mut R) -> Vec<usize> {
        let problem = self.problem;
        let nc = min_cost.len();
        let mut cands: Vec<Candidate> = (0..nc)
            .map(|customer| Candidate {
                customer,
                tie_break: rng.random(),
                spread_score: 0.0,
                target_score: 0.0,
            })
            .collect();

        let step = if nc > 1 { 1.0 / (nc - 1) as f64 } else { 0.0 };

        // Farthest from existing centres first; random order among equals.
        cands.sort_by(|a, b| {
            min_cost[b.customer]
                .total_cmp(&min_cost[a.customer])
                .then(a.tie_break.total_cmp(&b.tie_break))
        });
        for (rank, cand) in cands.iter_mut().enumerate() {
            cand.spread_score = 1.0 - rank as f64 * step;
        }

        if let Some(target) = problem.cluster(cluster).target() {
            let dist: Vec<f64> = (0..nc)
                .map(|i| problem.travel_cost(None, &target.location, problem.customer(i)))
                .collect();
            cands.sort_by(|a, b| dist[a.customer].total_cmp(&dist[b.customer]));
            for (rank, cand) in cands.iter_mut().enumerate() {
                cand.target_score = 1.0 - rank as f64 * step;
            }
        }

        cands.sort_by(|a, b| {
            (b.spread_score + b.target_score).total_cmp(&(a.spread_score + a.target_score))
        });
        cands.into_iter().map(|c| c.customer).collect()
    }
}
