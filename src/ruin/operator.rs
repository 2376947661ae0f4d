//! Random partial destruction of an assignment.
//!
//! # Algorithm
//!
//! A ruin type is drawn by normalised weight, then a fraction is drawn
//! uniformly from that type's range:
//!
//! - delete clusters: unassign every customer of `ceil(fraction × used)`
//!   randomly chosen non-empty clusters (at least one);
//! - delete customers: unassign `ceil(fraction × assigned)` randomly chosen
//!   assigned customers.
//!
//! # Reference
//!
//! Schrimpf, G. et al. (2000). "Record Breaking Optimization Results Using
//! the Ruin and Recreate Principle". J. Computational Physics 159(2).

use rand::seq::SliceRandom;
use rand::Rng;

use super::RuinConfig;
use crate::error::ConfigError;

/// Which part of the assignment a ruin removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuinType {
    DeleteClusters,
    DeleteCustomers,
}

/// Ruin operator.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_territory::ruin::{Ruin, RuinConfig, RuinType};
///
/// let ruin = Ruin::new(RuinConfig::default().with_customers_fraction(0.5, 0.5)).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(2);
/// let assignment = vec![Some(0), Some(1), Some(0), Some(1)];
/// let ruined = ruin.ruin_with(RuinType::DeleteCustomers, &assignment, &mut rng);
/// assert_eq!(ruined.iter().filter(|c| c.is_none()).count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Ruin {
    config: RuinConfig,
}

impl Ruin {
    /// Creates a ruin operator, rejecting invalid configuration.
    pub fn new(config: RuinConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Draws a ruin type by normalised weight. With both weights zero the
    /// draw is uniform.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> RuinType {
        let weights = [
            (RuinType::DeleteClusters, self.config.weight_delete_clusters),
            (RuinType::DeleteCustomers, self.config.weight_delete_customers),
        ];
        let sum: f64 = weights.iter().map(|(_, w)| w).sum();

        if sum > 0.0 {
            let r: f64 = rng.random();
            let mut cumulative = 0.0;
            for (kind, w) in weights {
                cumulative += w / sum;
                if r <= cumulative {
                    return kind;
                }
            }
        }
        weights[rng.random_range(0..weights.len())].0
    }

    /// Returns a copy of `assignment` with a random part unassigned.
    pub fn ruin<R: Rng>(&self, assignment: &[Option<usize>], rng: &mut R) -> Vec<Option<usize>> {
        let kind = self.choose(rng);
        self.ruin_with(kind, assignment, rng)
    }

    /// Like [`Ruin::ruin`] with a given ruin type.
    pub fn ruin_with<R: Rng>(
        &self,
        kind: RuinType,
        assignment: &[Option<usize>],
        rng: &mut R,
    ) -> Vec<Option<usize>> {
        let out = match kind {
            RuinType::DeleteClusters => self.ruin_clusters(assignment, rng),
            RuinType::DeleteCustomers => self.ruin_customers(assignment, rng),
        };
        tracing::trace!(
            ?kind,
            removed = out.iter().filter(|c| c.is_none()).count()
                - assignment.iter().filter(|c| c.is_none()).count(),
            "ruin"
        );
        out
    }

    fn ruin_customers<R: Rng>(&self, assignment: &[Option<usize>], rng: &mut R) -> Vec<Option<usize>> {
        let mut assigned: Vec<usize> = assignment
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|_| i))
            .collect();
        assigned.shuffle(rng);

        let to_remove = nb_to_ruin(
            self.config.min_ruin_customers_fraction,
            self.config.max_ruin_customers_fraction,
            assigned.len(),
            rng,
        );

        let mut out = assignment.to_vec();
        for &i in &assigned[..to_remove] {
            out[i] = None;
        }
        out
    }

    fn ruin_clusters<R: Rng>(&self, assignment: &[Option<usize>], rng: &mut R) -> Vec<Option<usize>> {
        let mut used: Vec<usize> = assignment.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        used.shuffle(rng);

        let mut to_remove = nb_to_ruin(
            self.config.min_ruin_clusters_fraction,
            self.config.max_ruin_clusters_fraction,
            used.len(),
            rng,
        );
        if !used.is_empty() {
            to_remove = to_remove.max(1);
        }
        let removed = &used[..to_remove];

        assignment
            .iter()
            .map(|c| match c {
                Some(c) if removed.contains(c) => None,
                other => *other,
            })
            .collect()
    }
}

fn nb_to_ruin<R: Rng>(min: f64, max: f64, total: usize, rng: &mut R) -> usize {
    let fraction = min + (max - min) * rng.random::<f64>();
    ((total as f64 * fraction).ceil() as usize).min(total)
}
