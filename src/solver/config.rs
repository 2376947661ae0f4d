//! Solver configuration tree.

use serde::{Deserialize, Serialize};

use crate::constructive::{CentreSelectorConfig, WeightBasedConfig};
use crate::error::ConfigError;
use crate::local_search::LocalSearchConfig;
use crate::ruin::RuinConfig;
use crate::split::SplitterConfig;

/// Configuration for the [`SolutionBank`](super::SolutionBank).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionBankConfig {
    /// Adds a second slot ranked by [`CostComparator::TargetTravel`].
    ///
    /// [`CostComparator::TargetTravel`]: crate::evaluation::CostComparator::TargetTravel
    pub travel_target: bool,
    /// The travel target is this fraction of the best solution's travel.
    pub travel_target_improvement_fraction: f64,
}

impl Default for SolutionBankConfig {
    fn default() -> Self {
        Self {
            travel_target: true,
            travel_target_improvement_fraction: 0.99999,
        }
    }
}

impl SolutionBankConfig {
    pub fn with_travel_target(mut self, on: bool) -> Self {
        self.travel_target = on;
        self
    }

    pub fn with_travel_target_improvement_fraction(mut self, fraction: f64) -> Self {
        self.travel_target_improvement_fraction = fraction;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = self.travel_target_improvement_fraction;
        if !(f > 0.0 && f <= 1.0) {
            return Err(ConfigError::InvalidTravelTargetFraction(f));
        }
        Ok(())
    }
}

/// Configuration for the [`Solver`](super::Solver).
///
/// Every nested configuration is validated by [`Solver::new`](super::Solver::new).
///
/// # Examples
///
/// ```
/// use u_territory::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_seed(7)
///     .with_nb_outer_steps(50)
///     .with_splitter(None);
/// assert!(config.validate().is_ok());
/// assert!(SolverConfig::default().with_new_solution_fraction(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seed of the solver's generator.
    pub seed: u64,
    /// Number of outer steps after the first local optimum.
    pub nb_outer_steps: usize,
    /// Probability that an outer step builds a new solution rather than
    /// ruining and recreating a banked one.
    pub new_solution_fraction: f64,
    /// Probability that a ruin-and-recreate step splits the problem first.
    pub split_problem_probability: f64,
    pub local_search: LocalSearchConfig,
    pub ruin: RuinConfig,
    pub centre_selector: CentreSelectorConfig,
    pub weight_based: WeightBasedConfig,
    pub solution_bank: SolutionBankConfig,
    /// `None` disables splitting.
    pub splitter: Option<SplitterConfig>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: 123,
            nb_outer_steps: 1000,
            new_solution_fraction: 0.25,
            split_problem_probability: 0.5,
            local_search: LocalSearchConfig::default(),
            ruin: RuinConfig::default(),
            centre_selector: CentreSelectorConfig::default(),
            weight_based: WeightBasedConfig::default(),
            solution_bank: SolutionBankConfig::default(),
            splitter: Some(SplitterConfig::default()),
        }
    }
}

impl SolverConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_nb_outer_steps(mut self, n: usize) -> Self {
        self.nb_outer_steps = n;
        self
    }

    pub fn with_new_solution_fraction(mut self, p: f64) -> Self {
        self.new_solution_fraction = p;
        self
    }

    pub fn with_split_problem_probability(mut self, p: f64) -> Self {
        self.split_problem_probability = p;
        self
    }

    pub fn with_local_search(mut self, config: LocalSearchConfig) -> Self {
        self.local_search = config;
        self
    }

    pub fn with_ruin(mut self, config: RuinConfig) -> Self {
        self.ruin = config;
        self
    }

    pub fn with_centre_selector(mut self, config: CentreSelectorConfig) -> Self {
        self.centre_selector = config;
        self
    }

    pub fn with_weight_based(mut self, config: WeightBasedConfig) -> Self {
        self.weight_based = config;
        self
    }

    pub fn with_solution_bank(mut self, config: SolutionBankConfig) -> Self {
        self.solution_bank = config;
        self
    }

    pub fn with_splitter(mut self, config: Option<SplitterConfig>) -> Self {
        self.splitter = config;
        self
    }

    /// Validates this configuration and every nested one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("new_solution_fraction", self.new_solution_fraction),
            ("split_problem_probability", self.split_problem_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        self.ruin.validate()?;
        self.centre_selector.validate()?;
        self.weight_based.validate()?;
        self.solution_bank.validate()?;
        if let Some(splitter) = &self.splitter {
            splitter.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let cfg = SolverConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.seed, 123);
        assert_eq!(cfg.nb_outer_steps, 1000);
        assert!(cfg.splitter.is_some());
    }

    #[test]
    fn test_nested_errors_surface() {
        let cfg = SolverConfig::default().with_ruin(RuinConfig::default().with_weights(-1.0, 1.0));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NegativeRuinWeight { .. })
        ));

        let cfg = SolverConfig::default().with_splitter(Some(SplitterConfig::default().with_fractions(3.0, 1.0)));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSplitterFractions { .. })
        ));

        let cfg = SolverConfig::default().with_solution_bank(
            SolutionBankConfig::default().with_travel_target_improvement_fraction(0.0),
        );
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidTravelTargetFraction(0.0)));

        let cfg = SolverConfig::default().with_weight_based(WeightBasedConfig::default().with_iterations(0));
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveIterations(0)));
    }

    #[test]
    fn test_probabilities() {
        assert_eq!(
            SolverConfig::default().with_split_problem_probability(-0.5).validate(),
            Err(ConfigError::InvalidProbability {
                name: "split_problem_probability",
                value: -0.5
            })
        );
        assert!(SolverConfig::default()
            .with_new_solution_fraction(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json() {
        let cfg: SolverConfig = serde_json::from_str(
            r#"{"seed": 9, "splitter": null, "ruin": {"weight_delete_customers": 1.0}}"#,
        )
        .expect("valid json");
        assert_eq!(cfg.seed, 9);
        assert!(cfg.splitter.is_none());
        assert_eq!(cfg.ruin.weight_delete_customers, 1.0);
        assert_eq!(cfg.ruin.weight_delete_clusters, 0.4);
        assert_eq!(cfg.nb_outer_steps, 1000);
    }
}
