//! Ruin operator configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for [`Ruin`](super::Ruin).
///
/// Weights are relative; they are normalised when a ruin type is drawn.
/// Each ruin draws its fraction uniformly from `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuinConfig {
    pub weight_delete_clusters: f64,
    pub weight_delete_customers: f64,
    pub min_ruin_customers_fraction: f64,
    pub max_ruin_customers_fraction: f64,
    pub min_ruin_clusters_fraction: f64,
    pub max_ruin_clusters_fraction: f64,
}

impl Default for RuinConfig {
    fn default() -> Self {
        Self {
            weight_delete_clusters: 0.4,
            weight_delete_customers: 0.4,
            min_ruin_customers_fraction: 0.25,
            max_ruin_customers_fraction: 0.75,
            min_ruin_clusters_fraction: 0.25,
            max_ruin_clusters_fraction: 0.75,
        }
    }
}

impl RuinConfig {
    pub fn with_weights(mut self, delete_clusters: f64, delete_customers: f64) -> Self {
        self.weight_delete_clusters = delete_clusters;
        self.weight_delete_customers = delete_customers;
        self
    }

    pub fn with_customers_fraction(mut self, min: f64, max: f64) -> Self {
        self.min_ruin_customers_fraction = min;
        self.max_ruin_customers_fraction = max;
        self
    }

    pub fn with_clusters_fraction(mut self, min: f64, max: f64) -> Self {
        self.min_ruin_clusters_fraction = min;
        self.max_ruin_clusters_fraction = max;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("delete_clusters", self.weight_delete_clusters),
            ("delete_customers", self.weight_delete_customers),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativeRuinWeight { name, value });
            }
        }

        for (name, min, max) in [
            (
                "customers",
                self.min_ruin_customers_fraction,
                self.max_ruin_customers_fraction,
            ),
            (
                "clusters",
                self.min_ruin_clusters_fraction,
                self.max_ruin_clusters_fraction,
            ),
        ] {
            if !(0.0 <= min && min <= max && max <= 1.0) {
                return Err(ConfigError::InvalidFractionRange { name, min, max });
            }
        }
        Ok(())
    }
}
