//! Problem splitter configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for [`ProblemSplitter`](super::ProblemSplitter).
///
/// Each sub-problem should hold between `min_fraction_of_average` and
/// `max_fraction_of_average` times the average number of clusters per
/// sub-problem (never fewer than 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub min_fraction_of_average: f64,
    pub max_fraction_of_average: f64,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            min_fraction_of_average: 0.5,
            max_fraction_of_average: 2.0,
        }
    }
}

impl SplitterConfig {
    pub fn with_fractions(mut self, min: f64, max: f64) -> Self {
        self.min_fraction_of_average = min;
        self.max_fraction_of_average = max;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_fraction_of_average, self.max_fraction_of_average);
        if !(min > 0.0 && min <= max) {
            return Err(ConfigError::InvalidSplitterFractions { min, max });
        }
        Ok(())
    }
}
