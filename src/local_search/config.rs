//! Local search configuration.

use serde::{Deserialize, Serialize};

/// A neighbourhood that can be switched on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalSearchHeuristic {
    /// Pairwise customer swaps between neighbouring clusters.
    InterClusterSwaps,
    /// Single customer moves between neighbouring clusters.
    InterClusterMoves,
    /// Moves to the clusters of each customer's nearest neighbours.
    NearestCustomerMoves,
}

/// Configuration for [`LocalSearch`](super::LocalSearch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    pub inter_cluster_swaps: bool,
    pub inter_cluster_moves: bool,
    pub nearest_customer_moves: bool,
    /// Reject swaps early using the cheap fixed-centre estimate.
    pub estimated_swap_costs: bool,
    /// Neighbouring clusters examined per cluster, and the cap on distinct
    /// clusters tried per customer in nearest-customer moves.
    pub interchange_n_nearest: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            inter_cluster_swaps: true,
            inter_cluster_moves: true,
            nearest_customer_moves: true,
            estimated_swap_costs: true,
            interchange_n_nearest: 5,
        }
    }
}

impl LocalSearchConfig {
    pub fn with_heuristic(mut self, heuristic: LocalSearchHeuristic, on: bool) -> Self {
        match heuristic {
            LocalSearchHeuristic::InterClusterSwaps => self.inter_cluster_swaps = on,
            LocalSearchHeuristic::InterClusterMoves => self.inter_cluster_moves = on,
            LocalSearchHeuristic::NearestCustomerMoves => self.nearest_customer_moves = on,
        }
        self
    }

    /// Disables every neighbourhood.
    pub fn with_all_heuristics_off(self) -> Self {
        self.with_heuristic(LocalSearchHeuristic::InterClusterSwaps, false)
            .with_heuristic(LocalSearchHeuristic::InterClusterMoves, false)
            .with_heuristic(LocalSearchHeuristic::NearestCustomerMoves, false)
    }

    pub fn with_estimated_swap_costs(mut self, on: bool) -> Self {
        self.estimated_swap_costs = on;
        self
    }

    pub fn with_interchange_n_nearest(mut self, n: usize) -> Self {
        self.interchange_n_nearest = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: LocalSearchConfig =
            serde_json::from_str(r#"{"interchange_n_nearest": 3}"#).expect("valid json");
        assert_eq!(cfg.interchange_n_nearest, 3);
        assert!(cfg.inter_cluster_swaps);
        assert!(cfg.estimated_swap_costs);
    }

    #[test]
    fn test_all_off() {
        let cfg = LocalSearchConfig::default().with_all_heuristics_off();
        assert!(!cfg.inter_cluster_swaps);
        assert!(!cfg.inter_cluster_moves);
        assert!(!cfg.nearest_customer_moves);
    }
}
