//! Progress reporting and cooperative cancellation.

use serde::{Deserialize, Serialize};

use super::{SolutionBank, Tags};
use crate::solution::ImmutableSolution;

/// What the solver should do after a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContinueOption {
    #[default]
    KeepGoing,
    /// Stop and return the best solution.
    FinishNow,
    /// Stop and return the best solution; the user gave up on the run.
    UserCancelled,
}

/// Running min/max/mean of outer-step durations in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingStats {
    count: usize,
    min: f64,
    max: f64,
    sum: f64,
}

impl TimingStats {
    pub fn record(&mut self, seconds: f64) {
        if self.count == 0 {
            self.min = seconds;
            self.max = seconds;
        } else {
            self.min = self.min.min(seconds);
            self.max = self.max.max(seconds);
        }
        self.sum += seconds;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Snapshot of solver state handed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct SolverStateSummary<'a> {
    /// Outer steps completed.
    pub nb_outer_steps: usize,
    /// `None` while the first solution is being built.
    pub best_solution: Option<&'a ImmutableSolution>,
    pub best_solution_tags: &'a Tags,
    /// Number of solutions the best slot has accepted.
    pub best_solution_nb: u64,
    /// Running operations, outermost first.
    pub operations: &'a [String],
    pub outer_step_timings: &'a TimingStats,
}

impl SolverStateSummary<'_> {
    /// Operations joined with ` > `.
    pub fn operation_path(&self) -> String {
        self.operations.join(" > ")
    }
}

/// Progress callback. Called once per outer step and at most about once
/// per [`POLL_INTERVAL`](crate::local_search::POLL_INTERVAL) inside long
/// passes.
pub type ContinueCallback = Box<dyn FnMut(&SolverStateSummary<'_>) -> ContinueOption>;

/// Breadcrumbs, timings and the sticky continue state of one run.
#[derive(Default)]
pub(super) struct Progress {
    pub(super) callback: Option<ContinueCallback>,
    pub(super) state: ContinueOption,
    pub(super) operations: Vec<String>,
    pub(super) timings: TimingStats,
    pub(super) nb_outer_steps: usize,
}

impl Progress {
    pub(super) fn set_callback(
        &mut self,
        callback: impl FnMut(&SolverStateSummary<'_>) -> ContinueOption + 'static,
    ) {
        self.callback = Some(Box::new(callback));
    }

    /// Clears everything but the callback.
    pub(super) fn reset(&mut self) {
        self.state = ContinueOption::KeepGoing;
        self.operations.clear();
        self.timings = TimingStats::default();
        self.nb_outer_steps = 0;
    }

    /// Asks the callback whether to continue. Once stopped, stays stopped.
    pub(super) fn poll(&mut self, bank: &SolutionBank) -> bool {
        if self.state == ContinueOption::KeepGoing {
            if let Some(callback) = self.callback.as_mut() {
                let summary = SolverStateSummary {
                    nb_outer_steps: self.nb_outer_steps,
                    best_solution: bank.best(),
                    best_solution_tags: bank.tags(0),
                    best_solution_nb: bank.solution_nb(0),
                    operations: &self.operations,
                    outer_step_timings: &self.timings,
                };
                self.state = callback(&summary);
                match self.state {
                    ContinueOption::KeepGoing => {}
                    ContinueOption::FinishNow => {
                        tracing::info!(operation = %self.operations.join(" > "), "finish requested")
                    }
                    ContinueOption::UserCancelled => {
                        tracing::warn!(operation = %self.operations.join(" > "), "solve cancelled")
                    }
                }
            }
        }
        self.state == ContinueOption::KeepGoing
    }

    pub(super) fn push(&mut self, operation: impl Into<String>) {
        self.operations.push(operation.into());
    }

    pub(super) fn pop(&mut self) {
        self.operations.pop();
    }

    pub(super) fn replace_top(&mut self, operation: &str) {
        if let Some(top) = self.operations.last_mut() {
            top.clear();
            top.push_str(operation);
        }
    }
}
