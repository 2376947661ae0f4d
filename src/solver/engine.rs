//! Outer search loop.
//!
//! # Algorithm
//!
//! 1. Insert every unassigned customer greedily, bank the result, and run
//!    local search to a local optimum.
//! 2. Repeat for `nb_outer_steps`:
//!    - with probability `new_solution_fraction`, build a new solution
//!      (weight-based assignment plus one local search step, or greedy
//!      insertion) and improve it to a local optimum;
//!    - otherwise ruin a banked solution, recreate it by greedy insertion
//!      and improve it. When a splitter is configured the ruin-and-recreate
//!      may run independently on sub-problems that are merged back after
//!      each one.
//!
//! Every intermediate solution is offered to the [`SolutionBank`]. Each
//! branch draws one bank slot and searches with that slot's comparator.
//!
//! # Reference
//!
//! Schrimpf, G. et al. (2000). "Record Breaking Optimization Results Using
//! the Ruin and Recreate Principle". J. Computational Physics 159(2).

use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::progress::Progress;
use super::{ContinueOption, SolutionBank, SolverConfig, SolverStateSummary, Tag, Tags};
use crate::constructive::{CentreSelector, WeightBasedAssignment};
use crate::distance::ClosestNeighbours;
use crate::error::ConfigError;
use crate::evaluation::CostComparator;
use crate::local_search::LocalSearch;
use crate::models::Problem;
use crate::ruin::Ruin;
use crate::solution::{ImmutableSolution, MutableSolution};
use crate::split::{ProblemSplitter, Subproblem};

/// Weight-based assignment around randomly selected centres, followed by
/// a single local search step.
pub(crate) fn construct_weighted_then_improve<R: Rng>(
    problem: &Arc<Problem>,
    config: &SolverConfig,
    neighbours: &ClosestNeighbours,
    comparator: CostComparator,
    rng: &mut R,
) -> MutableSolution {
    let centres = CentreSelector::new(problem, config.centre_selector.clone())
        .expect("centre selector config is validated by SolverConfig")
        .select(None, rng);
    let assignment = WeightBasedAssignment::new(problem, config.weight_based.clone())
        .expect("weight-based config is validated by SolverConfig")
        .assign(&centres, None, rng);
    LocalSearch::new(config.local_search.clone(), neighbours).run_single_step_from(
        Arc::clone(problem),
        comparator,
        &assignment,
        rng,
    )
}

/// Where a local search branch takes its comparator from.
#[derive(Clone, Copy)]
enum Objective<'t> {
    /// A fixed comparator; results are not banked.
    Fixed(CostComparator),
    /// The comparator of a bank slot, re-read before every step. Each
    /// step's result is offered to the bank with `tags`.
    Banked { slot: usize, tags: &'t Tags },
}

/// Mutable state of a run, kept apart from the read-only search inputs.
struct Runtime {
    rng: ChaCha8Rng,
    bank: SolutionBank,
    progress: Progress,
}

impl Runtime {
    fn keep_going(&mut self) -> bool {
        self.progress.poll(&self.bank)
    }

    fn comparator(&self, objective: Objective<'_>) -> CostComparator {
        match objective {
            Objective::Fixed(cmp) => cmp,
            Objective::Banked { slot, .. } => self.bank.comparator(slot),
        }
    }

    fn random_slot(&mut self) -> usize {
        self.rng.random_range(0..self.bank.nb_slots())
    }

    /// Runs local search steps until one fails to improve or the run stops.
    fn run_until_local_optimum(
        &mut self,
        ls: &LocalSearch<'_>,
        objective: Objective<'_>,
        solution: &mut MutableSolution,
    ) {
        let mut step = 1;
        let mut improved = true;
        while improved && self.keep_going() {
            let comparator = self.comparator(objective);
            let Runtime {
                rng,
                bank,
                progress,
            } = &mut *self;

            progress.push(format!("LocalSearch step {step}"));
            progress.push("");
            let mut interrupt = |operation: &str| {
                progress.replace_top(operation);
                progress.poll(&*bank)
            };
            improved = ls.run_single_step(comparator, solution, rng, &mut interrupt);
            progress.pop();
            progress.pop();

            if let Objective::Banked { tags, .. } = objective {
                bank.accept(solution, tags, rng);
            }
            step += 1;
        }
    }

    /// Ruins `start`, recreates it by greedy insertion and improves it.
    ///
    /// Returns `None` if the run stopped before the recreated solution was
    /// complete.
    fn ruin_recreate(
        &mut self,
        ls: &LocalSearch<'_>,
        ruin: &Ruin,
        problem: &Arc<Problem>,
        objective: Objective<'_>,
        start: &ImmutableSolution,
    ) -> Option<MutableSolution> {
        self.progress.push("Ruin+recreate");
        let result = self.ruin_recreate_phases(ls, ruin, problem, objective, start);
        self.progress.pop();
        result
    }

    fn ruin_recreate_phases(
        &mut self,
        ls: &LocalSearch<'_>,
        ruin: &Ruin,
        problem: &Arc<Problem>,
        objective: Objective<'_>,
        start: &ImmutableSolution,
    ) -> Option<MutableSolution> {
        if !self.keep_going() {
            return None;
        }
        self.progress.push("Ruining");
        let ruined = ruin.ruin(start.assignment(), &mut self.rng);
        self.progress.pop();

        if !self.keep_going() {
            return None;
        }
        self.progress.push("Recreating");
        let mut solution = MutableSolution::new(Arc::clone(problem), Some(&ruined));
        let comparator = self.comparator(objective);
        ls.assign_unassigned(comparator, &mut solution, &mut self.rng);
        self.progress.pop();

        if self.keep_going() {
            self.progress.push("Improving recreated");
            self.run_until_local_optimum(ls, objective, &mut solution);
            self.progress.pop();
        }
        Some(solution)
    }
}

/// Territory design solver.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
/// use u_territory::solver::{Solver, SolverConfig};
///
/// // two groups of three customers, far apart
/// let pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (50.0, 50.0), (51.0, 50.0), (50.0, 51.0)];
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..6).map(|i| Customer::new(Location::new(i))).collect();
/// let clusters = vec![Cluster::new(3.0, 3.0); 2];
/// let problem = Arc::new(Problem::new(customers, clusters, matrix).unwrap());
///
/// let config = SolverConfig::default().with_nb_outer_steps(20);
/// let mut solver = Solver::new(problem, config).unwrap();
/// let solution = solver.solve(None);
///
/// assert_eq!(solution.nb_unassigned(), 0);
/// assert_eq!(solution.cost().quantity_violation, 0.0);
/// assert_eq!(solution.cluster_of(0), solution.cluster_of(2));
/// assert_eq!(solution.cluster_of(3), solution.cluster_of(5));
/// ```
pub struct Solver {
    problem: Arc<Problem>,
    config: SolverConfig,
    neighbours: ClosestNeighbours,
    ruin: Ruin,
    splitter: Option<ProblemSplitter>,
    runtime: Runtime,
}

impl Solver {
    /// Creates a solver, rejecting invalid configuration.
    pub fn new(problem: Arc<Problem>, config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ruin = Ruin::new(config.ruin.clone())?;
        let splitter = config
            .splitter
            .clone()
            .map(|c| ProblemSplitter::new(Arc::clone(&problem), c))
            .transpose()?;
        let runtime = Runtime {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            bank: SolutionBank::new(config.solution_bank.clone(), Arc::clone(&problem)),
            progress: Progress::default(),
        };

        Ok(Self {
            neighbours: ClosestNeighbours::new(&problem),
            problem,
            config,
            ruin,
            splitter,
            runtime,
        })
    }

    /// Installs a progress callback, polled once per outer step and
    /// periodically inside long passes.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use u_territory::distance::TravelMatrix;
    /// use u_territory::models::{Cluster, Customer, Location, Problem};
    /// use u_territory::solver::{ContinueOption, Solver, SolverConfig};
    ///
    /// let pts: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 0.0)).collect();
    /// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
    /// let customers = (0..10).map(|i| Customer::new(Location::new(i))).collect();
    /// let problem = Arc::new(Problem::new(customers, vec![Cluster::new(5.0, 5.0); 2], matrix).unwrap());
    ///
    /// let mut solver = Solver::new(problem, SolverConfig::default())
    ///     .unwrap()
    ///     .with_callback(|state| {
    ///         if state.nb_outer_steps >= 3 {
    ///             ContinueOption::FinishNow
    ///         } else {
    ///             ContinueOption::KeepGoing
    ///         }
    ///     });
    /// let solution = solver.solve(None);
    /// assert_eq!(solver.nb_outer_steps(), 3);
    /// assert_eq!(solution.nb_unassigned(), 0);
    /// ```
    pub fn with_callback(
        mut self,
        callback: impl FnMut(&SolverStateSummary<'_>) -> ContinueOption + 'static,
    ) -> Self {
        self.runtime.progress.set_callback(callback);
        self
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Banked solutions of the last run.
    pub fn bank(&self) -> &SolutionBank {
        &self.runtime.bank
    }

    /// Outer steps completed in the last run.
    pub fn nb_outer_steps(&self) -> usize {
        self.runtime.progress.nb_outer_steps
    }

    /// How the last run ended; `KeepGoing` if it ran to completion.
    pub fn continue_option(&self) -> ContinueOption {
        self.runtime.progress.state
    }

    /// Clears the bank and progress; the generator keeps its state.
    fn reset(&mut self) {
        self.runtime.bank = SolutionBank::new(
            self.config.solution_bank.clone(),
            Arc::clone(&self.problem),
        );
        self.runtime.progress.reset();
    }

    fn best_or(&self, fallback: &MutableSolution) -> ImmutableSolution {
        self.runtime
            .bank
            .best()
            .cloned()
            .unwrap_or_else(|| fallback.snapshot())
    }

    /// Runs the full search and returns the best solution found.
    ///
    /// `start` seeds the first solution; its unassigned customers are
    /// inserted greedily. A problem without customers or clusters returns
    /// `start` as given. A cancelled run returns the best solution so far.
    ///
    /// # Panics
    ///
    /// Panics if `start` does not have one entry per customer.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn solve(&mut self, start: Option<&[Option<usize>]>) -> ImmutableSolution {
        self.reset();
        let problem = Arc::clone(&self.problem);
        let mut initial = MutableSolution::new(Arc::clone(&problem), start);
        if problem.is_empty() {
            tracing::info!("empty problem, nothing to solve");
            return initial.snapshot();
        }

        tracing::info!(
            nb_customers = problem.nb_customers(),
            nb_clusters = problem.nb_clusters(),
            nb_outer_steps = self.config.nb_outer_steps,
            seed = self.config.seed,
            "solve started"
        );
        let started = Instant::now();

        let ls = LocalSearch::new(self.config.local_search.clone(), &self.neighbours);
        let rt = &mut self.runtime;
        rt.progress.push("Initial construction");
        ls.assign_unassigned(CostComparator::Standard, &mut initial, &mut rt.rng);
        rt.progress.pop();
        rt.bank.accept(
            &initial,
            &Tags::from_tags(&[Tag::InitialConstruct, Tag::StandardComparator]),
            &mut rt.rng,
        );

        if rt.keep_going() {
            let tags = Tags::from_tags(&[Tag::InitialLocalSearchOpt, Tag::StandardComparator]);
            rt.progress.push("Initial local search");
            rt.run_until_local_optimum(&ls, Objective::Banked { slot: 0, tags: &tags }, &mut initial);
            rt.progress.pop();
        }

        while self.runtime.keep_going() && self.runtime.progress.nb_outer_steps < self.config.nb_outer_steps {
            self.outer_step();
            self.runtime.progress.nb_outer_steps += 1;
        }

        let best = self.best_or(&initial);
        tracing::info!(
            steps = self.runtime.progress.nb_outer_steps,
            elapsed = started.elapsed().as_secs_f64(),
            best = %best.cost(),
            outcome = ?self.runtime.progress.state,
            "solve finished"
        );
        best
    }

    /// Greedy insertion followed by local search to a local optimum, with
    /// no outer steps.
    pub fn greedy_local_search_solve(&mut self) -> ImmutableSolution {
        self.reset();
        let mut solution = MutableSolution::new(Arc::clone(&self.problem), None);
        if self.problem.is_empty() {
            return solution.snapshot();
        }

        let ls = LocalSearch::new(self.config.local_search.clone(), &self.neighbours);
        let rt = &mut self.runtime;
        ls.assign_unassigned(CostComparator::Standard, &mut solution, &mut rt.rng);
        let tags = Tags::from_tags(&[Tag::InitialLocalSearchOpt, Tag::StandardComparator]);
        rt.run_until_local_optimum(&ls, Objective::Banked { slot: 0, tags: &tags }, &mut solution);
        self.best_or(&solution)
    }

    /// Weight-based assignment around random centres plus one local search
    /// step, using this solver's generator.
    pub fn construct_weighted_then_improve(&mut self, comparator: CostComparator) -> MutableSolution {
        construct_weighted_then_improve(
            &self.problem,
            &self.config,
            &self.neighbours,
            comparator,
            &mut self.runtime.rng,
        )
    }

    fn outer_step(&mut self) {
        let step = self.runtime.progress.nb_outer_steps + 1;
        let started = Instant::now();
        self.runtime.progress.push(format!("Outer step {step}"));

        let branch = if self.runtime.rng.random::<f64>() < self.config.new_solution_fraction {
            self.construct_new();
            "construct new"
        } else {
            self.ruin_recreate_with_splits();
            "ruin and recreate"
        };

        self.runtime.progress.pop();
        let elapsed = started.elapsed().as_secs_f64();
        self.runtime.progress.timings.record(elapsed);
        tracing::debug!(
            step,
            branch,
            elapsed,
            bank = %self.runtime.bank.single_line_summary(),
            "outer step"
        );
    }

    fn construct_new(&mut self) {
        let ls = LocalSearch::new(self.config.local_search.clone(), &self.neighbours);
        let rt = &mut self.runtime;
        let slot = rt.random_slot();
        let comparator = rt.bank.comparator(slot);

        let mut tags = Tags::new();
        let mut solution = if rt.rng.random_bool(0.5) {
            rt.progress.push("Create new sol using randomised weighted");
            tags.add(Tag::RandomWeightConstruct);
            construct_weighted_then_improve(
                &self.problem,
                &self.config,
                &self.neighbours,
                comparator,
                &mut rt.rng,
            )
        } else {
            rt.progress.push("Create new sol using local search");
            tags.add(Tag::LocalSearchConstruct);
            ls.construct_new_solution(Arc::clone(&self.problem), comparator, &mut rt.rng)
        };
        rt.progress.pop();

        tags.add(rt.bank.comparator_tag(slot));
        rt.bank.accept(&solution, &tags, &mut rt.rng);
        tags.add(Tag::LocalSearchOpt);

        rt.progress.push("Improving new sol");
        rt.run_until_local_optimum(&ls, Objective::Banked { slot, tags: &tags }, &mut solution);
        rt.progress.pop();
    }

    /// Number of sub-problems for the next ruin-and-recreate: 1, or with
    /// the split probability a uniform draw from `1..=clusters/2`.
    fn draw_nb_subproblems(&mut self) -> usize {
        if self.splitter.is_none() {
            return 1;
        }
        let rng = &mut self.runtime.rng;
        if rng.random::<f64>() >= self.config.split_problem_probability {
            return 1;
        }
        let max = self.problem.nb_clusters() / 2;
        if max < 2 {
            return 1;
        }
        1 + rng.random_range(0..max)
    }

    fn ruin_recreate_with_splits(&mut self) {
        let nb_subproblems = self.draw_nb_subproblems();
        let ls = LocalSearch::new(self.config.local_search.clone(), &self.neighbours);
        let rt = &mut self.runtime;
        let start_slot = rt.random_slot();
        let start = rt
            .bank
            .solution(start_slot)
            .cloned()
            .expect("every slot is filled by the initial solution");

        if nb_subproblems == 1 {
            let slot = rt.random_slot();
            let tags = Tags::from_tags(&[
                Tag::RuinRecreate,
                Tag::LocalSearchOpt,
                rt.bank.comparator_tag(slot),
            ]);
            rt.ruin_recreate(
                &ls,
                &self.ruin,
                &self.problem,
                Objective::Banked { slot, tags: &tags },
                &start,
            );
            return;
        }

        let splitter = self
            .splitter
            .as_ref()
            .expect("sub-problem counts above 1 are only drawn with a splitter");
        rt.progress.push("Split");
        let parts = splitter.split(start.assignment(), nb_subproblems, &self.neighbours, &mut rt.rng);
        rt.progress.pop();
        tracing::debug!(
            requested = nb_subproblems,
            created = parts.len(),
            "ruin and recreate on sub-problems"
        );

        let mut solutions: Vec<ImmutableSolution> =
            parts.iter().map(|p| p.initial_solution().clone()).collect();
        for i in 0..parts.len() {
            if !rt.keep_going() {
                break;
            }
            rt.progress.push(format!("Subproblem {}/{}", i + 1, parts.len()));
            let (solution, tag) = Self::solve_subproblem(rt, &self.config, &self.ruin, &parts[i]);
            solutions[i] = solution;

            let combined = ProblemSplitter::combine(&self.problem, &parts, &solutions);
            let tags = Tags::from_tags(&[Tag::Split, Tag::RuinRecreate, Tag::LocalSearchOpt, tag]);
            rt.bank.accept(&combined, &tags, &mut rt.rng);
            rt.progress.pop();
        }
    }

    /// Ruin and recreate on one sub-problem against its own bank. Returns
    /// the sub-bank's best and the comparator tag used.
    fn solve_subproblem(
        rt: &mut Runtime,
        config: &SolverConfig,
        ruin: &Ruin,
        part: &Subproblem,
    ) -> (ImmutableSolution, Tag) {
        let problem = part.problem();
        let mut sub_bank = SolutionBank::new(config.solution_bank.clone(), Arc::clone(problem));
        let initial = part.initial_solution().to_mutable(Arc::clone(problem));
        sub_bank.accept(&initial, &Tags::new(), &mut rt.rng);

        let slot = rt.rng.random_range(0..sub_bank.nb_slots());
        let comparator = sub_bank.comparator(slot);
        let tag = sub_bank.comparator_tag(slot);

        let ls = LocalSearch::new(config.local_search.clone(), part.neighbours());
        let start = sub_bank.best().cloned().expect("sub-bank holds the initial solution");
        if let Some(result) = rt.ruin_recreate(&ls, ruin, problem, Objective::Fixed(comparator), &start) {
            sub_bank.accept(&result, &Tags::from_tags(&[tag]), &mut rt.rng);
        }

        let best = sub_bank
            .best()
            .cloned()
            .expect("sub-bank holds the initial solution");
        (best, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::TravelMatrix;
    use crate::models::{Cluster, Customer, Location};
    use crate::split::SplitterConfig;
    use crate::testing::xy_problem;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn small_config(steps: usize) -> SolverConfig {
        SolverConfig::default().with_nb_outer_steps(steps)
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut rng = ChaCha8Rng::seed_from_u64(91);
        let problem = Arc::new(xy_problem(&mut rng, 60, 6));
        let run = || {
            Solver::new(Arc::clone(&problem), small_config(15).with_seed(5))
                .expect("valid")
                .solve(None)
        };
        let a = run();
        let b = run();
        assert_eq!(a.assignment(), b.assignment());
        assert_eq!(a.cost(), b.cost());
    }

    #[test]
    fn test_hundred_customers_become_balanced() {
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let problem = Arc::new(xy_problem(&mut rng, 100, 10));
        let mut solver = Solver::new(Arc::clone(&problem), small_config(100)).expect("valid");
        let best = solver.solve(None);

        assert_eq!(best.nb_unassigned(), 0);
        assert_eq!(best.cost().quantity_violation, 0.0);
        assert_eq!(solver.nb_outer_steps(), 100);
        assert_eq!(solver.continue_option(), ContinueOption::KeepGoing);
        for cluster in best.clusters() {
            assert!(!cluster.customers().is_empty());
        }
    }

    #[test]
    fn test_outer_steps_never_worsen_best() {
        let mut rng = ChaCha8Rng::seed_from_u64(92);
        let problem = Arc::new(xy_problem(&mut rng, 50, 5));
        let history = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&history);
        let mut solver = Solver::new(problem, small_config(25))
            .expect("valid")
            .with_callback(move |state| {
                if let Some(best) = state.best_solution {
                    sink.borrow_mut().push(best.cost());
                }
                ContinueOption::KeepGoing
            });
        solver.solve(None);

        let history = history.borrow();
        assert!(history.len() > 25);
        for pair in history.windows(2) {
            assert_ne!(
                CostComparator::Standard.compare(&pair[1], &pair[0]),
                std::cmp::Ordering::Greater
            );
        }
    }

    #[test]
    fn test_cancel_returns_best_so_far() {
        let mut rng = ChaCha8Rng::seed_from_u64(93);
        let problem = Arc::new(xy_problem(&mut rng, 40, 4));
        let mut solver = Solver::new(problem, small_config(1000))
            .expect("valid")
            .with_callback(|state| {
                if state.nb_outer_steps >= 5 {
                    ContinueOption::UserCancelled
                } else {
                    ContinueOption::KeepGoing
                }
            });
        let best = solver.solve(None);

        assert_eq!(solver.nb_outer_steps(), 5);
        assert_eq!(solver.continue_option(), ContinueOption::UserCancelled);
        assert_eq!(best.nb_unassigned(), 0);
        assert_eq!(Some(&best), solver.bank().best());
    }

    #[test]
    fn test_cancel_before_anything_returns_initial() {
        let mut rng = ChaCha8Rng::seed_from_u64(94);
        let problem = Arc::new(xy_problem(&mut rng, 20, 3));
        let mut solver = Solver::new(problem, small_config(10))
            .expect("valid")
            .with_callback(|_| ContinueOption::FinishNow);
        let best = solver.solve(None);
        assert_eq!(best.nb_unassigned(), 0);
        assert_eq!(solver.nb_outer_steps(), 0);
        assert_eq!(solver.bank().tags(0).summary(), "INIT_CSTR+COMP_STD");
    }

    #[test]
    fn test_empty_problems() {
        let matrix = Arc::new(TravelMatrix::euclidean(&[(0.0, 0.0), (1.0, 0.0)], 1.0));
        let no_clusters = Problem::new(
            vec![Customer::new(Location::new(0)), Customer::new(Location::new(1))],
            Vec::new(),
            Arc::clone(&matrix),
        )
        .expect("valid");
        let best = Solver::new(Arc::new(no_clusters), small_config(10))
            .expect("valid")
            .solve(None);
        assert_eq!(best.nb_unassigned(), 2);
        assert_eq!(best.nb_clusters(), 0);

        let no_customers =
            Problem::new(Vec::new(), vec![Cluster::new(0.0, 1.0)], matrix).expect("valid");
        let mut solver = Solver::new(Arc::new(no_customers), small_config(10)).expect("valid");
        let best = solver.solve(None);
        assert!(best.assignment().is_empty());
        assert!(solver.greedy_local_search_solve().assignment().is_empty());
    }

    #[test]
    fn test_start_assignment_is_completed() {
        let mut rng = ChaCha8Rng::seed_from_u64(95);
        let problem = Arc::new(xy_problem(&mut rng, 30, 3));
        let mut start = vec![None; 30];
        start[0] = Some(1);
        let mut solver = Solver::new(problem, small_config(0)).expect("valid");
        let best = solver.solve(Some(&start));
        assert_eq!(best.nb_unassigned(), 0);
        assert_eq!(solver.nb_outer_steps(), 0);
    }

    #[test]
    fn test_fixed_centre_keeps_quantity_within_bounds() {
        // customers on a line; cluster 0 is pinned to the left end and may
        // hold exactly two units
        let pts: Vec<(f64, f64)> = (0..12).map(|i| (i as f64, 0.0)).collect();
        let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
        let customers: Vec<Customer> = (0..12).map(|i| Customer::new(Location::new(i))).collect();
        let clusters = vec![
            Cluster::new(2.0, 2.0).with_fixed_centre(Location::new(0)),
            Cluster::new(0.0, 10.0),
        ];
        let problem = Arc::new(Problem::new(customers, clusters, matrix).expect("valid"));
        let best = Solver::new(problem, small_config(30).with_seed(3))
            .expect("valid")
            .solve(None);

        assert_eq!(best.cost().quantity_violation, 0.0);
        assert_eq!(best.cluster(0).customers().len(), 2);
        assert_eq!(best.cluster(0).centre().map(|l| l.index()), Some(0));
    }

    #[test]
    fn test_shrinking_fixed_centre_capacity() {
        // two quantity-2 customers at the pinned centre and four unit
        // customers 100 away; the free cluster holds at most 5 units
        let pts = [(0.0, 0.0), (0.0, 0.0), (100.0, 0.0), (100.0, 0.0), (100.0, 0.0), (100.0, 0.0)];
        let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
        let solve_with_max = |max: f64| {
            let customers: Vec<Customer> = (0..6)
                .map(|i| {
                    let quantity = if i < 2 { 2.0 } else { 1.0 };
                    Customer::new(Location::new(i)).with_quantity(quantity)
                })
                .collect();
            let clusters = vec![
                Cluster::new(0.0, max).with_fixed_centre(Location::new(0)),
                Cluster::new(0.0, 5.0),
            ];
            let problem = Problem::new(customers, clusters, Arc::clone(&matrix)).expect("valid");
            Solver::new(Arc::new(problem), small_config(60).with_seed(17))
                .expect("valid")
                .solve(None)
                .cost()
        };

        let costs: Vec<_> = [4.0, 3.0, 2.0, 1.0, 0.0].into_iter().map(solve_with_max).collect();

        // feasible: travel rises as the pinned cluster sheds customers
        assert_eq!(costs[0].quantity_violation, 0.0);
        assert_eq!(costs[1].quantity_violation, 0.0);
        assert!((costs[0].travel - 0.0).abs() < 1e-9);
        assert!((costs[1].travel - 200.0).abs() < 1e-9);

        // infeasible: violation is unavoidable and travel falls back
        for cost in &costs[2..] {
            assert!(cost.quantity_violation > 0.0);
            assert!(cost.travel < costs[1].travel);
        }
        assert!((costs[2].travel - 100.0).abs() < 1e-9);
        assert!((costs[2].quantity_violation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_cluster_wins_ties() {
        // two identical sites; the penalty makes each customer stay with
        // the cluster it prefers
        let pts = [(0.0, 0.0), (0.0, 0.0), (10.0, 0.0), (10.0, 0.0)];
        let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
        let customers = vec![
            Customer::new(Location::new(0)).with_preferred_penalty(1, 100.0),
            Customer::new(Location::new(1)).with_preferred_penalty(1, 100.0),
            Customer::new(Location::new(2)).with_preferred_penalty(0, 100.0),
            Customer::new(Location::new(3)).with_preferred_penalty(0, 100.0),
        ];
        let problem = Arc::new(
            Problem::new(customers, vec![Cluster::new(0.0, 4.0); 2], matrix).expect("valid"),
        );
        let best = Solver::new(problem, small_config(20))
            .expect("valid")
            .solve(None);
        assert_eq!(best.assignment(), &[Some(1), Some(1), Some(0), Some(0)]);
        assert_eq!(best.cost().travel, 0.0);
    }

    #[test]
    fn test_split_only_search() {
        let mut rng = ChaCha8Rng::seed_from_u64(96);
        let problem = Arc::new(xy_problem(&mut rng, 80, 8));
        let config = small_config(20)
            .with_new_solution_fraction(0.0)
            .with_split_problem_probability(1.0)
            .with_splitter(Some(SplitterConfig::default()));
        let mut solver = Solver::new(problem, config).expect("valid");
        let best = solver.solve(None);
        assert_eq!(best.nb_unassigned(), 0);
        assert_eq!(solver.bank().solution(0), Some(&best));
    }

    #[test]
    fn test_greedy_local_search_solve() {
        let mut rng = ChaCha8Rng::seed_from_u64(97);
        let problem = Arc::new(xy_problem(&mut rng, 40, 4));
        let mut solver = Solver::new(problem, small_config(0)).expect("valid");
        let best = solver.greedy_local_search_solve();
        assert_eq!(best.nb_unassigned(), 0);
        assert!(solver.bank().tags(0).contains(Tag::InitialLocalSearchOpt));
    }

    #[test]
    fn test_breadcrumbs_reach_callback() {
        let mut rng = ChaCha8Rng::seed_from_u64(98);
        let problem = Arc::new(xy_problem(&mut rng, 30, 3));
        let paths = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&paths);
        let mut solver = Solver::new(problem, small_config(10))
            .expect("valid")
            .with_callback(move |state| {
                sink.borrow_mut().push(state.operation_path());
                ContinueOption::KeepGoing
            });
        solver.solve(None);

        let paths = paths.borrow();
        assert!(paths.iter().any(|p| p.starts_with("Initial local search > LocalSearch step 1")));
        assert!(paths.iter().any(|p| p.starts_with("Outer step ")));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let problem = Arc::new(xy_problem(&mut rng, 5, 2));
        assert!(Solver::new(problem, SolverConfig::default().with_new_solution_fraction(2.0)).is_err());
    }
}
