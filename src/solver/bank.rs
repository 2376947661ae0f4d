//! Best-so-far solutions, one per comparator slot.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::Rng;

use super::{SolutionBankConfig, Tag, Tags};
use crate::evaluation::CostComparator;
use crate::models::Problem;
use crate::solution::{ImmutableSolution, MutableSolution};

#[derive(Debug, Clone, Default)]
struct Slot {
    solution: Option<ImmutableSolution>,
    tags: Tags,
    solution_nb: u64,
}

/// Holds the best solution found under each comparator.
///
/// Slot 0 uses [`CostComparator::Standard`]. With
/// [`SolutionBankConfig::travel_target`] on, slot 1 uses
/// [`CostComparator::TargetTravel`] with a target of slot 0's travel times
/// the improvement fraction, read afresh on every comparison.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_territory::distance::TravelMatrix;
/// use u_territory::models::{Cluster, Customer, Location, Problem};
/// use u_territory::solution::MutableSolution;
/// use u_territory::solver::{SolutionBank, SolutionBankConfig, Tag, Tags};
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (5.0, 0.0), (6.0, 0.0)];
/// let matrix = Arc::new(TravelMatrix::euclidean(&pts, 1.0));
/// let customers = (0..4).map(|i| Customer::new(Location::new(i))).collect();
/// let problem = Arc::new(Problem::new(customers, vec![Cluster::new(0.0, 4.0); 2], matrix).unwrap());
///
/// let mut bank = SolutionBank::new(SolutionBankConfig::default(), Arc::clone(&problem));
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let poor = MutableSolution::new(Arc::clone(&problem), Some(&[Some(0), Some(1), Some(0), Some(1)]));
/// let good = MutableSolution::new(Arc::clone(&problem), Some(&[Some(0), Some(0), Some(1), Some(1)]));
///
/// assert_eq!(bank.accept(&poor, &Tags::from_tags(&[Tag::InitialConstruct]), &mut rng), 2);
/// assert_eq!(bank.accept(&good, &Tags::from_tags(&[Tag::LocalSearchOpt]), &mut rng), 2);
/// assert_eq!(bank.accept(&poor, &Tags::new(), &mut rng), 0);
/// assert_eq!(bank.best().unwrap().cost(), good.cost());
/// assert_eq!(bank.solution_nb(0), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SolutionBank {
    problem: Arc<Problem>,
    travel_target_fraction: f64,
    slots: Vec<Slot>,
}

impl SolutionBank {
    pub fn new(config: SolutionBankConfig, problem: Arc<Problem>) -> Self {
        let nb_slots = if config.travel_target { 2 } else { 1 };
        Self {
            problem,
            travel_target_fraction: config.travel_target_improvement_fraction,
            slots: vec![Slot::default(); nb_slots],
        }
    }

    pub fn nb_slots(&self) -> usize {
        self.slots.len()
    }

    /// Comparator of `slot`, using the current best solution for targets.
    pub fn comparator(&self, slot: usize) -> CostComparator {
        match slot {
            0 => CostComparator::Standard,
            _ => {
                let target = self
                    .best()
                    .map(|s| s.cost().travel * self.travel_target_fraction)
                    .unwrap_or(f64::INFINITY);
                CostComparator::TargetTravel { target }
            }
        }
    }

    /// Tag recording that a search used the comparator of `slot`.
    pub fn comparator_tag(&self, slot: usize) -> Tag {
        match slot {
            0 => Tag::StandardComparator,
            _ => Tag::TargetTravelComparator,
        }
    }

    /// Offers `candidate` to every slot.
    ///
    /// A slot takes a deep copy when it is empty, when the candidate is
    /// better under its comparator, or on a coin flip when they are equal.
    /// Returns the number of slots that strictly improved (an empty slot
    /// counts as improved).
    ///
    /// # Panics
    ///
    /// Panics if `candidate` has unassigned customers.
    pub fn accept<R: Rng>(&mut self, candidate: &MutableSolution, tags: &Tags, rng: &mut R) -> usize {
        assert_eq!(
            candidate.nb_unassigned(),
            0,
            "never bank a solution with unassigned customers"
        );

        let cost = candidate.cost();
        let mut copy: Option<ImmutableSolution> = None;
        let mut nb_improved = 0;
        for i in 0..self.slots.len() {
            let diff = match &self.slots[i].solution {
                None => Ordering::Less,
                Some(existing) => self.comparator(i).compare(&cost, &existing.cost()),
            };
            let accept = match diff {
                Ordering::Less => true,
                Ordering::Equal => rng.random_bool(0.5),
                Ordering::Greater => false,
            };
            if diff == Ordering::Less {
                nb_improved += 1;
            }

            if accept {
                let snapshot = copy
                    .get_or_insert_with(|| {
                        MutableSolution::new(Arc::clone(&self.problem), Some(&candidate.assignment()))
                            .snapshot()
                    })
                    .clone();
                let slot = &mut self.slots[i];
                slot.solution = Some(snapshot);
                slot.tags = tags.clone();
                slot.solution_nb += 1;
            }
        }
        nb_improved
    }

    /// Solution held by `slot`, if any.
    pub fn solution(&self, slot: usize) -> Option<&ImmutableSolution> {
        self.slots[slot].solution.as_ref()
    }

    /// The standard-comparator best.
    pub fn best(&self) -> Option<&ImmutableSolution> {
        self.solution(0)
    }

    pub fn tags(&self, slot: usize) -> &Tags {
        &self.slots[slot].tags
    }

    /// Number of solutions `slot` has accepted.
    pub fn solution_nb(&self, slot: usize) -> u64 {
        self.slots[slot].solution_nb
    }

    /// One `[cost, src=tags]` entry per slot, or `[no sol]`.
    pub fn single_line_summary(&self) -> String {
        self.slots
            .iter()
            .map(|slot| match &slot.solution {
                Some(s) => format!("[{}, src={}]", s.cost(), slot.tags),
                None => "[no sol]".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
