//! Chronological backtracking search with MRV variable ordering.
//!
//! The search keeps an explicit trail of frames instead of recursing. Each
//! frame records the unit it assigns and the next candidate index to try;
//! popping a frame is the undo step of a backtrack.

use crate::config::SolverConfig;
use crate::data::{Candidate, ScheduledUnit, UnitId};
use crate::network::Network;
use log::{debug, info, trace};
use std::time::{Duration, Instant};

/// How often the wall clock is consulted, in tried candidates.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Limits under which the search gives up without a verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchBudget {
    pub max_nodes: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            max_nodes: config.max_nodes(),
            time_limit: config.time_limit(),
        }
    }
}

/// A complete assignment, in unit construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    assignments: Vec<ScheduledUnit>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledUnit> {
        self.assignments.iter()
    }

    pub fn get(&self, unit: &UnitId) -> Option<&Candidate> {
        self.assignments
            .iter()
            .find(|assigned| &assigned.unit == unit)
            .map(|assigned| &assigned.candidate)
    }

    pub fn into_units(self) -> Vec<ScheduledUnit> {
        self.assignments
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Schedule),
    /// Every branch was explored without success.
    Exhausted,
    /// The budget ran out first.
    Aborted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Candidates tried against the partial assignment.
    pub nodes: u64,
    pub backtracks: u64,
}

#[derive(Debug)]
struct Frame {
    unit: usize,
    next: usize,
}

/// Picks the unassigned unit with the fewest candidates, earliest unit on ties.
pub(crate) fn select_unassigned(network: &Network, assigned: &[Option<usize>]) -> Option<usize> {
    (0..network.len())
        .filter(|&unit| assigned[unit].is_none())
        .min_by_key(|&unit| network.domain(unit).len())
}

/// Searches the (pruned) domains of `network` for a complete assignment.
pub fn search(network: &Network, budget: &SearchBudget) -> (SearchOutcome, SearchStats) {
    let start = Instant::now();
    let deadline = budget.time_limit.map(|limit| start + limit);
    let n = network.len();
    let mut stats = SearchStats::default();
    let mut assigned: Vec<Option<usize>> = vec![None; n];
    let mut trail: Vec<Frame> = Vec::with_capacity(n);

    info!("Starting backtracking search (MRV) over {} units", n);

    match select_unassigned(network, &assigned) {
        Some(unit) => trail.push(Frame { unit, next: 0 }),
        None => return (SearchOutcome::Solved(Schedule::default()), stats),
    }

    while let Some((frame, rest)) = trail.split_last_mut() {
        let unit = frame.unit;
        assigned[unit] = None;
        let domain = network.domain(unit);

        let mut accepted = None;
        while frame.next < domain.len() {
            if budget.max_nodes.is_some_and(|max| stats.nodes >= max)
                || (stats.nodes % DEADLINE_CHECK_INTERVAL == 0
                    && deadline.is_some_and(|deadline| Instant::now() >= deadline))
            {
                info!(
                    "Search aborted after {} candidates and {} backtracks",
                    stats.nodes, stats.backtracks
                );
                return (SearchOutcome::Aborted, stats);
            }

            let index = frame.next;
            frame.next += 1;
            stats.nodes += 1;

            let candidate = &domain[index];
            let fits = rest.iter().all(|other| {
                let chosen = &network.domain(other.unit)[other.next - 1];
                network.consistent(unit, candidate, other.unit, chosen)
            });
            if fits {
                accepted = Some(index);
                break;
            }
        }

        match accepted {
            Some(index) => {
                assigned[unit] = Some(index);
                trace!(
                    "Assigned [{}] ({}/{})",
                    network.unit(unit).id,
                    trail.len(),
                    n
                );
                match select_unassigned(network, &assigned) {
                    Some(next) => trail.push(Frame { unit: next, next: 0 }),
                    None => {
                        info!(
                            "Search finished in {:.2?}: {} candidates tried, {} backtracks",
                            start.elapsed(),
                            stats.nodes,
                            stats.backtracks
                        );
                        return (SearchOutcome::Solved(collect(network, &assigned)), stats);
                    }
                }
            }
            None => {
                debug!("Backtracking from [{}]", network.unit(unit).id);
                trail.pop();
                stats.backtracks += 1;
            }
        }
    }

    info!(
        "Search exhausted after {} candidates and {} backtracks",
        stats.nodes, stats.backtracks
    );
    (SearchOutcome::Exhausted, stats)
}

fn collect(network: &Network, assigned: &[Option<usize>]) -> Schedule {
    let assignments = assigned
        .iter()
        .enumerate()
        .filter_map(|(unit, choice)| {
            choice.map(|index| ScheduledUnit {
                unit: network.unit(unit).id.clone(),
                candidate: network.domain(unit)[index].clone(),
            })
        })
        .collect();
    Schedule { assignments }
}
