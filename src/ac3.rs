//! AC-3 arc consistency over the pairwise network.

use crate::consistency::is_consistent;
use crate::data::Candidate;
use crate::network::Network;
use log::{debug, info};
use std::collections::VecDeque;
use std::mem;

/// A domain emptied during propagation: the problem has no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wipeout {
    pub unit: usize,
}

/// Counters from one propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub revisions: u64,
    pub removed: usize,
}

/// Removes from `x` every candidate with no consistent partner left in `y`,
/// reporting each removal together with the domain of `y` it was checked
/// against. Returns whether `x` shrank.
fn revise<F>(network: &mut Network, x: usize, y: usize, on_removal: &mut F) -> bool
where
    F: FnMut(usize, &Candidate, usize, &[Candidate]),
{
    let share_section = network.shares_section(x, y);
    let domain = mem::take(&mut network.domains[x]);
    let support = &network.domains[y];
    let (kept, removed): (Vec<Candidate>, Vec<Candidate>) = domain
        .into_iter()
        .partition(|cx| support.iter().any(|cy| is_consistent(cx, cy, share_section)));
    for cx in &removed {
        on_removal(x, cx, y, support);
    }
    network.domains[x] = kept;
    !removed.is_empty()
}

/// Prunes every domain of `network` to arc consistency, in place.
///
/// Domains only ever shrink. Returns the unit whose domain was wiped out as
/// soon as that happens; the other domains are then left part-way pruned.
/// A successful run does not guarantee that a solution exists.
pub fn propagate(network: &mut Network) -> Result<PropagationStats, Wipeout> {
    propagate_observed(network, |_, _, _, _| {})
}

/// [`propagate`], calling `on_removal(x, value, y, domain_of_y)` for every
/// value pruned from `x` for lack of support in `y`.
pub(crate) fn propagate_observed<F>(
    network: &mut Network,
    mut on_removal: F,
) -> Result<PropagationStats, Wipeout>
where
    F: FnMut(usize, &Candidate, usize, &[Candidate]),
{
    let n = network.len();
    if let Some(unit) = network.domains.iter().position(Vec::is_empty) {
        return Err(Wipeout { unit });
    }

    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(a, b) in network.pairs() {
        neighbours[a].push(b);
        neighbours[b].push(a);
    }

    let before = network.candidate_total();
    let mut queue: VecDeque<(usize, usize)> = network
        .pairs()
        .iter()
        .flat_map(|&(a, b)| [(a, b), (b, a)])
        .collect();
    let mut queued = vec![false; n * n];
    for &(x, y) in &queue {
        queued[x * n + y] = true;
    }
    info!("Running AC-3 over {} arcs ({} candidates)", queue.len(), before);

    let mut stats = PropagationStats::default();
    while let Some((x, y)) = queue.pop_front() {
        queued[x * n + y] = false;
        stats.revisions += 1;
        if !revise(network, x, y, &mut on_removal) {
            continue;
        }
        if network.domains[x].is_empty() {
            debug!("Domain of [{}] wiped out against [{}]", network.unit(x).id, network.unit(y).id);
            return Err(Wipeout { unit: x });
        }
        for &z in &neighbours[x] {
            if z != y && !queued[z * n + x] {
                queued[z * n + x] = true;
                queue.push_back((z, x));
            }
        }
    }

    stats.removed = before - network.candidate_total();
    info!(
        "AC-3 reached a fixed point after {} revisions, pruning {} of {} candidates",
        stats.revisions, stats.removed, before
    );
    Ok(stats)
}
