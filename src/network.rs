//! The per-solve constraint network.
//!
//! Owns the teaching units, their domains, the pair list and the derived
//! section-membership index. Nothing here outlives a solve, and two solves
//! never share a network.

use crate::consistency::is_consistent;
use crate::data::{Candidate, EmptyDomain, UnitId, Warning};

/// A teaching unit: the identity plus what was derived from it at build time.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    /// Total students of the covered sections.
    pub demand: u64,
    /// Positions of the covered sections in the input, sorted.
    pub(crate) members: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) units: Vec<Unit>,
    pub(crate) domains: Vec<Vec<Candidate>>,
    pub(crate) pairs: Vec<(usize, usize)>,
    /// `shared[a * n + b]` is true when units a and b cover a common section.
    pub(crate) shared: Vec<bool>,
    pub(crate) diagnostics: Vec<EmptyDomain>,
    pub(crate) warnings: Vec<Warning>,
}

impl Network {
    pub(crate) fn new(
        units: Vec<Unit>,
        domains: Vec<Vec<Candidate>>,
        diagnostics: Vec<EmptyDomain>,
        warnings: Vec<Warning>,
    ) -> Self {
        let n = units.len();
        let mut shared = vec![false; n * n];
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for a in 0..n {
            for b in (a + 1)..n {
                let overlap = units[a]
                    .members
                    .iter()
                    .any(|m| units[b].members.binary_search(m).is_ok());
                shared[a * n + b] = overlap;
                shared[b * n + a] = overlap;
                pairs.push((a, b));
            }
        }
        Self {
            units,
            domains,
            pairs,
            shared,
            diagnostics,
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> &Unit {
        &self.units[index]
    }

    pub fn domain(&self, index: usize) -> &[Candidate] {
        &self.domains[index]
    }

    /// All unordered pairs of distinct units, `(a, b)` with `a < b`.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Units whose domain was empty straight after construction.
    pub fn diagnostics(&self) -> &[EmptyDomain] {
        &self.diagnostics
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn candidate_total(&self) -> usize {
        self.domains.iter().map(Vec::len).sum()
    }

    pub fn shares_section(&self, a: usize, b: usize) -> bool {
        self.shared[a * self.units.len() + b]
    }

    /// The pairwise predicate between unit `a` taking `ca` and unit `b` taking `cb`.
    pub fn consistent(&self, a: usize, ca: &Candidate, b: usize, cb: &Candidate) -> bool {
        is_consistent(ca, cb, self.shares_section(a, b))
    }

    pub fn index_of(&self, id: &UnitId) -> Option<usize> {
        self.units.iter().position(|unit| &unit.id == id)
    }
}
