use crate::data::{EmptyDomain, SolveStats, UnitId, Warning};
use std::io;
use std::path::PathBuf;

/// Why a solve produced no timetable.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// Some units had no candidate at all after construction.
    #[error("{} teaching unit(s) have no feasible candidate", .diagnostics.len())]
    EmptyDomains { diagnostics: Vec<EmptyDomain> },

    /// Arc consistency emptied the domain of `unit`.
    #[error("no solution possible: arc consistency emptied the domain of {unit}")]
    Unsatisfiable { unit: UnitId },

    #[error("no solution found after exploring {nodes} candidate(s)")]
    NoSolution { nodes: u64 },

    #[error("search aborted after {nodes} candidate(s) without reaching a verdict")]
    SearchAborted { nodes: u64 },
}

impl SolveError {
    /// Short machine-readable tag for the failure class.
    pub fn reason(&self) -> &'static str {
        match self {
            SolveError::EmptyDomains { .. } => "emptyDomains",
            SolveError::Unsatisfiable { .. } => "unsatisfiable",
            SolveError::NoSolution { .. } => "noSolution",
            SolveError::SearchAborted { .. } => "searchAborted",
        }
    }
}

/// A failed solve together with what was learned on the way.
///
/// Build warnings are kept here because they often explain the failure, for
/// instance a section enrolled in a course that does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct SolveFailure {
    pub error: SolveError,
    pub warnings: Vec<Warning>,
    /// Counters up to the point of failure; `nodes` stays 0 unless search ran.
    pub stats: SolveStats,
}

impl SolveFailure {
    pub fn reason(&self) -> &'static str {
        self.error.reason()
    }
}

/// Errors raised while reading input or configuration documents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read CSV table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
