//! Course timetabling as a binary constraint satisfaction problem.
//!
//! Teaching units (grouped lectures and per-section labs) are the variables,
//! (time slot, room, instructor) triples the values. A solve builds the
//! network, prunes it with AC-3 and then runs an MRV-ordered backtracking
//! search.
//!
//! # Modules
//!
//! - **`data`**: input records, unit identities, output rows
//! - **`candidates`** / **`variables`**: domain construction
//! - **`network`** / **`consistency`**: the per-solve constraint network
//! - **`ac3`**, **`search`**: propagation and search
//! - **`solver`**: the full pipeline, **`export`**: timetable rows and dumps
//! - **`loader`**, **`config`**, **`server`**: file and HTTP adapters

pub mod ac3;
pub mod candidates;
pub mod config;
pub mod consistency;
pub mod data;
pub mod error;
pub mod export;
pub mod loader;
pub mod network;
pub mod search;
pub mod server;
pub mod solver;
pub mod variables;
