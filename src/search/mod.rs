//! Depth-first proof-number search.
//!
//! - [`solver`]: the driver ([`Solver`], [`SolveOutcome`]).
//! - [`mid`]: the recursive engine.
//! - [`history`] / [`transposition`]: live path and bounds correction for transpositions.
//! - [`control`]: abort flag and time limit.
//! - [`listener`] / [`progress`] / [`stats`]: observers and counters.

pub mod control;
pub mod history;
pub mod listener;
pub(crate) mod mid;
pub mod progress;
pub mod solver;
pub mod stats;
pub mod transposition;

pub use control::{AbortHandle, AbortReason};
pub use history::PathEntry;
pub use listener::{LogListener, SolveListener};
pub use progress::{LogProgress, ProgressSink};
pub use solver::{principal_variation, SolveOutcome, Solver};
pub use stats::{RunningStats, SearchStatistics};
